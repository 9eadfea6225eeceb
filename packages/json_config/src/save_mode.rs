/// Determines whether a [`JsonConfig`][crate::JsonConfig] writes itself back to its file when
/// dropped.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum SaveMode {
    /// Changes are only written by explicit calls to `save()`. This is the default.
    #[default]
    Manual,

    /// The document is written to its file when the configuration is dropped. Failures are
    /// logged, as there is nobody to return them to.
    AutoSave,
}
