use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::{Error, Result, SaveMode, pointer};

/// A JSON document backed by a file.
///
/// Reads are typed and never fail: a missing key or a value of the wrong type yields the
/// caller's default (the latter is logged). Writes go to the in-memory document and reach the
/// file on [`save()`][Self::save], or on drop with [`SaveMode::AutoSave`].
///
/// # Example
///
/// ```
/// use json_config::{JsonConfig, SaveMode};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("pool.json");
/// std::fs::write(&path, r#"{ "pool": { "max_allocation": 16 } }"#).unwrap();
///
/// let mut config = JsonConfig::load(&path, SaveMode::Manual);
///
/// assert_eq!(config.get_by_pointer("/pool/max_allocation", 0_usize), 16);
/// assert_eq!(config.get_by_pointer("/pool/pre_allocate", 4_usize), 4);
///
/// config.set_by_pointer("/pool/pre_allocate", 8_usize).unwrap();
/// config.save().unwrap();
///
/// let reloaded = JsonConfig::try_load(&path, SaveMode::Manual).unwrap();
/// assert_eq!(reloaded.get_by_pointer("/pool/pre_allocate", 0_usize), 8);
/// ```
pub struct JsonConfig {
    path: PathBuf,
    value: Value,
    save_mode: SaveMode,
}

impl JsonConfig {
    /// Loads the configuration file at `path`.
    ///
    /// A file that is missing, empty or not valid JSON is logged as an error and results in an
    /// empty document. Parse errors are reported with their line and column. Use
    /// [`try_load()`][Self::try_load] to handle such failures instead.
    pub fn load(path: impl Into<PathBuf>, save_mode: SaveMode) -> Self {
        let path = path.into();

        let value = match read(&path) {
            Ok(value) => value,
            Err(Error::Parse {
                line,
                column,
                source,
                ..
            }) => {
                error!(path = %path.display(), line, column, error = %source, "configuration file is not valid JSON");
                empty_document()
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "configuration file does not exist or cannot be read");
                empty_document()
            }
        };

        Self {
            path,
            value,
            save_mode,
        }
    }

    /// Loads the configuration file at `path`, failing if it cannot be read or parsed.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read. [`Error::Parse`] if it is not valid JSON, which
    /// includes an empty file.
    pub fn try_load(path: impl Into<PathBuf>, save_mode: SaveMode) -> Result<Self> {
        let path = path.into();
        let value = read(&path)?;

        Ok(Self {
            path,
            value,
            save_mode,
        })
    }

    /// Creates a configuration with an empty document that will be saved to `path`.
    ///
    /// Nothing is read from `path`, even if the file exists.
    pub fn empty(path: impl Into<PathBuf>, save_mode: SaveMode) -> Self {
        Self {
            path: path.into(),
            value: empty_document(),
            save_mode,
        }
    }

    /// Reads the top-level entry `key`, or `default` if there is no such entry or it cannot be
    /// converted to `T`.
    #[must_use]
    pub fn get<T>(&self, key: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        convert_or(key, self.value.get(key), default)
    }

    /// Reads the value at the JSON pointer, or `default` if there is no such value or it cannot
    /// be converted to `T`.
    #[must_use]
    pub fn get_by_pointer<T>(&self, pointer: &str, default: T) -> T
    where
        T: DeserializeOwned,
    {
        convert_or(pointer, self.value.pointer(pointer), default)
    }

    /// Stores `value` as the top-level entry `key`.
    ///
    /// An empty (`null`) document becomes an object first.
    ///
    /// # Errors
    ///
    /// [`Error::Serialize`] if `value` cannot be converted to JSON. [`Error::Pointer`] if the
    /// document is neither an object nor empty.
    pub fn set<T>(&mut self, key: &str, value: T) -> Result<()>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(value).map_err(Error::Serialize)?;

        if self.value.is_null() {
            self.value = empty_document();
        }

        let Value::Object(map) = &mut self.value else {
            return Err(Error::Pointer {
                pointer: key.to_string(),
                problem: "the document is not an object".to_string(),
            });
        };

        map.insert(key.to_string(), value);
        Ok(())
    }

    /// Stores `value` at the JSON pointer, creating missing objects and arrays on the way.
    ///
    /// An array index of `-`, or the index one past the last item, appends to the array.
    ///
    /// # Errors
    ///
    /// [`Error::Serialize`] if `value` cannot be converted to JSON. [`Error::Pointer`] if the
    /// pointer is malformed, names an array index further past the end, or leads through a value
    /// that is neither an object nor an array.
    pub fn set_by_pointer<T>(&mut self, pointer: &str, value: T) -> Result<()>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(value).map_err(Error::Serialize)?;
        let tokens = pointer::tokens(pointer)?;

        pointer::set(&mut self.value, pointer, &tokens, value)
    }

    /// The top-level entry `key`, or `null` (logged as an error) if there is none.
    #[must_use]
    pub fn at(&self, key: &str) -> Value {
        found_or_null(key, self.value.get(key))
    }

    /// The value at the JSON pointer, or `null` (logged as an error) if there is none.
    #[must_use]
    pub fn at_pointer(&self, pointer: &str) -> Value {
        found_or_null(pointer, self.value.pointer(pointer))
    }

    /// Whether the top-level entry `key` exists and is an array.
    #[must_use]
    pub fn is_array(&self, key: &str) -> bool {
        self.value.get(key).is_some_and(Value::is_array)
    }

    /// Writes the document to the configuration file, pretty-printed with two-space indentation.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let contents = self.to_pretty_string();

        fs::write(&self.path, contents).map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "saved configuration file");
        Ok(())
    }

    /// The document pretty-printed with two-space indentation.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        // Only map keys that are not strings can fail to serialize, and `Value` has none.
        serde_json::to_string_pretty(&self.value)
            .expect("a JSON value always serializes to a JSON string")
    }

    /// The configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The whole document.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the configuration writes itself back to its file when dropped.
    #[must_use]
    pub fn save_mode(&self) -> SaveMode {
        self.save_mode
    }
}

fn empty_document() -> Value {
    Value::Object(Map::new())
}

fn read(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        line: source.line(),
        column: source.column(),
        source,
    })
}

fn convert_or<T: DeserializeOwned>(location: &str, found: Option<&Value>, default: T) -> T {
    let Some(found) = found else {
        return default;
    };

    match Deserialize::deserialize(found) {
        Ok(value) => value,
        Err(e) => {
            error!(location, error = %e, "configuration value has an unexpected type, using the default");
            default
        }
    }
}

fn found_or_null(location: &str, found: Option<&Value>) -> Value {
    if let Some(found) = found {
        return found.clone();
    }

    error!(location, "configuration value does not exist");
    Value::Null
}

impl Drop for JsonConfig {
    fn drop(&mut self) {
        if self.save_mode != SaveMode::AutoSave {
            return;
        }

        if let Err(e) = self.save() {
            error!(path = %self.path.display(), error = %e, "failed to save configuration file on drop");
        }
    }
}

impl fmt::Debug for JsonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonConfig")
            .field("path", &self.path)
            .field("save_mode", &self.save_mode)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for JsonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pretty_string())
    }
}
