use std::fmt;

/// How much detail a timing record represents, from [`None`][Self::None] (0) to
/// [`Highest`][Self::Highest] (5).
///
/// The level is attached to every record emitted by a [`ScopedTimer`][crate::ScopedTimer] so that
/// log consumers can filter fine-grained timings from coarse ones.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum Verbosity {
    /// Level 0.
    None,

    /// Level 1.
    Lowest,

    /// Level 2. This is the default.
    #[default]
    Low,

    /// Level 3.
    Normal,

    /// Level 4.
    High,

    /// Level 5.
    Highest,
}

impl Verbosity {
    /// The numeric level, from 0 to 5.
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Lowest => 1,
            Self::Low => 2,
            Self::Normal => 3,
            Self::High => 4,
            Self::Highest => 5,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert_eq!(Verbosity::None.level(), 0);
        assert_eq!(Verbosity::Highest.level(), 5);
        assert!(Verbosity::Low < Verbosity::Normal);
        assert_eq!(Verbosity::default(), Verbosity::Low);
        assert_eq!(Verbosity::High.to_string(), "4");
    }
}
