//! The `py<major><minor>` environment-name grammar
//!
//! Test matrices name interpreter environments with a compact convention:
//! `py38` means CPython 3.8, `py310` means CPython 3.10. Anything that does
//! not match the grammar exactly (`lint`, `py3`, `py310-cov`) is not a
//! version environment and is skipped by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// First capture is the single-digit major, second the one-or-more-digit minor.
#[allow(clippy::expect_used)]
static ENV_NAME: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^py(\d)(\d+)$").expect("env name pattern is valid")
});

/// A validated interpreter version parsed from an environment name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PyVersion {
    /// Major version component (the `3` in `py310`)
    pub major: u32,
    /// Minor version component (the `10` in `py310`)
    pub minor: u32,
}

impl PyVersion {
    /// Create a version from its components
    #[must_use]
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse an environment name against the version grammar.
    ///
    /// Returns `None` for names that are not version environments; those are
    /// legitimate matrix entries (lint, docs, ...) and never an error.
    #[must_use]
    pub fn from_env_name(name: &str) -> Option<Self> {
        let caps = ENV_NAME.captures(name)?;
        let major = caps[1].parse().ok()?;
        let minor = caps[2].parse().ok()?;
        Some(Self { major, minor })
    }

    /// The canonical environment name, e.g. `py310`
    #[must_use]
    pub fn env_name(&self) -> String {
        format!("py{}{}", self.major, self.minor)
    }

    /// The interpreter binary name to look for on PATH, e.g. `python3.10`
    #[must_use]
    pub fn interpreter(&self) -> String {
        format!("python{}.{}", self.major, self.minor)
    }

    /// File name of the locked manifest for this version, e.g.
    /// `py310-requirements.txt`
    #[must_use]
    pub fn manifest_name(&self) -> String {
        format!("{}-requirements.txt", self.env_name())
    }
}

impl fmt::Display for PyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_two_digit_minor() {
        assert_eq!(PyVersion::from_env_name("py310"), Some(PyVersion::new(3, 10)));
        assert_eq!(PyVersion::from_env_name("py312"), Some(PyVersion::new(3, 12)));
    }

    #[test]
    fn test_matches_single_digit_minor() {
        assert_eq!(PyVersion::from_env_name("py38"), Some(PyVersion::new(3, 8)));
        assert_eq!(PyVersion::from_env_name("py27"), Some(PyVersion::new(2, 7)));
    }

    #[test]
    fn test_rejects_non_version_environments() {
        assert_eq!(PyVersion::from_env_name("lint"), None);
        assert_eq!(PyVersion::from_env_name("docs"), None);
        assert_eq!(PyVersion::from_env_name(""), None);
    }

    #[test]
    fn test_rejects_incomplete_or_decorated_names() {
        // major digit alone is not a version
        assert_eq!(PyVersion::from_env_name("py3"), None);
        // grammar is anchored at both ends
        assert_eq!(PyVersion::from_env_name("py310-cov"), None);
        assert_eq!(PyVersion::from_env_name("xpy310"), None);
        // prefix is case-sensitive
        assert_eq!(PyVersion::from_env_name("PY38"), None);
    }

    #[test]
    fn test_env_name_round_trip() {
        for name in ["py38", "py310", "py27"] {
            let version = PyVersion::from_env_name(name).unwrap();
            assert_eq!(version.env_name(), name);
        }
    }

    #[test]
    fn test_interpreter_name() {
        assert_eq!(PyVersion::new(3, 10).interpreter(), "python3.10");
        assert_eq!(PyVersion::new(3, 8).interpreter(), "python3.8");
    }

    #[test]
    fn test_manifest_name() {
        assert_eq!(PyVersion::new(3, 10).manifest_name(), "py310-requirements.txt");
    }

    #[test]
    fn test_display() {
        assert_eq!(PyVersion::new(3, 10).to_string(), "3.10");
    }

    #[test]
    fn test_ordering() {
        assert!(PyVersion::new(3, 8) < PyVersion::new(3, 10));
        assert!(PyVersion::new(2, 7) < PyVersion::new(3, 8));
    }
}
