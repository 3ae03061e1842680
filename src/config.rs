//! Engine configuration.

use std::ffi::OsStr;

/// Environment variable that switches on per-query diagnostics.
pub const DEBUG_ENV_VAR: &str = "DEBUG_ME";

/// Immutable settings for an [`crate::IncrementalSieve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SieveConfig {
    /// Emit a [`crate::SieveSnapshot`] to the diagnostic sink after every query.
    pub debug: bool,
}

impl SieveConfig {
    /// Read the debug toggle once from the process environment.
    /// Any non-empty value of `DEBUG_ME` enables diagnostics.
    pub fn from_env() -> Self {
        Self::from_debug_value(std::env::var_os(DEBUG_ENV_VAR).as_deref())
    }

    fn from_debug_value(value: Option<&OsStr>) -> Self {
        Self { debug: value.map_or(false, |v| !v.is_empty()) }
    }
}
