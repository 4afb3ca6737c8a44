//! Environment-driven configuration.
//!
//! Every knob has a default; an unset or unparsable variable falls back to it.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use crate::store::DEFAULT_COMPONENT_ATTRIBUTE;

pub const DEFAULT_OPTIONS_ATTRIBUTE: &str = "data-component-options";
pub const DEFAULT_LOADING_CLASS: &str = "app-loading";
const DEFAULT_BREAKPOINT_DEBOUNCE_MS: u64 = 250;

/// Parse `key` from the environment, falling back to `default`.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    env_parse(key, default.to_owned())
}

// =============================================================================
// LOADER
// =============================================================================

/// Attribute names and marker class the loader works with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Attribute holding the comma-separated component names.
    pub component_attribute: String,
    /// Attribute holding the JSON options object.
    pub options_attribute: String,
    /// Class removed from the document root once nodes have been processed.
    pub loading_class: String,
}

impl LoaderConfig {
    /// Read `COMPONENT_ATTRIBUTE`, `COMPONENT_OPTIONS_ATTRIBUTE` and
    /// `LOADING_CLASS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            component_attribute: env_string("COMPONENT_ATTRIBUTE", DEFAULT_COMPONENT_ATTRIBUTE),
            options_attribute: env_string("COMPONENT_OPTIONS_ATTRIBUTE", DEFAULT_OPTIONS_ATTRIBUTE),
            loading_class: env_string("LOADING_CLASS", DEFAULT_LOADING_CLASS),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            component_attribute: DEFAULT_COMPONENT_ATTRIBUTE.to_owned(),
            options_attribute: DEFAULT_OPTIONS_ATTRIBUTE.to_owned(),
            loading_class: DEFAULT_LOADING_CLASS.to_owned(),
        }
    }
}

// =============================================================================
// BREAKPOINTS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakpointConfig {
    /// Quiet period before a resize is reported.
    pub debounce: Duration,
    /// Materialized breakpoint table, if one is configured.
    pub breakpoints_path: Option<PathBuf>,
}

impl BreakpointConfig {
    /// Read `BREAKPOINT_DEBOUNCE_MS` and `BREAKPOINTS_PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            debounce: Duration::from_millis(env_parse("BREAKPOINT_DEBOUNCE_MS", DEFAULT_BREAKPOINT_DEBOUNCE_MS)),
            breakpoints_path: std::env::var_os("BREAKPOINTS_PATH").map(PathBuf::from),
        }
    }
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self { debounce: Duration::from_millis(DEFAULT_BREAKPOINT_DEBOUNCE_MS), breakpoints_path: None }
    }
}
