//! Policy configuration effects.
//!
//! Options live under a namespace (`Essentials`, for the moderation core) and
//! are looked up by name. Values are stored as text, the way an ini-style
//! server config presents them; typed accessors parse on read.
//!
//! A missing option is never an error. Callers decide what absence means,
//! usually "feature disabled" or "no bound".

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error type for configuration operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// The configuration source could not be read.
    #[error("Failed to read configuration: {0}")]
    Read(String),
    /// The configuration source is not well-formed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    /// An option is present but its value does not parse as the requested type.
    #[error("Invalid value for {namespace}.{key}: {value:?} is not a {expected}")]
    InvalidValue {
        /// Option namespace
        namespace: String,
        /// Option name
        key: String,
        /// Raw value found
        value: String,
        /// Expected type
        expected: &'static str,
    },
}

/// Namespaced option lookups.
pub trait PolicyEffects: Send + Sync {
    /// Raw option text, `None` when unset.
    fn option(&self, namespace: &str, key: &str) -> Option<String>;

    /// Option parsed as a boolean (`true/false`, `1/0`, `yes/no`, `on/off`).
    fn option_bool(&self, namespace: &str, key: &str) -> Result<Option<bool>, ConfigError> {
        self.option(namespace, key)
            .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(invalid(namespace, key, raw, "boolean")),
            })
            .transpose()
    }

    /// Option parsed as an integer.
    fn option_i64(&self, namespace: &str, key: &str) -> Result<Option<i64>, ConfigError> {
        self.option(namespace, key)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .map_err(|_| invalid(namespace, key, raw, "integer"))
            })
            .transpose()
    }

    /// Option parsed as a float.
    fn option_f64(&self, namespace: &str, key: &str) -> Result<Option<f64>, ConfigError> {
        self.option(namespace, key)
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid(namespace, key, raw, "number"))
            })
            .transpose()
    }
}

fn invalid(namespace: &str, key: &str, value: String, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        namespace: namespace.to_string(),
        key: key.to_string(),
        value,
        expected,
    }
}

impl<T: PolicyEffects + ?Sized> PolicyEffects for Arc<T> {
    fn option(&self, namespace: &str, key: &str) -> Option<String> {
        (**self).option(namespace, key)
    }
}
