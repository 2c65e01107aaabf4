//! Helpers for reading environment-style key/value configuration.
//!
//! Adapter configs take a lookup function instead of reading the process
//! environment directly, so they can be built from any map in tests.

use crate::{Error, Result};

/// Reads `key` and fails with [`Error::ConfigurationInvalid`] when it is
/// missing or blank.
pub fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => Err(Error::ConfigurationInvalid(format!("{} is set but empty", key))),
        None => Err(Error::ConfigurationInvalid(format!("{} is not set", key))),
    }
}

/// Reads `key`, treating blank values as absent.
pub fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads `key` and parses it, falling back to `default` when absent.
pub fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::ConfigurationInvalid(format!("{}: {}", key, e))),
        None => Ok(default),
    }
}

pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
