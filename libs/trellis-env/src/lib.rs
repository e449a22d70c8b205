// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Access to configuration values supplied through the environment.
//!
//! Code that needs configuration takes a `&dyn Environment` rather than reading
//! `std::env` directly, so tests (and embedders) can supply values through a
//! [`MapEnvironment`] or layer several sources with a [`CompositeEnvironment`].

mod composite;
mod map;

pub use composite::CompositeEnvironment;
pub use map::MapEnvironment;

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn enabled(&self, key: &str, default_value: bool) -> Result<bool, EnvError> {
        match self.get(key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "enabled" | "enable" => Ok(true),
                "false" | "0" | "no" | "off" | "disabled" | "disable" => Ok(false),
                _ => Err(EnvError::InvalidBoolean {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(default_value),
        }
    }

    fn get_or_else(&self, key: &str, default_value: &str) -> String {
        self.get(key).unwrap_or(default_value.to_string())
    }

    /// Read a non-negative integer. An unset or empty value is `None`.
    fn get_u64(&self, key: &str) -> Result<Option<u64>, EnvError> {
        match self.get(key) {
            Some(value) if value.trim().is_empty() => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| EnvError::InvalidNumber {
                    key: key.to_string(),
                    value,
                }),
            None => Ok(None),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "Invalid value for {key}: {value}. Expected true, 1, yes, on, enabled, enable OR false, 0, no, off, disabled, disable"
    )]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid value for {key}: {value}. Expected a non-negative integer")]
    InvalidNumber { key: String, value: String },
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}
