//! Light/dark display preference

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{StorageError, ValidationError};
use crate::storage::{keys, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    /// Stored raw (not JSON). Unknown values fall back to light.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        Ok(store
            .get(keys::THEME_PREFERENCE)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default())
    }

    /// Write the raw value, logging any failure
    pub fn persist(&self, store: &mut dyn KeyValueStore) {
        if let Err(e) = store.set(keys::THEME_PREFERENCE, self.as_str()) {
            tracing::warn!(error = %e, "Failed to save theme preference");
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            _ => Err(ValidationError::Invalid { field: "theme" }),
        }
    }
}
