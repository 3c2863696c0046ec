// crates/spec-guard/src/settings.rs
// ============================================================================
// Module: Validator Settings
// Description: Configuration for validator construction.
// Purpose: Load translations, loop protection, and capacity choice from TOML or code.
// Dependencies: serde, toml, crate::{capacity, error, translation}
// ============================================================================

//! ## Overview
//! Settings are read once when a validator is built. They can be assembled in
//! code with the `with_*` setters or parsed from TOML:
//!
//! ```toml
//! reference_loop_protection = true
//! capacity = "max_observed"
//!
//! [translations.English]
//! "Global.Required" = "Must be present"
//! ```
//!
//! Unknown keys are rejected. Translation names and keys must be non-empty.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::capacity::CapacityStrategy;
use crate::error::SettingsError;
use crate::translation::Translations;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum settings file size in bytes.
pub(crate) const MAX_SETTINGS_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Validator construction settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorSettings {
    /// Forces reference-loop protection on or off; `None` follows discovery.
    #[serde(default)]
    pub reference_loop_protection: Option<bool>,
    /// Translation tables merged over the English defaults.
    #[serde(default)]
    pub translations: BTreeMap<String, BTreeMap<String, String>>,
    /// Capacity planning strategy.
    #[serde(default)]
    pub capacity: CapacityStrategy,
}

impl ValidatorSettings {
    /// Parses and validates settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the document is malformed or invalid.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let bytes = fs::read(path).map_err(|err| SettingsError::Io(err.to_string()))?;
        if bytes.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(SettingsError::FileTooLarge {
                size: bytes.len(),
                max_size: MAX_SETTINGS_FILE_SIZE,
            });
        }
        let content = std::str::from_utf8(&bytes).map_err(|_| SettingsError::NotUtf8)?;
        Self::from_toml_str(content)
    }

    /// Validates translation names and keys.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for an empty translation name or key.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, table) in &self.translations {
            if name.is_empty() {
                return Err(SettingsError::EmptyTranslationName);
            }
            if table.keys().any(String::is_empty) {
                return Err(SettingsError::EmptyTranslationKey(name.clone()));
            }
        }
        Ok(())
    }

    /// Forces reference-loop protection on or off.
    #[must_use]
    pub const fn with_reference_loop_protection(mut self, enabled: bool) -> Self {
        self.reference_loop_protection = Some(enabled);
        self
    }

    /// Selects the capacity strategy.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: CapacityStrategy) -> Self {
        self.capacity = capacity;
        self
    }

    /// Merges entries into a translation.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] for an empty translation name or key.
    pub fn with_translation<I, K, V>(mut self, name: &str, entries: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if name.is_empty() {
            return Err(SettingsError::EmptyTranslationName);
        }
        let table = self.translations.entry(name.to_string()).or_default();
        for (key, text) in entries {
            let key = key.into();
            if key.is_empty() {
                return Err(SettingsError::EmptyTranslationKey(name.to_string()));
            }
            table.insert(key, text.into());
        }
        Ok(self)
    }

    /// Returns the English defaults with every configured table merged on top.
    #[must_use]
    pub fn translation_set(&self) -> Translations {
        let mut translations = Translations::new();
        for (name, table) in &self.translations {
            translations.merge(name, table.iter().map(|(key, text)| (key.as_str(), text.as_str())));
        }
        translations
    }
}
