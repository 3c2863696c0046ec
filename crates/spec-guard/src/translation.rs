// crates/spec-guard/src/translation.rs
// ============================================================================
// Module: Translations
// Description: Named message-key tables with the built-in English defaults.
// Purpose: Supply localized text for message keys to the message cache.
// Dependencies: crate::registry
// ============================================================================

//! ## Overview
//! A translation is a flat map from message key to text. English always exists
//! and carries the engine's own `Global.*` keys; caller tables are merged on
//! top, so a caller can both add languages and override English entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::registry::FORBIDDEN_MESSAGE_KEY;
use crate::registry::GENERIC_MESSAGE_KEY;
use crate::registry::REFERENCE_LOOP_MESSAGE_KEY;
use crate::registry::REQUIRED_MESSAGE_KEY;

/// Name of the default translation.
pub const ENGLISH: &str = "English";

/// One translation table.
pub type TranslationTable = BTreeMap<String, String>;

/// Set of named translation tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translations {
    /// Tables by translation name.
    tables: BTreeMap<String, TranslationTable>,
}

impl Translations {
    /// Creates the set holding only the English defaults.
    #[must_use]
    pub fn new() -> Self {
        let english = [
            (GENERIC_MESSAGE_KEY, "Error"),
            (REQUIRED_MESSAGE_KEY, "Required"),
            (FORBIDDEN_MESSAGE_KEY, "Forbidden"),
            (REFERENCE_LOOP_MESSAGE_KEY, "(reference loop)"),
        ]
        .into_iter()
        .map(|(key, text)| (key.to_string(), text.to_string()))
        .collect();

        let mut tables = BTreeMap::new();
        tables.insert(ENGLISH.to_string(), english);
        Self {
            tables,
        }
    }

    /// Merges entries into a translation, creating it when missing.
    pub fn merge<I, K, V>(&mut self, name: &str, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.tables.entry(name.to_string()).or_default();
        table.extend(entries.into_iter().map(|(key, text)| (key.into(), text.into())));
    }

    /// Returns a translation table.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TranslationTable> {
        self.tables.get(name)
    }

    /// Iterates translation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Iterates `(name, table)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TranslationTable)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::new()
    }
}
