// crates/spec-guard/src/result.rs
// ============================================================================
// Module: Validation Result
// Description: Structured outcome of a full validation run.
// Purpose: Expose paths, codes, and translated messages for one validated model.
// Dependencies: indexmap, serde, crate::{error, registry, scope, translation, validator}
// ============================================================================

//! ## Overview
//! A [`ValidationResult`] owns the concrete errors map of one run and shares the
//! validator's immutable core. Codes come straight from the error registry;
//! messages are rendered through the message cache on demand, per translation.
//!
//! The `Display` rendering lists the codes (comma separated), a blank line, and
//! then one `path: message` line per message in English. Messages reported at
//! the root path are printed without a prefix.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::IndexSet;
use serde::Deserialize;
use serde::Serialize;

use crate::error::TranslationError;
use crate::registry::ErrorId;
use crate::scope::ScopeId;
use crate::translation::ENGLISH;
use crate::validator::ValidatorCore;

// ============================================================================
// SECTION: Reference Loop Report
// ============================================================================

/// Reference loop found while collecting errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceLoop {
    /// Scope that was re-entered with the same model.
    pub scope_id: ScopeId,
    /// Model type of that scope.
    pub type_name: String,
    /// Path where the model was first entered.
    pub original_path: String,
    /// Path where the same model was reached again.
    pub nested_path: String,
}

// ============================================================================
// SECTION: Result
// ============================================================================

/// Outcome of [`Validator::validate`](crate::Validator::validate).
#[derive(Clone)]
pub struct ValidationResult {
    /// Concrete path to reported error ids, in report order.
    errors: IndexMap<String, Vec<ErrorId>>,
    /// Reference loops found during the run.
    loops: Vec<ReferenceLoop>,
    /// Shared validator state used to resolve codes and messages.
    core: Arc<ValidatorCore>,
}

impl ValidationResult {
    /// Wraps the output of a collecting run.
    pub(crate) const fn new(
        errors: IndexMap<String, Vec<ErrorId>>,
        loops: Vec<ReferenceLoop>,
        core: Arc<ValidatorCore>,
    ) -> Self {
        Self {
            errors,
            loops,
            core,
        }
    }

    /// Returns true when any error was reported.
    #[must_use]
    pub fn any_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Iterates the paths that carry errors, in report order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Returns the raw errors map.
    #[must_use]
    pub const fn errors(&self) -> &IndexMap<String, Vec<ErrorId>> {
        &self.errors
    }

    /// Returns every distinct code, in first-seen order.
    #[must_use]
    pub fn codes(&self) -> IndexSet<&str> {
        let registry = self.core.scheme.errors();
        self.errors
            .values()
            .flatten()
            .filter_map(|id| registry.get(*id))
            .flat_map(|error| error.codes().iter().map(String::as_str))
            .collect()
    }

    /// Returns the codes reported under each path; paths without codes are omitted.
    #[must_use]
    pub fn code_map(&self) -> IndexMap<String, Vec<String>> {
        let registry = self.core.scheme.errors();
        self.errors
            .iter()
            .filter_map(|(path, ids)| {
                let codes: Vec<String> = ids
                    .iter()
                    .filter_map(|id| registry.get(*id))
                    .flat_map(|error| error.codes().iter().cloned())
                    .collect();
                (!codes.is_empty()).then(|| (path.clone(), codes))
            })
            .collect()
    }

    /// Returns the messages reported under each path in one translation.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::Unknown`] for a translation the validator
    /// does not carry.
    pub fn message_map(
        &self,
        translation: &str,
    ) -> Result<IndexMap<String, Vec<String>>, TranslationError> {
        self.core.messages.messages(translation, &self.errors)
    }

    /// Iterates the translations messages can be rendered in.
    pub fn translation_names(&self) -> impl Iterator<Item = &str> {
        self.core.messages.translation_names()
    }

    /// Returns the reference loops found during the run.
    #[must_use]
    pub fn reference_loops(&self) -> &[ReferenceLoop] {
        &self.loops
    }
}

impl fmt::Debug for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationResult")
            .field("errors", &self.errors)
            .field("loops", &self.loops)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes = self.codes();
        let messages = self.message_map(ENGLISH).unwrap_or_default();

        if !codes.is_empty() {
            let joined: Vec<&str> = codes.into_iter().collect();
            f.write_str(&joined.join(", "))?;
            if !messages.is_empty() {
                f.write_str("\n\n")?;
            }
        }

        let mut first = true;
        for (path, path_messages) in &messages {
            for message in path_messages {
                if !first {
                    f.write_str("\n")?;
                }
                first = false;
                if path.is_empty() {
                    f.write_str(message)?;
                } else {
                    write!(f, "{path}: {message}")?;
                }
            }
        }
        Ok(())
    }
}
