// crates/spec-guard/src/context/mod.rs
// ============================================================================
// Module: Runtime Interpreters
// Description: Shared validation contract and its two interpreters.
// Purpose: Drive compiled scopes against live models in boolean or full mode.
// Dependencies: crate::{error, registry, scope}
// ============================================================================

//! ## Overview
//! Scopes never know which interpreter runs them. They talk to a
//! [`ValidationContext`] that either just remembers whether anything failed
//! ([`fast::IsValidContext`]) or tracks paths, composes append and override
//! errors, and collects every error id per path
//! ([`full::CollectingContext`]). Both share the reference-loop guard.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub(crate) mod fast;
pub(crate) mod flags;
pub(crate) mod full;
pub(crate) mod loop_guard;
pub(crate) mod path_stack;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;

use crate::error::ValidationError;
use crate::registry::ErrorId;
use crate::registry::ErrorMode;
use crate::scope::ScopeId;

// ============================================================================
// SECTION: Contract
// ============================================================================

/// Operations a compiled scope performs while being validated.
pub(crate) trait ValidationContext {
    /// Reports an error at the current path.
    fn add_error(&mut self, error: ErrorId, skip_duplicate: bool);

    /// Enters a relative path, or re-enters the current path for `None`.
    fn enter_path(&mut self, relative: Option<&str>);

    /// Enters a collection item segment.
    fn enter_collection_item(&mut self, index: usize);

    /// Enters a dictionary key segment.
    ///
    /// `key` is the raw stringified key; contexts that track paths normalize it
    /// with [`path::key_segment`](crate::path::key_segment).
    fn enter_dictionary_key(&mut self, key: &str);

    /// Leaves the innermost path.
    fn leave_path(&mut self);

    /// Enables an error at the current level under a composition mode.
    fn enable_error_detection(&mut self, mode: ErrorMode, error: ErrorId);

    /// Validates a model against a scope; `None` means the model is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for structural failures.
    fn enter_scope(&mut self, scope: ScopeId, model: Option<&dyn Any>)
    -> Result<(), ValidationError>;

    /// Returns true when the current walk should stop and unwind.
    fn should_fall_back(&self) -> bool;
}
