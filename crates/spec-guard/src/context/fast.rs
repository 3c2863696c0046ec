// crates/spec-guard/src/context/fast.rs
// ============================================================================
// Module: Boolean Interpreter
// Description: Fail-fast validation that only answers valid or invalid.
// Purpose: Stop at the first violation without tracking paths or messages.
// Dependencies: tracing, crate::{context, error, registry, scheme, scope}
// ============================================================================

//! ## Overview
//! The first reported error sets a flag; every scope checks the flag after
//! each command and unwinds. Composition modes are irrelevant here, since any
//! error makes the model invalid. A re-entered reference is fatal and carries
//! no path information.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;

use tracing::trace;

use super::ValidationContext;
use super::loop_guard::ReferenceLoopGuard;
use super::loop_guard::address_of;
use crate::error::ValidationError;
use crate::registry::ErrorId;
use crate::registry::ErrorMode;
use crate::scheme::ModelScheme;
use crate::scope::ScopeId;

/// Boolean validation state for one call.
pub(crate) struct IsValidContext<'a> {
    /// Scheme being executed.
    scheme: &'a ModelScheme,
    /// True once any error was reported.
    found: bool,
    /// Reference guard, when protection is on.
    guard: Option<ReferenceLoopGuard>,
}

impl<'a> IsValidContext<'a> {
    /// Creates a context.
    pub(crate) fn new(scheme: &'a ModelScheme, reference_loop_protection: bool) -> Self {
        Self {
            scheme,
            found: false,
            guard: reference_loop_protection.then(ReferenceLoopGuard::default),
        }
    }

    /// Returns true when an error was reported.
    pub(crate) const fn error_found(&self) -> bool {
        self.found
    }
}

impl ValidationContext for IsValidContext<'_> {
    fn add_error(&mut self, _error: ErrorId, _skip_duplicate: bool) {
        self.found = true;
    }

    fn enter_path(&mut self, _relative: Option<&str>) {}

    fn enter_collection_item(&mut self, _index: usize) {}

    fn enter_dictionary_key(&mut self, _key: &str) {}

    fn leave_path(&mut self) {}

    fn enable_error_detection(&mut self, _mode: ErrorMode, _error: ErrorId) {}

    fn enter_scope(
        &mut self,
        id: ScopeId,
        model: Option<&dyn Any>,
    ) -> Result<(), ValidationError> {
        let scheme = self.scheme;
        let scope = scheme.scope(id)?;
        let address = model.filter(|_| scope.tracks_references()).map(address_of);

        let guarded = match (self.guard.as_mut(), address) {
            (Some(guard), Some(address)) => {
                if guard.try_enter(id, address, 0).is_err() {
                    trace!(scope = %id, type_name = scope.type_name(), "reference loop");
                    return Err(ValidationError::ReferenceLoop {
                        scope_id: id,
                        type_name: scope.type_name(),
                    });
                }
                true
            }
            _ => false,
        };

        let outcome = scope.validate(model, self);
        if guarded {
            if let Some(guard) = self.guard.as_mut() {
                guard.leave(id);
            }
        }
        outcome
    }

    fn should_fall_back(&self) -> bool {
        self.found
    }
}
