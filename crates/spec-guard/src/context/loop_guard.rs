// crates/spec-guard/src/context/loop_guard.rs
// ============================================================================
// Module: Reference Loop Guard
// Description: Per-scope stacks of model addresses currently being validated.
// Purpose: Detect a live model re-entering a scope it is already inside.
// Dependencies: crate::scope
// ============================================================================

//! ## Overview
//! Model identity is the referent address. The guard keeps, per scope id, the
//! addresses currently on the walk together with the path level at which each
//! was entered, so full mode can report where a loop started.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::collections::HashMap;

use crate::scope::ScopeId;

/// Returns the address identifying a model.
pub(crate) fn address_of(model: &dyn Any) -> usize {
    std::ptr::from_ref(model).cast::<()>().addr()
}

/// One model on a scope's stack.
#[derive(Debug, Clone, Copy)]
struct Visit {
    /// Model address.
    address: usize,
    /// Path level the model was entered at.
    level: usize,
}

/// Reference stacks keyed by scope id.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReferenceLoopGuard {
    /// Active visits per scope.
    visits: HashMap<ScopeId, Vec<Visit>>,
}

impl ReferenceLoopGuard {
    /// Pushes a model onto a scope's stack.
    ///
    /// Returns the level the model was first entered at when it is already on
    /// the stack; nothing is pushed in that case.
    pub(crate) fn try_enter(
        &mut self,
        scope: ScopeId,
        address: usize,
        level: usize,
    ) -> Result<(), usize> {
        let visits = self.visits.entry(scope).or_default();
        if let Some(visit) = visits.iter().find(|visit| visit.address == address) {
            return Err(visit.level);
        }
        visits.push(Visit {
            address,
            level,
        });
        Ok(())
    }

    /// Pops the innermost model of a scope.
    pub(crate) fn leave(&mut self, scope: ScopeId) {
        if let Some(visits) = self.visits.get_mut(&scope) {
            visits.pop();
        }
    }
}

#[cfg(test)]
mod tests;
