// crates/spec-guard/src/context/full.rs
// ============================================================================
// Module: Collecting Interpreter
// Description: Full validation that records every error id per concrete path.
// Purpose: Compose append and override errors and report reference loops.
// Dependencies: indexmap, tracing, crate::{capacity, context, error, path, registry, result, scheme, scope}
// ============================================================================

//! ## Overview
//! The collecting context keeps a [`PathStack`], the errors map, and two
//! [`ErrorFlag`]s. A command scope with an error enables it at its level:
//! - Under an enabled override, every error reported beneath is swallowed and
//!   only marks the override detected; the override error is reported once
//!   when its level is left.
//! - An enabled append error is reported in addition to whatever was reported
//!   beneath it.
//!
//! A detected override makes the walk unwind to its level. With fail-fast on,
//! the walk unwinds as soon as any error exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;

use indexmap::IndexMap;
use tracing::trace;

use super::ValidationContext;
use super::flags::ErrorFlag;
use super::loop_guard::ReferenceLoopGuard;
use super::loop_guard::address_of;
use super::path_stack::PathStack;
use crate::capacity::CapacityInfo;
use crate::error::ValidationError;
use crate::path;
use crate::registry::ErrorId;
use crate::registry::ErrorMode;
use crate::result::ReferenceLoop;
use crate::scheme::ModelScheme;
use crate::scope::ScopeId;

/// Full validation state for one call.
pub(crate) struct CollectingContext<'a> {
    /// Scheme being executed.
    scheme: &'a ModelScheme,
    /// Sizing hints.
    capacity: &'a dyn CapacityInfo,
    /// Current path levels.
    paths: PathStack,
    /// Concrete path to the error ids reported there.
    errors: IndexMap<String, Vec<ErrorId>>,
    /// Enabled append errors.
    append: ErrorFlag,
    /// Enabled override errors.
    overrides: ErrorFlag,
    /// Reference guard, when protection is on.
    guard: Option<ReferenceLoopGuard>,
    /// Reference loops found so far.
    loops: Vec<ReferenceLoop>,
    /// Stop at the first error.
    fail_fast: bool,
}

impl<'a> CollectingContext<'a> {
    /// Creates a context.
    pub(crate) fn new(
        scheme: &'a ModelScheme,
        capacity: &'a dyn CapacityInfo,
        reference_loop_protection: bool,
        fail_fast: bool,
    ) -> Self {
        Self {
            scheme,
            capacity,
            paths: PathStack::new(),
            errors: IndexMap::with_capacity(capacity.errors_map_capacity()),
            append: ErrorFlag::default(),
            overrides: ErrorFlag::default(),
            guard: reference_loop_protection.then(ReferenceLoopGuard::default),
            loops: Vec::new(),
            fail_fast,
        }
    }

    /// Consumes the context into the errors map and loop reports.
    pub(crate) fn finish(self) -> (IndexMap<String, Vec<ErrorId>>, Vec<ReferenceLoop>) {
        (self.errors, self.loops)
    }

    /// Stores an error at the current concrete path.
    fn save(&mut self, error: ErrorId, skip_duplicate: bool) {
        let path = self.paths.path();
        if let Some(errors) = self.errors.get_mut(path) {
            if !(skip_duplicate && errors.contains(&error)) {
                errors.push(error);
            }
            return;
        }

        let mut errors = Vec::with_capacity(self.capacity.try_get_capacity(path).unwrap_or(1));
        errors.push(error);
        self.errors.insert(path.to_string(), errors);
    }
}

impl ValidationContext for CollectingContext<'_> {
    fn add_error(&mut self, error: ErrorId, skip_duplicate: bool) {
        if self.overrides.is_enabled() {
            self.overrides.set_detected();
            return;
        }
        self.append.set_detected();
        self.save(error, skip_duplicate);
    }

    fn enter_path(&mut self, relative: Option<&str>) {
        match relative {
            None => self.paths.push_same(),
            Some(relative) => {
                let concrete = path::resolve(self.paths.path(), relative);
                let template = self.scheme.resolve_path(self.paths.template(), relative);
                self.paths.push(concrete, &template);
            }
        }
    }

    fn enter_collection_item(&mut self, index: usize) {
        self.paths.push_index(index);
    }

    fn enter_dictionary_key(&mut self, key: &str) {
        let concrete = path::append(self.paths.path(), &path::key_segment(key));
        let template = path::append(self.paths.template(), path::marker_segment());
        self.paths.push(concrete, &template);
    }

    fn leave_path(&mut self) {
        let level = self.paths.level();
        let overridden = self.overrides.leave_level(level);
        let appended = self.append.leave_level(level);
        if let Some(error) = overridden {
            self.add_error(error, true);
        } else if let Some(error) = appended {
            self.add_error(error, false);
        }
        self.paths.pop();
    }

    fn enable_error_detection(&mut self, mode: ErrorMode, error: ErrorId) {
        let level = self.paths.level();
        match mode {
            ErrorMode::Append => self.append.set_enabled(level, error),
            ErrorMode::Override => self.overrides.set_enabled(level, error),
        }
    }

    fn enter_scope(
        &mut self,
        id: ScopeId,
        model: Option<&dyn Any>,
    ) -> Result<(), ValidationError> {
        let scheme = self.scheme;
        let scope = scheme.scope(id)?;
        let address = model.filter(|_| scope.tracks_references()).map(address_of);
        let level = self.paths.level();

        let entered = match (self.guard.as_mut(), address) {
            (Some(guard), Some(address)) => Some(guard.try_enter(id, address, level)),
            _ => None,
        };
        if let Some(Err(original_level)) = entered {
            let report = ReferenceLoop {
                scope_id: id,
                type_name: scope.type_name().to_string(),
                original_path: self.paths.path_at(original_level).unwrap_or_default().to_string(),
                nested_path: self.paths.path().to_string(),
            };
            trace!(
                scope = %id,
                original_path = %report.original_path,
                nested_path = %report.nested_path,
                "reference loop"
            );
            self.loops.push(report);
            self.add_error(ErrorId::REFERENCE_LOOP, true);
            return Ok(());
        }

        let outcome = scope.validate(model, self);
        if matches!(entered, Some(Ok(()))) {
            if let Some(guard) = self.guard.as_mut() {
                guard.leave(id);
            }
        }
        outcome
    }

    fn should_fall_back(&self) -> bool {
        (self.fail_fast && !self.errors.is_empty()) || self.overrides.is_detected()
    }
}
