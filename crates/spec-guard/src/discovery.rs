// crates/spec-guard/src/discovery.rs
// ============================================================================
// Module: Discovery Walk
// Description: Data-free traversal of a compiled scope graph.
// Purpose: Derive the path template, the path map, and loop possibility.
// Dependencies: indexmap, tracing, crate::{error, path, registry, scope}
// ============================================================================

//! ## Overview
//! Discovery walks the scope graph once from the root without any model. It
//! records every error a scope could report under its symbolic path
//! (collection items and dictionary entries use `#`), remembers how each
//! relative path resolves from its base, and stops at any scope already on the
//! walk stack. Such a re-entry means the graph is cyclic: the reference-loop
//! error is recorded at that path and `reference_loop_possible` is set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::trace;

use crate::error::IntegrityError;
use crate::path;
use crate::registry::ErrorId;
use crate::scope::ErasedScope;
use crate::scope::ScopeId;

// ============================================================================
// SECTION: Output
// ============================================================================

/// Static metadata produced by discovery.
#[derive(Debug, Clone, Default)]
pub(crate) struct Discovery {
    /// Symbolic path to the ordered error ids it can carry.
    pub(crate) template: IndexMap<String, Vec<ErrorId>>,
    /// Base path to relative path to absolute path.
    pub(crate) path_map: HashMap<String, HashMap<String, String>>,
    /// True when a scope can be re-entered through itself.
    pub(crate) reference_loop_possible: bool,
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Walk state for one discovery pass.
pub(crate) struct DiscoveryContext<'a> {
    /// Compiled scopes.
    scopes: &'a [Box<dyn ErasedScope>],
    /// Symbolic path stack; the bottom entry is the root path.
    paths: Vec<String>,
    /// Scopes currently being walked.
    stack: Vec<ScopeId>,
    /// Output accumulated so far.
    output: Discovery,
}

impl<'a> DiscoveryContext<'a> {
    /// Creates a context over compiled scopes.
    pub(crate) fn new(scopes: &'a [Box<dyn ErasedScope>]) -> Self {
        Self {
            scopes,
            paths: vec![String::new()],
            stack: Vec::new(),
            output: Discovery::default(),
        }
    }

    /// Walks from `root` and returns the collected metadata.
    pub(crate) fn run(mut self, root: ScopeId) -> Result<Discovery, IntegrityError> {
        self.enter_scope(root, false)?;
        Ok(self.output)
    }

    /// Returns the current symbolic path.
    fn current(&self) -> &str {
        self.paths.last().map_or("", String::as_str)
    }

    /// Records an error at the current path.
    pub(crate) fn add_error(&mut self, error: ErrorId, skip_duplicate: bool) {
        let path = self.current().to_string();
        let errors = self.output.template.entry(path).or_default();
        if skip_duplicate && errors.contains(&error) {
            return;
        }
        errors.push(error);
    }

    /// Enters a relative path, or re-enters the current one for `None`.
    pub(crate) fn enter_path(&mut self, relative: Option<&str>) {
        let base = self.current().to_string();
        let next = match relative {
            None => base,
            Some(relative) => {
                let absolute = path::resolve(&base, relative);
                self.output
                    .path_map
                    .entry(base)
                    .or_default()
                    .insert(relative.to_string(), absolute.clone());
                absolute
            }
        };
        self.paths.push(next);
    }

    /// Enters the symbolic item segment of a collection or dictionary.
    pub(crate) fn enter_item(&mut self) {
        let next = path::append(self.current(), path::marker_segment());
        self.paths.push(next);
    }

    /// Leaves the innermost path.
    pub(crate) fn leave_path(&mut self) {
        if self.paths.len() > 1 {
            self.paths.pop();
        }
    }

    /// Walks a nested scope unless it is already on the stack.
    pub(crate) fn enter_scope(&mut self, id: ScopeId, nullable: bool) -> Result<(), IntegrityError> {
        if self.stack.contains(&id) {
            trace!(scope = %id, path = self.current(), "reference loop possible");
            self.add_error(ErrorId::REFERENCE_LOOP, true);
            self.output.reference_loop_possible = true;
            return Ok(());
        }

        let scopes = self.scopes;
        let scope = scopes.get(id.index()).ok_or(IntegrityError::MissingScope(id))?;
        self.stack.push(id);
        let outcome = scope.discover(self, nullable);
        self.stack.pop();
        outcome
    }
}
