// crates/spec-guard/src/scheme.rs
// ============================================================================
// Module: Model Scheme
// Description: Immutable compiled artifact shared by every validation call.
// Purpose: Bundle scopes, errors, and discovery metadata behind read-only access.
// Dependencies: indexmap, crate::{discovery, error, path, registry, scope}
// ============================================================================

//! ## Overview
//! A [`ModelScheme`] is produced once by the compiler and never mutated. It
//! holds the scope registry, the root scope id, the error registry, the static
//! path template and relative-path map from discovery, and whether a reference
//! loop is structurally possible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::discovery::Discovery;
use crate::error::IntegrityError;
use crate::path;
use crate::registry::ErrorId;
use crate::registry::ErrorRegistry;
use crate::scope::ErasedScope;
use crate::scope::ScopeId;

/// Compiled validation graph with its static metadata.
///
/// # Invariants
/// - Every scope id reachable from the root resolves in `scopes`.
/// - Every error id in the template resolves in `errors`.
pub struct ModelScheme {
    /// Compiled specification scopes.
    scopes: Vec<Box<dyn ErasedScope>>,
    /// Root scope id.
    root: ScopeId,
    /// Model type id and name of the root scope.
    root_type: (TypeId, &'static str),
    /// Registered errors.
    errors: ErrorRegistry,
    /// Static metadata.
    discovery: Discovery,
    /// Specification handles kept alive alongside their compiled scopes.
    _retained: Vec<Arc<dyn Any + Send + Sync>>,
}

impl ModelScheme {
    /// Assembles a scheme from compiler output.
    pub(crate) fn new(
        scopes: Vec<Box<dyn ErasedScope>>,
        root: ScopeId,
        root_type: (TypeId, &'static str),
        errors: ErrorRegistry,
        discovery: Discovery,
        retained: Vec<Arc<dyn Any + Send + Sync>>,
    ) -> Self {
        Self {
            scopes,
            root,
            root_type,
            errors,
            discovery,
            _retained: retained,
        }
    }

    /// Returns the root scope id.
    #[must_use]
    pub const fn root(&self) -> ScopeId {
        self.root
    }

    /// Returns the root model type name.
    #[must_use]
    pub const fn root_type(&self) -> &'static str {
        self.root_type.1
    }

    /// Returns true when the root scope validates models of type `T`.
    #[must_use]
    pub fn is_root_type<T: 'static>(&self) -> bool {
        self.root_type.0 == TypeId::of::<T>()
    }

    /// Returns the number of compiled scopes.
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Returns the model type name of a scope.
    #[must_use]
    pub fn scope_type(&self, id: ScopeId) -> Option<&'static str> {
        self.scopes.get(id.index()).map(|scope| scope.type_name())
    }

    /// Returns the error registry.
    #[must_use]
    pub const fn errors(&self) -> &ErrorRegistry {
        &self.errors
    }

    /// Returns the static path template.
    #[must_use]
    pub const fn template(&self) -> &IndexMap<String, Vec<ErrorId>> {
        &self.discovery.template
    }

    /// Returns the discovered relative-path map.
    #[must_use]
    pub const fn path_map(&self) -> &HashMap<String, HashMap<String, String>> {
        &self.discovery.path_map
    }

    /// Returns true when the scope graph contains a cycle reachable from the root.
    #[must_use]
    pub const fn reference_loop_possible(&self) -> bool {
        self.discovery.reference_loop_possible
    }

    /// Resolves a relative path against a symbolic base path.
    ///
    /// Paths seen during discovery resolve without allocating.
    #[must_use]
    pub fn resolve_path<'s>(&'s self, base: &str, relative: &str) -> Cow<'s, str> {
        self.discovery
            .path_map
            .get(base)
            .and_then(|relatives| relatives.get(relative))
            .map_or_else(|| Cow::Owned(path::resolve(base, relative)), |absolute| {
                Cow::Borrowed(absolute.as_str())
            })
    }

    /// Returns a compiled scope.
    pub(crate) fn scope(&self, id: ScopeId) -> Result<&dyn ErasedScope, IntegrityError> {
        self.scopes.get(id.index()).map(AsRef::as_ref).ok_or(IntegrityError::MissingScope(id))
    }
}

impl fmt::Debug for ModelScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelScheme")
            .field("root", &self.root)
            .field("root_type", &self.root_type.1)
            .field("scopes", &self.scopes.len())
            .field("errors", &self.errors.len())
            .field("template", &self.discovery.template)
            .field("reference_loop_possible", &self.discovery.reference_loop_possible)
            .finish_non_exhaustive()
    }
}
