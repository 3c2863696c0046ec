// crates/spec-guard/src/scope.rs
// ============================================================================
// Module: Compiled Scopes
// Description: Command scopes, their bodies, and type-erased specification scopes.
// Purpose: Hold the immutable, integer-addressed validation graph.
// Dependencies: crate::{context, discovery, error, registry}
// ============================================================================

//! ## Overview
//! A specification compiles into one [`SpecificationScope`]: a presence mode,
//! the required/forbidden error ids, and an ordered list of
//! [`CommandScope`]s. A command scope is either a leaf rule or a nested body
//! that enters another specification scope by [`ScopeId`]. Scopes are stored
//! type-erased behind [`ErasedScope`] so one registry can hold every model type
//! of the graph; each scope downcasts the model it receives.
//!
//! Both interpreters and the discovery walk drive the same scopes, so the
//! static template and runtime results agree on paths and error ids.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::any::TypeId;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

use serde::Deserialize;
use serde::Serialize;

use crate::context::ValidationContext;
use crate::discovery::DiscoveryContext;
use crate::error::IntegrityError;
use crate::error::ValidationError;
use crate::registry::ErrorId;
use crate::registry::ErrorMode;
use crate::specification::Predicate;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Dense identifier of a compiled specification scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    /// Returns the registry index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SECTION: Presence
// ============================================================================

/// Whether a model must, may, or must not be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Absence is reported with the required error.
    #[default]
    Required,
    /// Absence is accepted silently.
    Optional,
    /// Presence is reported with the forbidden error.
    Forbidden,
}

impl Presence {
    /// Returns the authoring name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Forbidden => "forbidden",
        }
    }
}

// ============================================================================
// SECTION: Command Bodies
// ============================================================================

/// Nested behavior of a scope command.
pub(crate) trait CommandBody<T>: Send + Sync {
    /// Walks nested scopes statically.
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError>;

    /// Validates the nested scopes against `model`.
    fn run(&self, model: &T, context: &mut dyn ValidationContext) -> Result<(), ValidationError>;
}

/// Member accessor, either always present or possibly absent.
pub(crate) enum Accessor<T, M> {
    /// Accessor that always yields a value.
    Present(Box<dyn for<'a> Fn(&'a T) -> &'a M + Send + Sync>),
    /// Accessor that may yield nothing.
    Nullable(Box<dyn for<'a> Fn(&'a T) -> Option<&'a M> + Send + Sync>),
}

/// Enters another specification with the same model.
pub(crate) struct ModelBody {
    /// Target scope.
    target: ScopeId,
}

impl ModelBody {
    /// Creates the body.
    pub(crate) const fn new(target: ScopeId) -> Self {
        Self {
            target,
        }
    }
}

impl<T: 'static> CommandBody<T> for ModelBody {
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError> {
        context.enter_scope(self.target, false)
    }

    fn run(&self, model: &T, context: &mut dyn ValidationContext) -> Result<(), ValidationError> {
        context.enter_scope(self.target, Some(model as &dyn Any))
    }
}

/// Enters a member's specification.
pub(crate) struct MemberBody<T, M> {
    /// Member accessor.
    accessor: Accessor<T, M>,
    /// Target scope.
    target: ScopeId,
}

impl<T, M> MemberBody<T, M> {
    /// Creates the body.
    pub(crate) const fn new(accessor: Accessor<T, M>, target: ScopeId) -> Self {
        Self {
            accessor,
            target,
        }
    }
}

impl<T: 'static, M: 'static> CommandBody<T> for MemberBody<T, M> {
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError> {
        let nullable = matches!(self.accessor, Accessor::Nullable(_));
        context.enter_scope(self.target, nullable)
    }

    fn run(&self, model: &T, context: &mut dyn ValidationContext) -> Result<(), ValidationError> {
        let member = match &self.accessor {
            Accessor::Present(accessor) => Some(accessor(model)),
            Accessor::Nullable(accessor) => accessor(model),
        };
        context.enter_scope(self.target, member.map(|value| value as &dyn Any))
    }
}

/// Enters an item specification for every collection item.
pub(crate) struct CollectionBody<T, I> {
    /// Item scope.
    target: ScopeId,
    /// Model and item types.
    marker: PhantomData<fn(&T, &I)>,
}

impl<T, I> CollectionBody<T, I> {
    /// Creates the body.
    pub(crate) const fn new(target: ScopeId) -> Self {
        Self {
            target,
            marker: PhantomData,
        }
    }
}

impl<T: 'static, I: 'static> CommandBody<T> for CollectionBody<T, I>
where
    for<'a> &'a T: IntoIterator<Item = &'a I>,
{
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError> {
        context.enter_item();
        let outcome = context.enter_scope(self.target, false);
        context.leave_path();
        outcome
    }

    fn run(&self, model: &T, context: &mut dyn ValidationContext) -> Result<(), ValidationError> {
        for (index, item) in model.into_iter().enumerate() {
            context.enter_collection_item(index);
            let outcome = context.enter_scope(self.target, Some(item as &dyn Any));
            context.leave_path();
            outcome?;
            if context.should_fall_back() {
                break;
            }
        }
        Ok(())
    }
}

/// Enters a value specification for every dictionary entry.
pub(crate) struct DictionaryBody<T, K, V> {
    /// Stringifies a key.
    key: Box<dyn Fn(&K) -> String + Send + Sync>,
    /// Value scope.
    target: ScopeId,
    /// Model and entry types.
    marker: PhantomData<fn(&T, &V)>,
}

impl<T, K, V> DictionaryBody<T, K, V> {
    /// Creates the body.
    pub(crate) fn new(key: Box<dyn Fn(&K) -> String + Send + Sync>, target: ScopeId) -> Self {
        Self {
            key,
            target,
            marker: PhantomData,
        }
    }
}

impl<T: 'static, K: 'static, V: 'static> CommandBody<T> for DictionaryBody<T, K, V>
where
    for<'a> &'a T: IntoIterator<Item = (&'a K, &'a V)>,
{
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError> {
        context.enter_item();
        let outcome = context.enter_scope(self.target, false);
        context.leave_path();
        outcome
    }

    fn run(&self, model: &T, context: &mut dyn ValidationContext) -> Result<(), ValidationError> {
        for (key, value) in model {
            context.enter_dictionary_key(&(self.key)(key));
            let outcome = context.enter_scope(self.target, Some(value as &dyn Any));
            context.leave_path();
            outcome?;
            if context.should_fall_back() {
                break;
            }
        }
        Ok(())
    }
}

/// Unwraps an optional model.
pub(crate) struct NullableBody<U> {
    /// Target scope.
    target: ScopeId,
    /// Inner type.
    marker: PhantomData<fn(&U)>,
}

impl<U> NullableBody<U> {
    /// Creates the body.
    pub(crate) const fn new(target: ScopeId) -> Self {
        Self {
            target,
            marker: PhantomData,
        }
    }
}

impl<U: 'static> CommandBody<Option<U>> for NullableBody<U> {
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError> {
        context.enter_scope(self.target, true)
    }

    fn run(
        &self,
        model: &Option<U>,
        context: &mut dyn ValidationContext,
    ) -> Result<(), ValidationError> {
        context.enter_scope(self.target, model.as_ref().map(|value| value as &dyn Any))
    }
}

/// Validates a derived value.
pub(crate) struct ConvertedBody<T, U> {
    /// Conversion from the model.
    convert: Box<dyn Fn(&T) -> U + Send + Sync>,
    /// Target scope.
    target: ScopeId,
}

impl<T, U> ConvertedBody<T, U> {
    /// Creates the body.
    pub(crate) fn new(convert: Box<dyn Fn(&T) -> U + Send + Sync>, target: ScopeId) -> Self {
        Self {
            convert,
            target,
        }
    }
}

impl<T: 'static, U: 'static> CommandBody<T> for ConvertedBody<T, U> {
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError> {
        context.enter_scope(self.target, false)
    }

    fn run(&self, model: &T, context: &mut dyn ValidationContext) -> Result<(), ValidationError> {
        let value = (self.convert)(model);
        context.enter_scope(self.target, Some(&value as &dyn Any))
    }
}

/// Validates the model as a narrower type when it is one.
pub(crate) struct TypeBody<T, U> {
    /// Narrowing.
    narrow: Box<dyn for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync>,
    /// Target scope.
    target: ScopeId,
}

impl<T, U> TypeBody<T, U> {
    /// Creates the body.
    pub(crate) fn new(
        narrow: Box<dyn for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync>,
        target: ScopeId,
    ) -> Self {
        Self {
            narrow,
            target,
        }
    }
}

impl<T: 'static, U: 'static> CommandBody<T> for TypeBody<T, U> {
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError> {
        context.enter_scope(self.target, false)
    }

    fn run(&self, model: &T, context: &mut dyn ValidationContext) -> Result<(), ValidationError> {
        match (self.narrow)(model) {
            Some(value) => context.enter_scope(self.target, Some(value as &dyn Any)),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Command Scopes
// ============================================================================

/// What a command scope does once its condition holds.
pub(crate) enum Action<T> {
    /// Leaf predicate.
    Rule {
        /// Predicate that must hold.
        predicate: Predicate<T>,
        /// Error reported on failure.
        error: ErrorId,
    },
    /// Nested body with an optional composed error.
    Nested {
        /// Body to run.
        body: Box<dyn CommandBody<T>>,
        /// Error enabled around the body.
        error: Option<(ErrorId, ErrorMode)>,
    },
}

/// One compiled behavior at one path.
pub(crate) struct CommandScope<T> {
    /// Relative path entered before acting.
    pub(crate) path: Option<String>,
    /// Execution condition.
    pub(crate) condition: Option<Predicate<T>>,
    /// Behavior.
    pub(crate) action: Action<T>,
}

impl<T: 'static> CommandScope<T> {
    /// Contributes this command to the static template.
    fn discover(&self, context: &mut DiscoveryContext<'_>) -> Result<(), IntegrityError> {
        context.enter_path(self.path.as_deref());
        let outcome = match &self.action {
            Action::Rule {
                error, ..
            } => {
                context.add_error(*error, false);
                Ok(())
            }
            Action::Nested {
                body,
                error: None,
            } => body.discover(context),
            Action::Nested {
                body,
                error: Some((error, ErrorMode::Append)),
            } => body.discover(context).map(|()| context.add_error(*error, false)),
            Action::Nested {
                error: Some((error, ErrorMode::Override)),
                ..
            } => {
                context.add_error(*error, true);
                Ok(())
            }
        };
        context.leave_path();
        outcome
    }

    /// Runs this command against a model.
    fn validate(&self, model: &T, context: &mut dyn ValidationContext) -> Result<(), ValidationError> {
        if self.condition.as_ref().is_some_and(|condition| !condition(model)) {
            return Ok(());
        }

        context.enter_path(self.path.as_deref());
        let outcome = match &self.action {
            Action::Rule {
                predicate,
                error,
            } => {
                if !predicate(model) {
                    context.add_error(*error, false);
                }
                Ok(())
            }
            Action::Nested {
                body,
                error,
            } => {
                if let Some((error, mode)) = error {
                    context.enable_error_detection(*mode, *error);
                }
                body.run(model, context)
            }
        };
        context.leave_path();
        outcome
    }
}

// ============================================================================
// SECTION: Specification Scopes
// ============================================================================

/// Object-safe view of a compiled specification scope.
pub(crate) trait ErasedScope: Send + Sync {
    /// Model type name.
    fn type_name(&self) -> &'static str;

    /// Model type id.
    fn model_type(&self) -> TypeId;

    /// Returns true when model identity is meaningful for loop detection.
    fn tracks_references(&self) -> bool;

    /// Walks the scope statically.
    fn discover(
        &self,
        context: &mut DiscoveryContext<'_>,
        nullable: bool,
    ) -> Result<(), IntegrityError>;

    /// Validates a model, `None` meaning absent.
    fn validate(
        &self,
        model: Option<&dyn Any>,
        context: &mut dyn ValidationContext,
    ) -> Result<(), ValidationError>;
}

/// Compiled form of one specification.
pub(crate) struct SpecificationScope<T> {
    /// Presence mode.
    pub(crate) presence: Presence,
    /// Error reported when a required model is absent.
    pub(crate) required_error: ErrorId,
    /// Error reported when a forbidden model is present.
    pub(crate) forbidden_error: ErrorId,
    /// Commands in declaration order.
    pub(crate) commands: Vec<CommandScope<T>>,
}

impl<T: 'static> ErasedScope for SpecificationScope<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn model_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn tracks_references(&self) -> bool {
        size_of::<T>() != 0
    }

    fn discover(
        &self,
        context: &mut DiscoveryContext<'_>,
        nullable: bool,
    ) -> Result<(), IntegrityError> {
        match self.presence {
            Presence::Forbidden => {
                context.add_error(self.forbidden_error, true);
                return Ok(());
            }
            Presence::Required if nullable => context.add_error(self.required_error, true),
            Presence::Required | Presence::Optional => {}
        }
        for command in &self.commands {
            command.discover(context)?;
        }
        Ok(())
    }

    fn validate(
        &self,
        model: Option<&dyn Any>,
        context: &mut dyn ValidationContext,
    ) -> Result<(), ValidationError> {
        let Some(model) = model else {
            if self.presence == Presence::Required {
                context.add_error(self.required_error, true);
            }
            return Ok(());
        };
        let model = model.downcast_ref::<T>().ok_or(ValidationError::ModelTypeMismatch {
            expected: type_name::<T>(),
        })?;
        if self.presence == Presence::Forbidden {
            context.add_error(self.forbidden_error, true);
            return Ok(());
        }

        for command in &self.commands {
            command.validate(model, context)?;
            if context.should_fall_back() {
                break;
            }
        }
        Ok(())
    }
}
