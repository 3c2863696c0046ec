// crates/spec-guard/src/specification.rs
// ============================================================================
// Module: Specifications
// Description: Specification handles, the authoring builder, and commands.
// Purpose: Capture a model's constraints as a command stream for compilation.
// Dependencies: crate::{args, compiler, error, scope}
// ============================================================================

//! ## Overview
//! A [`Specification<T>`] is a shared handle around a builder body. The body is
//! evaluated once per compilation and produces an ordered stream of commands:
//! presence directives, rules, scope entries, and the modifiers that follow
//! them. Handle identity is what the compiler memoizes on, so cloning a handle
//! shares its compiled scope while building a second handle from the same
//! closure does not.
//!
//! Recursive models use two-phase registration. [`Specification::declare`]
//! reserves a handle and [`Specification::define`] fills it in later;
//! [`Specification::recursive`] does both and hands the body a weak
//! self-handle so the specification does not keep itself alive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::type_name;
use std::fmt;
use std::fmt::Display;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::Weak;

use crate::args::Arg;
use crate::compiler::ScopeCompiler;
use crate::error::SpecificationError;
use crate::scope::Accessor;
use crate::scope::CollectionBody;
use crate::scope::CommandBody;
use crate::scope::ConvertedBody;
use crate::scope::DictionaryBody;
use crate::scope::MemberBody;
use crate::scope::ModelBody;
use crate::scope::NullableBody;
use crate::scope::Presence;
use crate::scope::TypeBody;

// ============================================================================
// SECTION: Handles
// ============================================================================

/// Builder body stored behind a specification handle.
type Body<T> = Box<dyn Fn(SpecificationBuilder<T>) -> SpecificationBuilder<T> + Send + Sync>;

/// Shared storage behind a specification handle.
pub(crate) struct SpecificationCell<T: 'static> {
    /// Body, set once.
    body: OnceLock<Body<T>>,
}

impl<T: 'static> SpecificationCell<T> {
    /// Evaluates the body into its command stream.
    pub(crate) fn evaluate(&self) -> Result<Vec<Command<T>>, SpecificationError> {
        let body = self.body.get().ok_or(SpecificationError::Undefined {
            type_name: type_name::<T>(),
        })?;
        Ok(body(SpecificationBuilder::new()).commands)
    }
}

/// Strong or weak reference to a specification cell.
enum Link<T: 'static> {
    /// Owning reference.
    Strong(Arc<SpecificationCell<T>>),
    /// Non-owning reference, used for self-reference.
    Weak(Weak<SpecificationCell<T>>),
}

/// Reusable, identity-bearing specification of model type `T`.
///
/// # Invariants
/// - Clones share identity and therefore a compiled scope.
/// - A body is defined at most once.
pub struct Specification<T: 'static> {
    /// Reference to the shared cell.
    link: Link<T>,
}

impl<T: 'static> Specification<T> {
    /// Creates a specification from a builder body.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(SpecificationBuilder<T>) -> SpecificationBuilder<T> + Send + Sync + 'static,
    {
        let cell = SpecificationCell {
            body: OnceLock::from(Box::new(body) as Body<T>),
        };
        Self {
            link: Link::Strong(Arc::new(cell)),
        }
    }

    /// Reserves a handle whose body is supplied later through [`Self::define`].
    #[must_use]
    pub fn declare() -> Self {
        Self {
            link: Link::Strong(Arc::new(SpecificationCell {
                body: OnceLock::new(),
            })),
        }
    }

    /// Supplies the body of a declared handle.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::AlreadyDefined`] when a body already
    /// exists, or [`SpecificationError::Dropped`] for a dangling weak handle.
    pub fn define<F>(&self, body: F) -> Result<(), SpecificationError>
    where
        F: Fn(SpecificationBuilder<T>) -> SpecificationBuilder<T> + Send + Sync + 'static,
    {
        self.upgrade()?.body.set(Box::new(body)).map_err(|_| SpecificationError::AlreadyDefined {
            type_name: type_name::<T>(),
        })
    }

    /// Creates a self-referencing specification.
    ///
    /// The body receives a weak handle to the specification being defined.
    pub fn recursive<F>(body: F) -> Self
    where
        F: Fn(SpecificationBuilder<T>, &Self) -> SpecificationBuilder<T> + Send + Sync + 'static,
    {
        let cell = Arc::new_cyclic(|weak: &Weak<SpecificationCell<T>>| {
            let this = Self {
                link: Link::Weak(weak.clone()),
            };
            let body: Body<T> = Box::new(move |builder| body(builder, &this));
            SpecificationCell {
                body: OnceLock::from(body),
            }
        });
        Self {
            link: Link::Strong(cell),
        }
    }

    /// Returns a weak handle with the same identity.
    #[must_use]
    pub fn downgrade(&self) -> Self {
        let weak = match &self.link {
            Link::Strong(cell) => Arc::downgrade(cell),
            Link::Weak(weak) => weak.clone(),
        };
        Self {
            link: Link::Weak(weak),
        }
    }

    /// Returns true when the handle has a body.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.upgrade().is_ok_and(|cell| cell.body.get().is_some())
    }

    /// Resolves the handle to its shared cell.
    pub(crate) fn upgrade(&self) -> Result<Arc<SpecificationCell<T>>, SpecificationError> {
        match &self.link {
            Link::Strong(cell) => Ok(Arc::clone(cell)),
            Link::Weak(weak) => weak.upgrade().ok_or(SpecificationError::Dropped {
                type_name: type_name::<T>(),
            }),
        }
    }
}

impl<T: 'static> Clone for Specification<T> {
    fn clone(&self) -> Self {
        let link = match &self.link {
            Link::Strong(cell) => Link::Strong(Arc::clone(cell)),
            Link::Weak(weak) => Link::Weak(weak.clone()),
        };
        Self {
            link,
        }
    }
}

impl<T: 'static> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strong = matches!(self.link, Link::Strong(_));
        f.debug_struct("Specification")
            .field("model", &type_name::<T>())
            .field("strong", &strong)
            .field("defined", &self.is_defined())
            .finish()
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Shared predicate over a model.
pub(crate) type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Deferred compilation of a scope command's body.
pub(crate) type CompileBody<T> =
    Box<dyn FnOnce(&mut ScopeCompiler) -> Result<Box<dyn CommandBody<T>>, SpecificationError>>;

/// One instruction emitted by a specification body.
pub(crate) enum Command<T: 'static> {
    /// Presence directive; only valid as the first command.
    Presence(Presence),
    /// Predicate with an optional message key and args.
    Rule {
        /// Predicate that must hold.
        predicate: Predicate<T>,
        /// Message key, `None` for the generic error.
        message: Option<String>,
        /// Placeholder args.
        args: Vec<Arg>,
    },
    /// Entry into a nested scope.
    Scope(ScopeCommand<T>),
    /// Modifier applied to the preceding command.
    Modifier(Modifier<T>),
}

/// Scope-entry command awaiting compilation.
pub(crate) struct ScopeCommand<T: 'static> {
    /// Command name used in authoring errors.
    pub(crate) kind: &'static str,
    /// Path segment implied by the command itself.
    pub(crate) default_path: Option<String>,
    /// Compiles the body, registering nested specifications.
    pub(crate) compile: CompileBody<T>,
}

/// Modifier command.
pub(crate) enum Modifier<T: 'static> {
    /// Run the command only when the predicate holds.
    Condition(Predicate<T>),
    /// Relative path.
    Path(String),
    /// Single segment name.
    Name(String),
    /// Replace messages.
    Message(String),
    /// Add a message.
    ExtraMessage(String),
    /// Replace codes.
    Code(String),
    /// Add a code.
    ExtraCode(String),
    /// Drop messages and codes.
    Clear,
}

impl<T: 'static> Modifier<T> {
    /// Returns the authoring name.
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Condition(_) => "with_condition",
            Self::Path(_) => "with_path",
            Self::Name(_) => "with_name",
            Self::Message(_) => "with_message",
            Self::ExtraMessage(_) => "with_extra_message",
            Self::Code(_) => "with_code",
            Self::ExtraCode(_) => "with_extra_code",
            Self::Clear => "clear_errors",
        }
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Collects the commands of one specification evaluation.
pub struct SpecificationBuilder<T: 'static> {
    /// Commands in declaration order.
    commands: Vec<Command<T>>,
}

impl<T: 'static> SpecificationBuilder<T> {
    /// Creates an empty builder.
    pub(crate) const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Appends a command.
    fn push(mut self, command: Command<T>) -> Self {
        self.commands.push(command);
        self
    }

    /// Appends a scope command.
    fn scope<F>(self, kind: &'static str, default_path: Option<String>, compile: F) -> Self
    where
        F: FnOnce(&mut ScopeCompiler) -> Result<Box<dyn CommandBody<T>>, SpecificationError>
            + 'static,
    {
        self.push(Command::Scope(ScopeCommand {
            kind,
            default_path,
            compile: Box::new(compile),
        }))
    }

    // ------------------------------------------------------------------------
    // Presence
    // ------------------------------------------------------------------------

    /// Requires the model to be present. This is the default.
    #[must_use]
    pub fn required(self) -> Self {
        self.push(Command::Presence(Presence::Required))
    }

    /// Accepts an absent model without error.
    #[must_use]
    pub fn optional(self) -> Self {
        self.push(Command::Presence(Presence::Optional))
    }

    /// Requires the model to be absent.
    #[must_use]
    pub fn forbidden(self) -> Self {
        self.push(Command::Presence(Presence::Forbidden))
    }

    // ------------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------------

    /// Adds a predicate reported with the generic error.
    #[must_use]
    pub fn rule<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.push(Command::Rule {
            predicate: Arc::new(predicate),
            message: None,
            args: Vec::new(),
        })
    }

    /// Adds a predicate reported with a message key and placeholder args.
    #[must_use]
    pub fn rule_template<F>(
        self,
        predicate: F,
        message_key: impl Into<String>,
        args: impl IntoIterator<Item = Arg>,
    ) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.push(Command::Rule {
            predicate: Arc::new(predicate),
            message: Some(message_key.into()),
            args: args.into_iter().collect(),
        })
    }

    // ------------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------------

    /// Validates a member with its own specification under the member's name.
    #[must_use]
    pub fn member<M, F>(self, name: &str, accessor: F, specification: Specification<M>) -> Self
    where
        M: 'static,
        F: for<'a> Fn(&'a T) -> &'a M + Send + Sync + 'static,
    {
        self.scope("member", Some(name.to_string()), move |compiler| {
            let target = compiler.get_or_register_scope(&specification)?;
            Ok(Box::new(MemberBody::new(Accessor::Present(Box::new(accessor)), target))
                as Box<dyn CommandBody<T>>)
        })
    }

    /// Validates a member that may be absent.
    ///
    /// An absent member is handed to its specification as absent, so that
    /// specification's presence rule decides the outcome.
    #[must_use]
    pub fn optional_member<M, F>(
        self,
        name: &str,
        accessor: F,
        specification: Specification<M>,
    ) -> Self
    where
        M: 'static,
        F: for<'a> Fn(&'a T) -> Option<&'a M> + Send + Sync + 'static,
    {
        self.scope("optional_member", Some(name.to_string()), move |compiler| {
            let target = compiler.get_or_register_scope(&specification)?;
            Ok(Box::new(MemberBody::new(Accessor::Nullable(Box::new(accessor)), target))
                as Box<dyn CommandBody<T>>)
        })
    }

    /// Validates the same model against another specification.
    #[must_use]
    pub fn as_model(self, specification: Specification<T>) -> Self {
        self.scope("as_model", None, move |compiler| {
            let target = compiler.get_or_register_scope(&specification)?;
            Ok(Box::new(ModelBody::new(target)) as Box<dyn CommandBody<T>>)
        })
    }

    /// Validates every item of a collection.
    #[must_use]
    pub fn as_collection<I>(self, specification: Specification<I>) -> Self
    where
        I: 'static,
        for<'a> &'a T: IntoIterator<Item = &'a I>,
    {
        self.scope("as_collection", None, move |compiler| {
            let target = compiler.get_or_register_scope(&specification)?;
            Ok(Box::new(CollectionBody::<T, I>::new(target)) as Box<dyn CommandBody<T>>)
        })
    }

    /// Validates every value of a dictionary under its displayed key.
    #[must_use]
    pub fn as_dictionary<K, V>(self, specification: Specification<V>) -> Self
    where
        K: Display + 'static,
        V: 'static,
        for<'a> &'a T: IntoIterator<Item = (&'a K, &'a V)>,
    {
        self.as_dictionary_with(specification, <K as ToString>::to_string)
    }

    /// Validates every value of a dictionary under a custom key segment.
    ///
    /// Keys that are not valid path segments are normalized at run time, so
    /// `"John Smith"` reports under `John_Smith`.
    #[must_use]
    pub fn as_dictionary_with<K, V, F>(self, specification: Specification<V>, key: F) -> Self
    where
        K: 'static,
        V: 'static,
        F: Fn(&K) -> String + Send + Sync + 'static,
        for<'a> &'a T: IntoIterator<Item = (&'a K, &'a V)>,
    {
        self.scope("as_dictionary", None, move |compiler| {
            let target = compiler.get_or_register_scope(&specification)?;
            Ok(Box::new(DictionaryBody::<T, K, V>::new(Box::new(key), target))
                as Box<dyn CommandBody<T>>)
        })
    }

    /// Validates a value derived from the model.
    #[must_use]
    pub fn as_converted<U, F>(self, convert: F, specification: Specification<U>) -> Self
    where
        U: 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        self.scope("as_converted", None, move |compiler| {
            let target = compiler.get_or_register_scope(&specification)?;
            Ok(Box::new(ConvertedBody::new(Box::new(convert), target)) as Box<dyn CommandBody<T>>)
        })
    }

    /// Validates the model as `U` when the narrowing succeeds; skips otherwise.
    #[must_use]
    pub fn as_type<U, F>(self, narrow: F, specification: Specification<U>) -> Self
    where
        U: 'static,
        F: for<'a> Fn(&'a T) -> Option<&'a U> + Send + Sync + 'static,
    {
        self.scope("as_type", None, move |compiler| {
            let target = compiler.get_or_register_scope(&specification)?;
            Ok(Box::new(TypeBody::new(Box::new(narrow), target)) as Box<dyn CommandBody<T>>)
        })
    }

    // ------------------------------------------------------------------------
    // Modifiers
    // ------------------------------------------------------------------------

    /// Runs the preceding command only when `condition` holds.
    #[must_use]
    pub fn with_condition<F>(self, condition: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.push(Command::Modifier(Modifier::Condition(Arc::new(condition))))
    }

    /// Places the preceding command at a relative path.
    #[must_use]
    pub fn with_path(self, path: impl Into<String>) -> Self {
        self.push(Command::Modifier(Modifier::Path(path.into())))
    }

    /// Places the preceding command under a single segment name.
    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.push(Command::Modifier(Modifier::Name(name.into())))
    }

    /// Replaces the preceding command's messages.
    #[must_use]
    pub fn with_message(self, message: impl Into<String>) -> Self {
        self.push(Command::Modifier(Modifier::Message(message.into())))
    }

    /// Adds a message to the preceding command.
    #[must_use]
    pub fn with_extra_message(self, message: impl Into<String>) -> Self {
        self.push(Command::Modifier(Modifier::ExtraMessage(message.into())))
    }

    /// Replaces the preceding command's codes.
    #[must_use]
    pub fn with_code(self, code: impl Into<String>) -> Self {
        self.push(Command::Modifier(Modifier::Code(code.into())))
    }

    /// Adds a code to the preceding command.
    #[must_use]
    pub fn with_extra_code(self, code: impl Into<String>) -> Self {
        self.push(Command::Modifier(Modifier::ExtraCode(code.into())))
    }

    /// Drops the preceding command's messages and codes.
    #[must_use]
    pub fn clear_errors(self) -> Self {
        self.push(Command::Modifier(Modifier::Clear))
    }
}

impl<U: 'static> SpecificationBuilder<Option<U>> {
    /// Unwraps an optional model, handing absence to the target's presence rule.
    #[must_use]
    pub fn as_nullable(self, specification: Specification<U>) -> Self {
        self.scope("as_nullable", None, move |compiler| {
            let target = compiler.get_or_register_scope(&specification)?;
            Ok(Box::new(NullableBody::new(target)) as Box<dyn CommandBody<Option<U>>>)
        })
    }
}

impl<T: 'static> fmt::Debug for SpecificationBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationBuilder")
            .field("model", &type_name::<T>())
            .field("commands", &self.commands.len())
            .finish()
    }
}
