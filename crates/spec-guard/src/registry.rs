// crates/spec-guard/src/registry.rs
// ============================================================================
// Module: Error Registry
// Description: Interned error descriptors addressed by dense integer ids.
// Purpose: Register every error once at compile time and share it by id.
// Dependencies: serde, smallvec, crate::args
// ============================================================================

//! ## Overview
//! Every error a compiled scheme can report is an [`ErrorDescriptor`] stored
//! once in an append-only [`ErrorRegistry`]. Scopes, templates, and results
//! refer to descriptors by [`ErrorId`]. Four ids are pre-registered: the
//! generic error, the forbidden and required presence errors, and the
//! synthetic reference-loop error. Interning is by registration, not by
//! structure: two identical descriptors registered twice get two ids.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use crate::args::Arg;
use crate::error::SpecificationError;

// ============================================================================
// SECTION: Well-Known Message Keys
// ============================================================================

/// Message key of the generic error.
pub const GENERIC_MESSAGE_KEY: &str = "Global.Error";
/// Message key of the forbidden presence error.
pub const FORBIDDEN_MESSAGE_KEY: &str = "Global.Forbidden";
/// Message key of the required presence error.
pub const REQUIRED_MESSAGE_KEY: &str = "Global.Required";
/// Message key of the reference-loop error.
pub const REFERENCE_LOOP_MESSAGE_KEY: &str = "Global.ReferenceLoop";

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Dense identifier of a registered error descriptor.
///
/// # Invariants
/// - Only meaningful for the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorId(u32);

impl ErrorId {
    /// Generic error, used by rules without a message.
    pub const GENERIC: Self = Self(0);
    /// Forbidden presence error.
    pub const FORBIDDEN: Self = Self(1);
    /// Required presence error.
    pub const REQUIRED: Self = Self(2);
    /// Reference-loop error recorded by discovery and full validation.
    pub const REFERENCE_LOOP: Self = Self(3);

    /// Returns the registry index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SECTION: Error Mode
// ============================================================================

/// How a scope's own error composes with errors reported beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Nested errors are kept; the scope's error is reported in addition.
    #[default]
    Append,
    /// Nested errors are swallowed; only the scope's error is reported.
    Override,
}

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Immutable error record.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDescriptor {
    /// Message keys or literal messages, in order.
    messages: Vec<String>,
    /// Error codes, in order.
    codes: Vec<String>,
    /// Arguments available to message placeholders.
    args: Vec<Arg>,
}

impl ErrorDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(messages: Vec<String>, codes: Vec<String>, args: Vec<Arg>) -> Self {
        Self {
            messages,
            codes,
            args,
        }
    }

    /// Creates a descriptor with a single message and no codes or args.
    #[must_use]
    pub fn message(message: &str) -> Self {
        Self::new(vec![message.to_string()], Vec::new(), Vec::new())
    }

    /// Returns the messages.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns the codes.
    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Returns the args.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Returns true when the descriptor carries neither messages nor codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.codes.is_empty()
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Append-only list of error descriptors.
///
/// # Invariants
/// - Ids `0..=3` always hold the well-known descriptors.
/// - Entries are never removed or modified.
#[derive(Debug, Clone)]
pub struct ErrorRegistry {
    /// Descriptors indexed by [`ErrorId`].
    errors: Vec<ErrorDescriptor>,
}

impl ErrorRegistry {
    /// Maximum number of descriptors a registry can hold.
    const MAX_ERRORS: usize = u32::MAX as usize;

    /// Creates a registry holding the well-known descriptors.
    #[must_use]
    pub fn new() -> Self {
        Self {
            errors: vec![
                ErrorDescriptor::message(GENERIC_MESSAGE_KEY),
                ErrorDescriptor::message(FORBIDDEN_MESSAGE_KEY),
                ErrorDescriptor::message(REQUIRED_MESSAGE_KEY),
                ErrorDescriptor::message(REFERENCE_LOOP_MESSAGE_KEY),
            ],
        }
    }

    /// Registers a descriptor and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::RegistryOverflow`] when ids are exhausted.
    pub fn register(&mut self, error: ErrorDescriptor) -> Result<ErrorId, SpecificationError> {
        let index = self.errors.len();
        let overflow = || SpecificationError::RegistryOverflow {
            max_errors: Self::MAX_ERRORS,
            attempted: index + 1,
        };
        if index >= Self::MAX_ERRORS {
            return Err(overflow());
        }
        let id = u32::try_from(index).map_err(|_| overflow())?;
        self.errors.push(error);
        Ok(ErrorId(id))
    }

    /// Returns a descriptor by id.
    #[must_use]
    pub fn get(&self, id: ErrorId) -> Option<&ErrorDescriptor> {
        self.errors.get(id.index())
    }

    /// Returns the number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true when only the well-known descriptors exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.len() <= ErrorId::REFERENCE_LOOP.index() + 1
    }

    /// Iterates `(id, descriptor)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ErrorId, &ErrorDescriptor)> {
        self.errors.iter().enumerate().filter_map(|(index, error)| {
            u32::try_from(index).ok().map(|raw| (ErrorId(raw), error))
        })
    }
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Error Builder
// ============================================================================

/// Accumulates one command run's error shaping.
///
/// Starts from a seed (the rule's message key, a presence key, or nothing) and
/// applies message/code modifiers in order.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorBuilder {
    /// Current messages.
    messages: SmallVec<[String; 2]>,
    /// Current codes.
    codes: SmallVec<[String; 2]>,
    /// Args carried from the seed.
    args: Vec<Arg>,
    /// Current composition mode.
    mode: ErrorMode,
    /// True once any modifier was applied.
    touched: bool,
}

impl ErrorBuilder {
    /// Creates a builder seeded with one message key and its args.
    pub(crate) fn seeded(key: &str, args: Vec<Arg>) -> Self {
        let mut messages = SmallVec::new();
        messages.push(key.to_string());
        Self {
            messages,
            args,
            ..Self::default()
        }
    }

    /// Replaces the messages, switching to override on first use.
    pub(crate) fn set_message(&mut self, message: String) {
        self.enter_override(true);
        self.messages.push(message);
    }

    /// Appends a message.
    pub(crate) fn add_message(&mut self, message: String) {
        self.touched = true;
        self.messages.push(message);
    }

    /// Replaces the codes, switching to override on first use.
    pub(crate) fn set_code(&mut self, code: String) {
        self.enter_override(false);
        self.codes.push(code);
    }

    /// Appends a code.
    pub(crate) fn add_code(&mut self, code: String) {
        self.touched = true;
        self.codes.push(code);
    }

    /// Drops all messages and codes and returns to append mode.
    pub(crate) fn clear(&mut self) {
        self.touched = true;
        self.messages.clear();
        self.codes.clear();
        self.mode = ErrorMode::Append;
    }

    /// Returns true once any modifier was applied.
    pub(crate) const fn is_touched(&self) -> bool {
        self.touched
    }

    /// Returns the composition mode.
    pub(crate) const fn mode(&self) -> ErrorMode {
        self.mode
    }

    /// Returns true when no messages and no codes remain.
    pub(crate) fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.codes.is_empty()
    }

    /// Consumes the builder into a descriptor.
    pub(crate) fn into_descriptor(self) -> ErrorDescriptor {
        ErrorDescriptor::new(self.messages.into_vec(), self.codes.into_vec(), self.args)
    }

    /// Switches to override, clearing the whole error on the first switch and
    /// only the touched list afterwards.
    fn enter_override(&mut self, messages: bool) {
        self.touched = true;
        if self.mode == ErrorMode::Append {
            self.messages.clear();
            self.codes.clear();
            self.mode = ErrorMode::Override;
        } else if messages {
            self.messages.clear();
        } else {
            self.codes.clear();
        }
    }
}

#[cfg(test)]
mod tests;
