// crates/spec-guard/src/error.rs
// ============================================================================
// Module: Validation Error Taxonomy
// Description: Structured failures for authoring, integrity, and runtime walks.
// Purpose: Keep compile-time, structural, and runtime failures in distinct types.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Rule violations are never errors: they are error ids recorded into a
//! result. The types here cover everything else. Authoring mistakes surface
//! from compilation, structural integrity breaks surface from explicit
//! verification, and runtime structural failures (reference loops in boolean
//! mode, impossible scope lookups) propagate out of a validation call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::registry::ErrorId;
use crate::scope::ScopeId;

// ============================================================================
// SECTION: Authoring Errors
// ============================================================================

/// Invalid specification construction detected while compiling.
///
/// # Invariants
/// - Raised only by compilation; never produced while validating a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecificationError {
    /// A presence command appeared after the first command of a specification.
    #[error("presence command `{presence}` must be the first command of a specification")]
    PresenceNotFirst {
        /// Presence command name.
        presence: &'static str,
    },
    /// A modifier appeared with no rule or scope command before it.
    #[error("modifier `{modifier}` has no preceding command to modify")]
    ModifierWithoutCommand {
        /// Modifier name.
        modifier: &'static str,
    },
    /// A modifier is not accepted by the command it follows.
    #[error("modifier `{modifier}` cannot follow `{command}`")]
    ModifierNotAllowed {
        /// Modifier name.
        modifier: &'static str,
        /// Command name.
        command: &'static str,
    },
    /// A single-use modifier appeared twice for one command.
    #[error("modifier `{modifier}` was applied more than once to `{command}`")]
    DuplicateModifier {
        /// Modifier name.
        modifier: &'static str,
        /// Command name.
        command: &'static str,
    },
    /// An error code is empty or contains whitespace.
    #[error("invalid error code: `{0}`")]
    InvalidCode(String),
    /// An error message is empty.
    #[error("error messages must not be empty")]
    EmptyMessage,
    /// A path segment name is not a valid single segment.
    #[error("invalid path segment name: `{0}`")]
    InvalidName(String),
    /// A relative path does not follow the path grammar.
    #[error("invalid path: `{0}`")]
    InvalidPath(String),
    /// A specification handle was declared but never defined.
    #[error("specification for `{type_name}` was declared but never defined")]
    Undefined {
        /// Model type of the specification.
        type_name: &'static str,
    },
    /// A specification was defined twice.
    #[error("specification for `{type_name}` is already defined")]
    AlreadyDefined {
        /// Model type of the specification.
        type_name: &'static str,
    },
    /// A weak specification handle outlived its owner.
    #[error("specification for `{type_name}` was dropped before compilation")]
    Dropped {
        /// Model type of the specification.
        type_name: &'static str,
    },
    /// The error registry cannot address more descriptors.
    #[error("error registry overflow: attempted {attempted} errors (max {max_errors})")]
    RegistryOverflow {
        /// Maximum number of descriptors allowed.
        max_errors: usize,
        /// Attempted total after insertion.
        attempted: usize,
    },
    /// The scope registry cannot address more scopes.
    #[error("scope registry overflow: attempted {attempted} scopes (max {max_scopes})")]
    ScopeOverflow {
        /// Maximum number of scopes allowed.
        max_scopes: usize,
        /// Attempted total after insertion.
        attempted: usize,
    },
    /// The compiled root does not match the validator's model type.
    #[error("root scope models `{actual}`, expected `{expected}`")]
    RootTypeMismatch {
        /// Type requested by the caller.
        expected: &'static str,
        /// Type of the compiled root scope.
        actual: &'static str,
    },
    /// Compilation produced an internally inconsistent artifact.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

// ============================================================================
// SECTION: Structural Integrity Errors
// ============================================================================

/// Broken registry or cache invariants.
///
/// Unreachable in correct builds; surfaced by explicit verification passes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// A reserved scope slot was never filled in.
    #[error("scope {0} was reserved but never compiled")]
    UnfilledScope(ScopeId),
    /// A scope id does not resolve in the registry.
    #[error("scope {0} does not exist")]
    MissingScope(ScopeId),
    /// A translation lacks rendered messages for an error id.
    #[error("translation `{translation}` has no messages for error {error}")]
    MissingTranslationEntry {
        /// Translation name.
        translation: String,
        /// Error id without an entry.
        error: ErrorId,
    },
    /// A path-argument index points past the message list.
    #[error(
        "translation `{translation}` marks message {index} of error {error} as path-dependent, but only {count} messages exist"
    )]
    PathArgIndexOutOfRange {
        /// Translation name.
        translation: String,
        /// Error id of the offending entry.
        error: ErrorId,
        /// Recorded message index.
        index: usize,
        /// Number of messages for the error.
        count: usize,
    },
}

// ============================================================================
// SECTION: Runtime Errors
// ============================================================================

/// Structural failures raised out of a validation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A model reference re-entered a scope it is already being validated in.
    ///
    /// Raised by boolean validation only; no path information is tracked there.
    #[error("reference loop detected in scope {scope_id} for type `{type_name}`")]
    ReferenceLoop {
        /// Scope that was re-entered.
        scope_id: ScopeId,
        /// Model type of the scope.
        type_name: &'static str,
    },
    /// The scope graph references a scope that does not exist.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    /// A scope received a model of the wrong type.
    #[error("scope expected a model of type `{expected}`")]
    ModelTypeMismatch {
        /// Type the scope was compiled for.
        expected: &'static str,
    },
}

// ============================================================================
// SECTION: Translation Errors
// ============================================================================

/// Failures when rendering messages for a named translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// No translation with the requested name is loaded.
    #[error("unknown translation: {0}")]
    Unknown(String),
}

// ============================================================================
// SECTION: Settings Errors
// ============================================================================

/// Failures when loading or checking validator settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("settings io error: {0}")]
    Io(String),
    /// The settings file exceeds the size limit.
    #[error("settings file is {size} bytes (max {max_size})")]
    FileTooLarge {
        /// Actual size in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        max_size: usize,
    },
    /// The settings file is not UTF-8.
    #[error("settings file must be utf-8")]
    NotUtf8,
    /// The TOML document could not be parsed.
    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// A translation name is empty.
    #[error("translation names must not be empty")]
    EmptyTranslationName,
    /// A translation key is empty.
    #[error("translation `{0}` contains an empty message key")]
    EmptyTranslationKey(String),
}
