// crates/spec-guard/src/lib.rs
// ============================================================================
// Module: Spec Guard Root
// Description: Public API surface of the structural validation engine.
// Purpose: Wire together the compiler, interpreters, message cache, and facade.
// Dependencies: crate::{args, capacity, compiler, context, discovery, error, messages, path,
//              registry, result, scheme, scope, settings, specification, translation,
//              validator}
// ============================================================================

//! ## Overview
//! A [`Specification`] describes constraints over a model type as a stream of
//! commands. The [`ScopeCompiler`] turns it once into an immutable
//! [`ModelScheme`]: integer-addressed scopes deduplicated by specification
//! identity, an error registry, and the static path template. A [`Validator`]
//! then runs that scheme against models, either as a fail-fast boolean check
//! or as a full collection of error ids per path, and renders messages through
//! a pre-built translation cache.
//!
//! ```
//! use spec_guard::Specification;
//! use spec_guard::Validator;
//!
//! struct Person {
//!     age: u32,
//! }
//!
//! let age = Specification::<u32>::new(|s| s.rule(|age| *age >= 18).with_message("must be adult"));
//! let person = Specification::<Person>::new(move |s| s.member("Age", |p| &p.age, age.clone()));
//! let validator = Validator::new(&person)?;
//!
//! let result = validator.validate(&Person { age: 12 })?;
//! assert_eq!(result.to_string(), "Age: must be adult");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod args;
pub mod capacity;
pub mod compiler;
pub(crate) mod context;
pub(crate) mod discovery;
pub mod error;
pub mod messages;
pub mod path;
pub mod registry;
pub mod result;
pub mod scheme;
pub mod scope;
pub mod settings;
pub mod specification;
pub mod translation;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use args::Arg;
pub use args::ArgValue;
pub use args::Number;
pub use capacity::CapacityInfo;
pub use capacity::CapacityStrategy;
pub use capacity::DisabledCapacity;
pub use capacity::MaxObservedCapacity;
pub use compiler::ScopeCompiler;
pub use error::IntegrityError;
pub use error::SettingsError;
pub use error::SpecificationError;
pub use error::TranslationError;
pub use error::ValidationError;
pub use messages::MessageCache;
pub use registry::ErrorDescriptor;
pub use registry::ErrorId;
pub use registry::ErrorMode;
pub use registry::ErrorRegistry;
pub use result::ReferenceLoop;
pub use result::ValidationResult;
pub use scheme::ModelScheme;
pub use scope::Presence;
pub use scope::ScopeId;
pub use settings::ValidatorSettings;
pub use specification::Specification;
pub use specification::SpecificationBuilder;
pub use translation::ENGLISH;
pub use translation::Translations;
pub use validator::Validator;
