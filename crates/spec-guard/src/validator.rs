// crates/spec-guard/src/validator.rs
// ============================================================================
// Module: Validator
// Description: Typed facade over a compiled scheme and its message cache.
// Purpose: Build once, then validate models concurrently without locks.
// Dependencies: tracing, crate::{capacity, compiler, context, error, messages, result, scheme,
//              settings, specification}
// ============================================================================

//! ## Overview
//! [`Validator::new`] compiles a specification, runs discovery, builds the
//! message cache, and checks its integrity. Every authoring mistake surfaces
//! here; validation itself only fails on structural problems such as a
//! reference loop in boolean mode.
//!
//! The compiled state lives in an [`Arc`] shared with every
//! [`ValidationResult`], so results stay usable after the validator is dropped.
//! Reference-loop protection follows discovery unless the settings force it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::capacity::CapacityInfo;
use crate::compiler::ScopeCompiler;
use crate::context::ValidationContext;
use crate::context::fast::IsValidContext;
use crate::context::full::CollectingContext;
use crate::error::IntegrityError;
use crate::error::SpecificationError;
use crate::error::ValidationError;
use crate::messages::MessageCache;
use crate::result::ValidationResult;
use crate::scheme::ModelScheme;
use crate::settings::ValidatorSettings;
use crate::specification::Specification;

// ============================================================================
// SECTION: Shared Core
// ============================================================================

/// Immutable state shared by a validator and its results.
pub(crate) struct ValidatorCore {
    /// Compiled scheme.
    pub(crate) scheme: ModelScheme,
    /// Rendered messages per translation.
    pub(crate) messages: MessageCache,
    /// Errors-map sizing hints.
    pub(crate) capacity: Box<dyn CapacityInfo>,
    /// Whether reference loops are guarded at run time.
    pub(crate) reference_loop_protection: bool,
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validator for models of type `T`.
pub struct Validator<T> {
    /// Shared compiled state.
    core: Arc<ValidatorCore>,
    /// Model type.
    marker: PhantomData<fn(&T)>,
}

impl<T: 'static> Validator<T> {
    /// Builds a validator with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] for any authoring mistake reachable from
    /// `specification`.
    pub fn new(specification: &Specification<T>) -> Result<Self, SpecificationError> {
        Self::with_settings(specification, &ValidatorSettings::default())
    }

    /// Builds a validator with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError`] for any authoring mistake reachable from
    /// `specification`, or when the built message cache is inconsistent.
    pub fn with_settings(
        specification: &Specification<T>,
        settings: &ValidatorSettings,
    ) -> Result<Self, SpecificationError> {
        let scheme = ScopeCompiler::compile(specification)?;
        Self::from_scheme(scheme, settings)
    }

    /// Wraps an already compiled scheme.
    ///
    /// # Errors
    ///
    /// Returns [`SpecificationError::RootTypeMismatch`] when the scheme was
    /// compiled for another model type, or [`SpecificationError::Integrity`]
    /// when the built message cache is inconsistent.
    pub fn from_scheme(
        scheme: ModelScheme,
        settings: &ValidatorSettings,
    ) -> Result<Self, SpecificationError> {
        if !scheme.is_root_type::<T>() {
            return Err(SpecificationError::RootTypeMismatch {
                expected: type_name::<T>(),
                actual: scheme.root_type(),
            });
        }

        let translations = settings.translation_set();
        let messages = MessageCache::build(&translations, scheme.errors(), scheme.template());
        messages.verify_integrity(scheme.errors())?;
        let reference_loop_protection =
            settings.reference_loop_protection.unwrap_or_else(|| scheme.reference_loop_possible());

        debug!(
            model = scheme.root_type(),
            translations = translations.names().count(),
            reference_loop_protection,
            capacity = ?settings.capacity,
            "validator ready"
        );

        Ok(Self {
            core: Arc::new(ValidatorCore {
                scheme,
                messages,
                capacity: settings.capacity.build(),
                reference_loop_protection,
            }),
            marker: PhantomData,
        })
    }

    /// Returns true when `model` satisfies the specification.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ReferenceLoop`] when protection is on and the
    /// same model is reached again through the same scope.
    pub fn is_valid(&self, model: &T) -> Result<bool, ValidationError> {
        let core = &self.core;
        let mut context = IsValidContext::new(&core.scheme, core.reference_loop_protection);
        context.enter_scope(core.scheme.root(), Some(model as &dyn Any))?;
        Ok(!context.error_found())
    }

    /// Validates `model` and collects every error.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] only for structural failures; rule
    /// violations are reported in the result.
    pub fn validate(&self, model: &T) -> Result<ValidationResult, ValidationError> {
        self.run_full(model, false)
    }

    /// Validates `model` and stops at the first error.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] only for structural failures.
    pub fn validate_fail_fast(&self, model: &T) -> Result<ValidationResult, ValidationError> {
        self.run_full(model, true)
    }

    /// Runs the collecting interpreter from the root scope.
    fn run_full(&self, model: &T, fail_fast: bool) -> Result<ValidationResult, ValidationError> {
        let core = &self.core;
        let mut context = CollectingContext::new(
            &core.scheme,
            core.capacity.as_ref(),
            core.reference_loop_protection,
            fail_fast,
        );
        context.enter_scope(core.scheme.root(), Some(model as &dyn Any))?;
        let (errors, loops) = context.finish();
        if !fail_fast && core.capacity.should_feed() {
            core.capacity.feed(&errors);
        }
        Ok(ValidationResult::new(errors, loops, Arc::clone(&self.core)))
    }

    /// Returns every error the specification can report, keyed by template path.
    ///
    /// Collection items and dictionary entries appear under the `#` marker.
    #[must_use]
    pub fn template(&self) -> ValidationResult {
        ValidationResult::new(self.core.scheme.template().clone(), Vec::new(), Arc::clone(&self.core))
    }

    /// Returns the compiled scheme.
    #[must_use]
    pub fn scheme(&self) -> &ModelScheme {
        &self.core.scheme
    }

    /// Returns true when reference loops are guarded at run time.
    #[must_use]
    pub fn reference_loop_protection(&self) -> bool {
        self.core.reference_loop_protection
    }

    /// Re-checks the message cache against the error registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`IntegrityError`] found.
    pub fn verify_integrity(&self) -> Result<(), IntegrityError> {
        self.core.messages.verify_integrity(self.core.scheme.errors())
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("scheme", &self.core.scheme)
            .field("reference_loop_protection", &self.core.reference_loop_protection)
            .field("capacity", &self.core.capacity)
            .finish()
    }
}
