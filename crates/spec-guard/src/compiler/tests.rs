// crates/spec-guard/src/compiler/tests.rs
// ============================================================================
// Module: Scope Compiler Tests
// Description: Unit tests for modifier grouping and authoring validation.
// Purpose: Pin composition modes and compile-time rejections.
// Dependencies: spec-guard
// ============================================================================

//! ## Overview
//! Validates modifier runs, composition modes, and authoring errors.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use super::shape;
use crate::error::SpecificationError;
use crate::registry::ErrorBuilder;
use crate::registry::ErrorMode;
use crate::specification::Modifier;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Returns the composition mode a run of modifiers produces.
fn mode_of<T: 'static>(modifiers: Vec<Modifier<T>>) -> Result<ErrorMode, SpecificationError> {
    shape(ErrorBuilder::default(), modifiers, "test").map(|shaped| shaped.errors.mode())
}

#[test]
fn extra_message_keeps_append_mode() {
    let mode = mode_of::<u8>(vec![Modifier::ExtraMessage("m".to_string())]).unwrap();
    assert_eq!(mode, ErrorMode::Append);
}

#[test]
fn message_switches_to_override() {
    let mode = mode_of::<u8>(vec![Modifier::Message("m".to_string())]).unwrap();
    assert_eq!(mode, ErrorMode::Override);
}

#[test]
fn codes_with_whitespace_are_rejected() {
    let err = mode_of::<u8>(vec![Modifier::Code("BAD CODE".to_string())]).unwrap_err();
    assert_eq!(err, SpecificationError::InvalidCode("BAD CODE".to_string()));
}

#[test]
fn second_condition_is_rejected() {
    let err = mode_of::<u8>(vec![
        Modifier::Condition(Arc::new(|_: &u8| true)),
        Modifier::Condition(Arc::new(|_: &u8| true)),
    ])
    .unwrap_err();
    assert!(matches!(err, SpecificationError::DuplicateModifier { .. }));
}

#[test]
fn name_and_path_share_one_slot() {
    let err = mode_of::<u8>(vec![
        Modifier::Name("A".to_string()),
        Modifier::Path("<B".to_string()),
    ])
    .unwrap_err();
    assert!(matches!(err, SpecificationError::DuplicateModifier { modifier: "with_path", .. }));
}
