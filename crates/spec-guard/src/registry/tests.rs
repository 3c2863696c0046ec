// crates/spec-guard/src/registry/tests.rs
// ============================================================================
// Module: Error Registry Tests
// Description: Unit tests for the error registry and error builder.
// Purpose: Pin well-known ids and append/override shaping rules.
// Dependencies: spec-guard
// ============================================================================

//! ## Overview
//! Validates pre-registered ids, identity-only interning, and modifier shaping.

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

use super::ErrorBuilder;
use super::ErrorDescriptor;
use super::ErrorId;
use super::ErrorMode;
use super::ErrorRegistry;
use super::REQUIRED_MESSAGE_KEY;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn well_known_ids_are_preregistered() {
    let registry = ErrorRegistry::new();
    assert_eq!(registry.len(), 4);
    assert!(registry.is_empty());
    assert_eq!(
        registry.get(ErrorId::REQUIRED).map(ErrorDescriptor::messages),
        Some(&[REQUIRED_MESSAGE_KEY.to_string()][..])
    );
}

#[test]
fn identical_descriptors_get_distinct_ids() {
    let mut registry = ErrorRegistry::new();
    let a = registry.register(ErrorDescriptor::message("x")).unwrap();
    let b = registry.register(ErrorDescriptor::message("x")).unwrap();
    assert_ne!(a, b);
}

#[test]
fn builder_override_then_code_keeps_message() {
    let mut builder = ErrorBuilder::seeded("Rule.Key", Vec::new());
    builder.set_message("must be adult".to_string());
    builder.set_code("MIN_AGE".to_string());
    assert_eq!(builder.mode(), ErrorMode::Override);
    let error = builder.into_descriptor();
    assert_eq!(error.messages(), ["must be adult"]);
    assert_eq!(error.codes(), ["MIN_AGE"]);
}

#[test]
fn builder_second_set_message_replaces_first() {
    let mut builder = ErrorBuilder::default();
    builder.set_message("m1".to_string());
    builder.set_message("m2".to_string());
    assert_eq!(builder.into_descriptor().messages(), ["m2"]);
}

#[test]
fn builder_clear_returns_to_append() {
    let mut builder = ErrorBuilder::seeded("Rule.Key", Vec::new());
    builder.set_message("m1".to_string());
    builder.clear();
    assert!(builder.is_empty());
    assert_eq!(builder.mode(), ErrorMode::Append);
}
