// crates/spec-guard/src/context/loop_guard/tests.rs
// ============================================================================
// Module: Reference Loop Guard Tests
// Description: Unit tests for per-scope reference tracking.
// Purpose: Pin re-entry detection and level reporting.
// Dependencies: spec-guard
// ============================================================================

//! ## Overview
//! Validates re-entry detection per scope and the reported original level.

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

use super::ReferenceLoopGuard;
use crate::scope::ScopeId;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn reentry_reports_first_level() {
    let mut guard = ReferenceLoopGuard::default();
    let scope = ScopeId(0);
    assert_eq!(guard.try_enter(scope, 10, 0), Ok(()));
    assert_eq!(guard.try_enter(scope, 20, 2), Ok(()));
    assert_eq!(guard.try_enter(scope, 10, 5), Err(0));
    guard.leave(scope);
    assert_eq!(guard.try_enter(scope, 20, 3), Ok(()));
}

#[test]
fn scopes_are_tracked_independently() {
    let mut guard = ReferenceLoopGuard::default();
    assert_eq!(guard.try_enter(ScopeId(0), 10, 0), Ok(()));
    assert_eq!(guard.try_enter(ScopeId(1), 10, 0), Ok(()));
}
