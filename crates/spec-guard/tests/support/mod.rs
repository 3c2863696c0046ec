// crates/spec-guard/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers for validation engine integration tests.
// ============================================================================
//! ## Overview
//! Result-based assertions for validation results. [`ensure_eq`] reports both
//! sides so path and message mismatches show what was rendered.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;
use std::fmt::Debug;

// ========================================================================
// SECTION: Results
// ========================================================================

/// Result type returned by every integration test.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Assertion failure carried through `?`.
#[derive(Debug)]
struct AssertionFailed {
    /// Failure description.
    message: String,
}

impl AssertionFailed {
    /// Wraps a failure description.
    fn boxed(message: impl Into<String>) -> Box<dyn Error> {
        Box::new(Self {
            message: message.into(),
        })
    }
}

impl fmt::Display for AssertionFailed {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for AssertionFailed {}

// ========================================================================
// SECTION: Assertions
// ========================================================================

/// Fails with `message` unless `condition` holds.
///
/// # Errors
/// Returns the message when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(AssertionFailed::boxed(message)) }
}

/// Fails unless `actual == expected`, reporting both values.
///
/// # Errors
/// Returns `context` with both values when they differ.
#[allow(dead_code, reason = "Not every test binary compares values.")]
pub fn ensure_eq<A, E>(actual: &A, expected: &E, context: &str) -> TestResult
where
    A: PartialEq<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionFailed::boxed(format!("{context}: got {actual:?}, expected {expected:?}")))
    }
}
