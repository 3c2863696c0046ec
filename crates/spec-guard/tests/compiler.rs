// crates/spec-guard/tests/compiler.rs
// ============================================================================
// Module: Compiler Tests
// Description: Identity memoization and authoring validation of the compiler.
// Purpose: Ensure shared specifications compile once and mistakes fail early.
// ============================================================================
//! ## Overview
//! Integration tests covering scope registration by handle identity, error
//! registration without structural deduplication, and every authoring error
//! the compiler reports before a validator exists.

mod support;

use spec_guard::ErrorId;
use spec_guard::ModelScheme;
use spec_guard::ScopeCompiler;
use spec_guard::Specification;
use spec_guard::SpecificationError;
use spec_guard::Validator;
use spec_guard::ValidatorSettings;
use support::TestResult;
use support::ensure;

// ========================================================================
// SECTION: Helpers
// ========================================================================

/// Pair model with two members of the same type.
#[derive(Debug, Default)]
struct Pair {
    /// Left value.
    left: u32,
    /// Right value.
    right: u32,
}

/// Positive-number specification.
fn positive() -> Specification<u32> {
    Specification::new(|s| s.rule(|value| *value > 0).with_message("must be positive"))
}

/// Compiles a specification and returns its authoring error, if any.
fn compile_error<T: 'static>(spec: &Specification<T>) -> Option<SpecificationError> {
    ScopeCompiler::compile(spec).err()
}

// ========================================================================
// SECTION: Identity
// ========================================================================

#[test]
fn test_same_handle_registers_once() -> TestResult {
    let spec = positive();
    let mut compiler = ScopeCompiler::new();
    let first = compiler.get_or_register_scope(&spec)?;
    let second = compiler.get_or_register_scope(&spec)?;
    let cloned = compiler.get_or_register_scope(&spec.clone())?;
    ensure(first == second && second == cloned, "Expected one id per handle identity")?;
    ensure(compiler.scope_count() == 1, "Expected one compiled scope")?;
    Ok(())
}

#[test]
fn test_identical_bodies_register_twice() -> TestResult {
    let mut compiler = ScopeCompiler::new();
    let first = compiler.get_or_register_scope(&positive())?;
    let second = compiler.get_or_register_scope(&positive())?;
    ensure(first != second, "Expected distinct ids for distinct handles")?;
    ensure(compiler.scope_count() == 2, "Expected two compiled scopes")?;
    ensure(compiler.errors().len() == 6, "Expected two errors on top of the built-ins")?;
    Ok(())
}

#[test]
fn test_shared_member_spec_compiles_once() -> TestResult {
    let value = positive();
    let spec = Specification::<Pair>::new(move |s| {
        s.member("Left", |pair| &pair.left, value.clone()).member(
            "Right",
            |pair| &pair.right,
            value.clone(),
        )
    });
    let scheme = ScopeCompiler::compile(&spec)?;
    ensure(scheme.scope_count() == 2, "Expected the root and one shared member scope")?;
    ensure(scheme.errors().len() == 5, "Expected one registered rule error")?;

    let left = scheme.template().get("Left").cloned().unwrap_or_default();
    let right = scheme.template().get("Right").cloned().unwrap_or_default();
    ensure(left == right && left.len() == 1, "Expected the shared error id at both members")?;
    ensure(scheme.root_type().ends_with("Pair"), "Expected the root type name")?;
    Ok(())
}

#[test]
fn test_scheme_for_another_type_is_rejected() -> TestResult {
    let scheme: ModelScheme = ScopeCompiler::compile(&positive())?;
    ensure(
        matches!(
            Validator::<Pair>::from_scheme(scheme, &ValidatorSettings::default()),
            Err(SpecificationError::RootTypeMismatch { .. })
        ),
        "Expected a root type mismatch",
    )?;
    Ok(())
}

#[test]
fn test_compiled_scheme_wraps_into_validator() -> TestResult {
    let scheme = ScopeCompiler::compile(&positive())?;
    let validator = Validator::<u32>::from_scheme(scheme, &ValidatorSettings::default())?;
    ensure(!validator.is_valid(&0)?, "Expected zero to fail")?;
    Ok(())
}

#[test]
fn test_well_known_errors_are_preregistered() -> TestResult {
    let scheme = ScopeCompiler::compile(&Specification::<u32>::new(|s| s))?;
    let registry = scheme.errors();
    for (id, key) in [
        (ErrorId::GENERIC, "Global.Error"),
        (ErrorId::FORBIDDEN, "Global.Forbidden"),
        (ErrorId::REQUIRED, "Global.Required"),
        (ErrorId::REFERENCE_LOOP, "Global.ReferenceLoop"),
    ] {
        let messages = registry.get(id).map(|error| error.messages().to_vec()).unwrap_or_default();
        ensure(messages == vec![key.to_string()], format!("Expected {key} at id {id}"))?;
    }
    Ok(())
}

// ========================================================================
// SECTION: Authoring Errors
// ========================================================================

#[test]
fn test_presence_after_first_command() -> TestResult {
    let spec = Specification::<u32>::new(|s| s.rule(|_| true).required());
    ensure(
        compile_error(&spec)
            == Some(SpecificationError::PresenceNotFirst {
                presence: "required",
            }),
        "Expected PresenceNotFirst",
    )
}

#[test]
fn test_leading_modifier() -> TestResult {
    let spec = Specification::<u32>::new(|s| s.with_message("orphan"));
    ensure(
        compile_error(&spec)
            == Some(SpecificationError::ModifierWithoutCommand {
                modifier: "with_message",
            }),
        "Expected ModifierWithoutCommand",
    )
}

#[test]
fn test_path_after_presence() -> TestResult {
    let spec = Specification::<u32>::new(|s| s.required().with_name("Value"));
    ensure(
        compile_error(&spec)
            == Some(SpecificationError::ModifierNotAllowed {
                modifier: "with_name",
                command: "required",
            }),
        "Expected ModifierNotAllowed",
    )
}

#[test]
fn test_duplicate_path_modifiers() -> TestResult {
    let spec =
        Specification::<u32>::new(|s| s.rule(|_| true).with_name("A").with_path("B.C"));
    ensure(
        compile_error(&spec)
            == Some(SpecificationError::DuplicateModifier {
                modifier: "with_path",
                command: "rule",
            }),
        "Expected DuplicateModifier",
    )
}

#[test]
fn test_invalid_codes_messages_and_paths() -> TestResult {
    let code = Specification::<u32>::new(|s| s.rule(|_| true).with_code("has space"));
    ensure(
        compile_error(&code) == Some(SpecificationError::InvalidCode("has space".to_string())),
        "Expected InvalidCode",
    )?;

    let empty_code = Specification::<u32>::new(|s| s.rule(|_| true).with_extra_code(""));
    ensure(
        compile_error(&empty_code) == Some(SpecificationError::InvalidCode(String::new())),
        "Expected InvalidCode for an empty code",
    )?;

    let message = Specification::<u32>::new(|s| s.rule(|_| true).with_extra_message(""));
    ensure(compile_error(&message) == Some(SpecificationError::EmptyMessage), "EmptyMessage")?;

    let key = Specification::<u32>::new(|s| s.rule_template(|_| true, "", []));
    ensure(compile_error(&key) == Some(SpecificationError::EmptyMessage), "Empty key")?;

    let name = Specification::<u32>::new(|s| s.rule(|_| true).with_name("A.B"));
    ensure(
        compile_error(&name) == Some(SpecificationError::InvalidName("A.B".to_string())),
        "Expected InvalidName",
    )?;

    let path = Specification::<u32>::new(|s| s.rule(|_| true).with_path("A..B"));
    ensure(
        compile_error(&path) == Some(SpecificationError::InvalidPath("A..B".to_string())),
        "Expected InvalidPath",
    )?;
    Ok(())
}

#[test]
fn test_names_cannot_start_with_the_index_marker() -> TestResult {
    for name in ["#", "#3"] {
        let spec = Specification::<u32>::new(move |s| s.rule(|_| true).with_name(name));
        ensure(
            compile_error(&spec) == Some(SpecificationError::InvalidName(name.to_string())),
            format!("Expected InvalidName for {name}"),
        )?;
    }
    Ok(())
}

#[test]
fn test_invalid_member_name() -> TestResult {
    let value = positive();
    let spec = Specification::<Pair>::new(move |s| s.member("", |pair| &pair.left, value.clone()));
    ensure(
        compile_error(&spec) == Some(SpecificationError::InvalidName(String::new())),
        "Expected InvalidName for an empty member name",
    )
}

#[test]
fn test_nested_authoring_error_surfaces_from_validator() -> TestResult {
    let broken = Specification::<u32>::new(|s| s.rule(|_| true).with_code(" "));
    let spec = Specification::<Pair>::new(move |s| s.member("Left", |pair| &pair.left, broken.clone()));
    ensure(
        matches!(Validator::new(&spec), Err(SpecificationError::InvalidCode(_))),
        "Expected the nested error from Validator::new",
    )
}
