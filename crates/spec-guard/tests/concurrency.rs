// crates/spec-guard/tests/concurrency.rs
// ============================================================================
// Module: Concurrency Tests
// Description: Shared validators across threads and capacity planning.
// Purpose: Ensure concurrent validation is deterministic and pre-sizing is invisible.
// ============================================================================
//! ## Overview
//! Integration tests validating many models from scoped threads against one
//! validator, and comparing results under both capacity strategies.

#[path = "support/models.rs"]
mod models;
mod support;

use std::collections::BTreeMap;
use std::thread;

use models::Address;
use models::Person;
use spec_guard::CapacityStrategy;
use spec_guard::ENGLISH;
use spec_guard::Specification;
use spec_guard::ValidationResult;
use spec_guard::Validator;
use spec_guard::ValidatorSettings;
use support::TestResult;
use support::ensure;

// ========================================================================
// SECTION: Fixtures
// ========================================================================

/// Number of worker threads.
const WORKERS: usize = 8;

/// Person specification touching every scope kind used below.
fn person_spec() -> Specification<Person> {
    let text = Specification::<String>::new(|s| {
        s.rule(|value| !value.is_empty()).with_message("must not be empty").with_code("EMPTY")
    });
    let city = text.clone();
    let address = Specification::<Address>::new(move |s| {
        s.member("City", |address| &address.city, city.clone())
    });
    let tags = {
        let text = text.clone();
        Specification::<Vec<String>>::new(move |s| s.as_collection(text.clone()))
    };
    let score = Specification::<u32>::new(|s| s.rule(|value| *value <= 100).with_message("max 100"));
    let scores = Specification::<BTreeMap<String, u32>>::new(move |s| {
        s.as_dictionary::<String, u32>(score.clone())
    });
    Specification::<Person>::new(move |s| {
        s.member("Name", |person| &person.name, text.clone())
            .rule(|person| person.age >= 18)
            .with_path("Age")
            .with_message("must be adult")
            .optional_member("Address", |person| person.address.as_ref(), address.clone())
            .member("Tags", |person| &person.tags, tags.clone())
            .member("Scores", |person| &person.scores, scores.clone())
    })
}

/// Builds a model whose failures depend on `seed`.
fn model(seed: usize) -> Person {
    let name = if seed % 2 == 0 { String::new() } else { format!("P{seed}") };
    let age = u32::try_from(seed % 40).unwrap_or(0);
    let mut person = Person::new(&name, age);
    person.tags =
        (0 .. seed % 5).map(|i| if i % 2 == 0 { String::new() } else { "t".into() }).collect();
    let score = u32::try_from(seed).unwrap_or(0) * 10;
    person.scores = BTreeMap::from([("a".to_string(), 50), ("b".to_string(), score)]);
    if seed % 3 == 0 {
        person.address = Some(Address::default());
    }
    person
}

/// Flattens a result into comparable text.
fn snapshot(result: &ValidationResult) -> TestResult<String> {
    let messages = result.message_map(ENGLISH)?;
    let lines: Vec<String> = messages
        .iter()
        .map(|(path, texts)| format!("{path}={}", texts.join("|")))
        .collect();
    Ok(format!("{}\n{}", result, lines.join("\n")))
}

// ========================================================================
// SECTION: Tests
// ========================================================================

#[test]
fn test_shared_validator_is_deterministic_across_threads() -> TestResult {
    let validator = Validator::new(&person_spec())?;
    let results =
        (0 .. 32).map(|seed| validator.validate(&model(seed))).collect::<Result<Vec<_>, _>>()?;
    let expected = results.iter().map(snapshot).collect::<TestResult<Vec<_>>>()?;

    let outcomes: Vec<Result<Vec<String>, String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0 .. WORKERS)
            .map(|_| {
                scope.spawn(|| -> Result<Vec<String>, String> {
                    let mut seen = Vec::new();
                    for seed in 0 .. 32 {
                        let result = validator.validate(&model(seed)).map_err(|err| err.to_string())?;
                        seen.push(snapshot(&result).map_err(|err| err.to_string())?);
                    }
                    Ok(seen)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| "worker panicked".to_string()).and_then(|r| r))
            .collect()
    });

    for outcome in outcomes {
        ensure(outcome? == expected, "Expected identical results on every thread")?;
    }
    Ok(())
}

#[test]
fn test_cloned_validators_share_the_scheme() -> TestResult {
    let validator = Validator::new(&person_spec())?;
    let clones: Vec<Validator<Person>> = (0 .. WORKERS).map(|_| validator.clone()).collect();
    let verdicts = thread::scope(|scope| {
        let handles: Vec<_> = clones
            .iter()
            .enumerate()
            .map(|(seed, clone)| {
                scope.spawn(move || clone.is_valid(&model(seed * 2 + 1)).unwrap_or(false))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap_or(false)).collect::<Vec<_>>()
    });
    let direct: Vec<bool> = (0 .. WORKERS)
        .map(|seed| validator.is_valid(&model(seed * 2 + 1)))
        .collect::<Result<_, _>>()?;
    ensure(verdicts == direct, "Expected clones to agree with the original")?;
    Ok(())
}

#[test]
fn test_capacity_strategy_does_not_change_results() -> TestResult {
    let spec = person_spec();
    let disabled = Validator::new(&spec)?;
    let settings = ValidatorSettings::default().with_capacity(CapacityStrategy::MaxObserved);
    let observed = Validator::with_settings(&spec, &settings)?;

    for seed in 0 .. 24 {
        let person = model(seed);
        let left = snapshot(&disabled.validate(&person)?)?;
        let right = snapshot(&observed.validate(&person)?)?;
        ensure(left == right, format!("Expected identical results for seed {seed}"))?;
        ensure(
            disabled.is_valid(&person)? == observed.is_valid(&person)?,
            format!("Expected identical verdicts for seed {seed}"),
        )?;
    }
    Ok(())
}

#[test]
fn test_fail_fast_is_a_prefix_of_full_results() -> TestResult {
    let validator = Validator::new(&person_spec())?;
    for seed in 0 .. 16 {
        let person = model(seed);
        let full = validator.validate(&person)?;
        let fast = validator.validate_fail_fast(&person)?;
        ensure(fast.any_errors() == full.any_errors(), "Expected the same verdict")?;
        ensure(fast.errors().len() <= 1, "Expected at most one path in fail-fast mode")?;
        if let Some((path, ids)) = fast.errors().first() {
            ensure(
                full.errors().get(path).is_some_and(|all| all.starts_with(ids)),
                format!("Expected {path} to begin the full result"),
            )?;
        }
    }
    Ok(())
}
