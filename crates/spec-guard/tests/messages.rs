// crates/spec-guard/tests/messages.rs
// ============================================================================
// Module: Message Tests
// Description: Message rendering through translations and placeholders.
// Purpose: Ensure every argument kind and path placeholder renders as authored.
// ============================================================================
//! ## Overview
//! Integration tests covering translation lookup, fallback to raw keys,
//! argument formatting for every kind, path-dependent placeholders, and the
//! unknown-translation error.

#[path = "support/models.rs"]
mod models;
mod support;

use models::Person;
use spec_guard::Arg;
use spec_guard::ENGLISH;
use spec_guard::Specification;
use spec_guard::TranslationError;
use spec_guard::ValidationResult;
use spec_guard::Validator;
use spec_guard::ValidatorSettings;
use support::TestResult;
use support::ensure;
use support::ensure_eq;
use time::macros::datetime;
use uuid::Uuid;

// ========================================================================
// SECTION: Helpers
// ========================================================================

/// Marker type used for type arguments.
struct Invoice;

/// Validates `0` against one failing rule rendered from `key` and `args`.
fn render(key: &str, args: Vec<Arg>, settings: &ValidatorSettings) -> TestResult<Vec<String>> {
    let key = key.to_string();
    let spec = Specification::<u32>::new(move |s| {
        s.rule_template(|value| *value > 0, key.clone(), args.clone())
    });
    let result = Validator::with_settings(&spec, settings)?.validate(&0)?;
    messages_at(&result, ENGLISH, "")
}

/// Returns the messages at one path in one translation.
fn messages_at(result: &ValidationResult, translation: &str, path: &str) -> TestResult<Vec<String>> {
    Ok(result.message_map(translation)?.get(path).cloned().unwrap_or_default())
}

/// Settings carrying English entries.
fn english(entries: &[(&str, &str)]) -> TestResult<ValidatorSettings> {
    Ok(ValidatorSettings::default().with_translation(ENGLISH, entries.iter().copied())?)
}

// ========================================================================
// SECTION: Translations
// ========================================================================

#[test]
fn test_placeholder_renders_argument() -> TestResult {
    let settings = english(&[("Text.MinLength", "Must be at least {min} chars")])?;
    let messages = render("Text.MinLength", vec![Arg::int("min", 3)], &settings)?;
    ensure(messages == vec!["Must be at least 3 chars"], "Expected the substituted number")?;
    Ok(())
}

#[test]
fn test_unknown_placeholders_stay_untouched() -> TestResult {
    let settings = english(&[("Text.Max", "At most {max} not {other} or {max|case=upper}")])?;
    let messages = render("Text.Max", vec![Arg::int("max", 9)], &settings)?;
    ensure(
        messages == vec!["At most 9 not {other} or {max|case=upper}"],
        "Expected unknown names and disallowed params to stay",
    )?;
    Ok(())
}

#[test]
fn test_missing_key_falls_back_to_the_key() -> TestResult {
    let messages = render("Not.Translated {n}", vec![Arg::int("n", 1)], &ValidatorSettings::default())?;
    ensure(messages == vec!["Not.Translated 1"], "Expected the raw key with arguments")?;
    Ok(())
}

#[test]
fn test_translations_are_selected_by_name() -> TestResult {
    let settings = ValidatorSettings::default()
        .with_translation(ENGLISH, [("Age.Adult", "must be adult")])?
        .with_translation("Polish", [("Age.Adult", "musi być dorosły")])?;
    let spec = Specification::<Person>::new(|s| {
        s.rule_template(|person| person.age >= 18, "Age.Adult", []).with_path("Age")
    });
    let validator = Validator::with_settings(&spec, &settings)?;
    let result = validator.validate(&Person::new("Ann", 4))?;

    ensure(messages_at(&result, ENGLISH, "Age")? == vec!["must be adult"], "English text")?;
    ensure(messages_at(&result, "Polish", "Age")? == vec!["musi być dorosły"], "Polish text")?;
    ensure(
        result.translation_names().collect::<Vec<_>>() == vec![ENGLISH, "Polish"],
        "Expected both translations",
    )?;
    ensure(
        result.message_map("Klingon") == Err(TranslationError::Unknown("Klingon".to_string())),
        "Expected an unknown translation error",
    )?;
    Ok(())
}

#[test]
fn test_english_defaults_can_be_overridden() -> TestResult {
    let settings = english(&[("Global.Error", "Something is off")])?;
    let spec = Specification::<u32>::new(|s| s.rule(|value| *value > 0));
    let result = Validator::with_settings(&spec, &settings)?.validate(&0)?;
    ensure(result.to_string() == "Something is off", "Expected the overridden default")?;
    Ok(())
}

#[test]
fn test_nested_translation_placeholder() -> TestResult {
    let settings = english(&[
        ("Outer", "See: {_translation|key=Inner}"),
        ("Inner", "the inner text"),
    ])?;
    let messages = render("Outer", Vec::new(), &settings)?;
    ensure(messages == vec!["See: the inner text"], "Expected the nested lookup")?;
    Ok(())
}

// ========================================================================
// SECTION: Argument Kinds
// ========================================================================

#[test]
fn test_number_formats() -> TestResult {
    let settings = english(&[("N", "{a|format=0.00} {b|format=X} {c|format=x} {d}")])?;
    let args = vec![Arg::float("a", 1.5), Arg::int("b", 255), Arg::int("c", 255), Arg::float("d", 0.25)];
    ensure(render("N", args, &settings)? == vec!["1.50 FF ff 0.25"], "Unexpected numbers")?;
    Ok(())
}

#[test]
fn test_text_cases() -> TestResult {
    let settings = english(&[("T", "{v|case=upper} {v|case=lower} {v}")])?;
    let messages = render("T", vec![Arg::text("v", "MiXed")], &settings)?;
    ensure(messages == vec!["MIXED mixed MiXed"], "Unexpected text cases")?;
    Ok(())
}

#[test]
fn test_time_formats() -> TestResult {
    let settings = english(&[("D", "{at} / {at|format=[year]-[month]-[day]}")])?;
    let at = datetime!(2024-03-05 06:07:08 UTC);
    let messages = render("D", vec![Arg::time("at", at)], &settings)?;
    ensure(messages == vec!["2024-03-05T06:07:08Z / 2024-03-05"], "Unexpected time rendering")?;
    Ok(())
}

#[test]
fn test_malformed_time_format_stays_untouched() -> TestResult {
    let settings = english(&[("D", "{at|format=[year} {at|format=[month repr:numerical]}")])?;
    let at = datetime!(2024-03-05 06:07:08 UTC);
    let messages = render("D", vec![Arg::time("at", at)], &settings)?;
    ensure_eq(
        &messages,
        &vec!["{at|format=[year} 03".to_string()],
        "malformed description kept verbatim",
    )
}

#[test]
fn test_guid_formats() -> TestResult {
    let id = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
    let settings = english(&[("G", "{id|format=n} {id|format=b|case=upper} {id}")])?;
    let messages = render("G", vec![Arg::guid("id", id)], &settings)?;
    ensure(
        messages
            == vec![
                "0123456789abcdef0123456789abcdef {01234567-89AB-CDEF-0123-456789ABCDEF} \
                 01234567-89ab-cdef-0123-456789abcdef",
            ],
        "Unexpected guid rendering",
    )?;
    Ok(())
}

#[test]
fn test_enum_formats_and_translation() -> TestResult {
    let settings = english(&[
        ("E", "{c} {c|format=d} {c|translation=true}"),
        ("Color.Red", "red color"),
    ])?;
    let messages = render("E", vec![Arg::enumeration("c", "Color", "Red", 2)], &settings)?;
    ensure(messages == vec!["Red 2 red color"], "Unexpected enum rendering")?;
    Ok(())
}

#[test]
fn test_type_names() -> TestResult {
    let settings = english(&[("Y", "{t} {t|format=fullName}")])?;
    let messages = render("Y", vec![Arg::type_of::<Invoice>("t")], &settings)?;
    let full = std::any::type_name::<Invoice>();
    ensure(messages == vec![format!("Invoice {full}")], "Unexpected type rendering")?;
    Ok(())
}

// ========================================================================
// SECTION: Path Placeholders
// ========================================================================

#[test]
fn test_path_placeholders_render_per_concrete_path() -> TestResult {
    let settings = english(&[("Item.Empty", "{_name|format=titleCase} at {_path} is empty")])?;
    let item = Specification::<String>::new(|s| {
        s.rule_template(|value| !value.is_empty(), "Item.Empty", [])
    });
    let tags = Specification::<Vec<String>>::new(move |s| s.as_collection(item.clone()));
    let name = Specification::<String>::new(|s| {
        s.rule_template(|value| !value.is_empty(), "Item.Empty", [])
    });
    let spec = Specification::<Person>::new(move |s| {
        s.member("firstName", |person| &person.name, name.clone()).member(
            "Tags",
            |person| &person.tags,
            tags.clone(),
        )
    });
    let validator = Validator::with_settings(&spec, &settings)?;
    let person = Person {
        tags: vec!["a".to_string(), String::new(), String::new()],
        ..Person::new("", 30)
    };
    let result = validator.validate(&person)?;

    ensure(
        messages_at(&result, ENGLISH, "firstName")? == vec!["First Name at firstName is empty"],
        "Expected the title-cased member name",
    )?;
    ensure(
        messages_at(&result, ENGLISH, "Tags.#1")? == vec!["#1 at Tags.#1 is empty"],
        "Expected the concrete index path",
    )?;
    ensure(
        messages_at(&result, ENGLISH, "Tags.#2")? == vec!["#2 at Tags.#2 is empty"],
        "Expected a separate rendering per index",
    )?;
    ensure_eq(
        &result.message_map(ENGLISH)?,
        &result.message_map(ENGLISH)?,
        "repeated queries render the same indexed messages",
    )?;
    Ok(())
}
