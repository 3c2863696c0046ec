// crates/spec-guard/src/args.rs
// ============================================================================
// Module: Message Arguments
// Description: Typed error arguments and the `{name|param=value}` placeholder syntax.
// Purpose: Parse placeholders and stringify arguments under per-kind parameter rules.
// Dependencies: smallvec, time, uuid
// ============================================================================

//! ## Overview
//! Message templates embed placeholders such as `{min}` or
//! `{min|format=0.00}`. A placeholder is only substituted when its name
//! matches an argument and every parameter is one that argument kind accepts;
//! anything malformed or unrecognized is left in the text untouched.
//!
//! Two reserved names depend on the concrete path (`_path`, `_name`) and are
//! substituted late by the message cache. `_translation` pulls another
//! translation entry into the message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use smallvec::SmallVec;
use time::OffsetDateTime;
use time::format_description;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::path;

// ============================================================================
// SECTION: Reserved Names
// ============================================================================

/// Placeholder replaced by the full concrete path.
pub const PATH_ARG: &str = "_path";
/// Placeholder replaced by the last segment of the concrete path.
pub const NAME_ARG: &str = "_name";
/// Placeholder replaced by another translation entry.
pub const TRANSLATION_ARG: &str = "_translation";

// ============================================================================
// SECTION: Placeholder Parsing
// ============================================================================

/// One parsed `{name|param=value}` token.
///
/// # Invariants
/// - `name` is non-empty.
/// - Parameter names are unique within a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Argument name.
    pub name: &'a str,
    /// Parameters in declaration order.
    pub params: SmallVec<[(&'a str, &'a str); 2]>,
}

impl<'a> Placeholder<'a> {
    /// Parses the inside of a `{...}` token.
    ///
    /// Returns `None` for an empty name, a segment without exactly one `=`, an
    /// empty parameter name, or a duplicated parameter.
    #[must_use]
    pub fn parse(body: &'a str) -> Option<Self> {
        let mut parts = body.split('|');
        let name = parts.next()?;
        if name.is_empty() || name.contains('=') {
            return None;
        }

        let mut params: SmallVec<[(&'a str, &'a str); 2]> = SmallVec::new();
        for part in parts {
            let (key, value) = part.split_once('=')?;
            if key.is_empty() || value.contains('=') {
                return None;
            }
            if params.iter().any(|(existing, _)| *existing == key) {
                return None;
            }
            params.push((key, value));
        }

        Some(Self {
            name,
            params,
        })
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&'a str> {
        self.params.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// Returns true when every parameter is in `allowed`.
    #[must_use]
    pub fn params_within(&self, allowed: &[&str]) -> bool {
        self.params.iter().all(|(key, _)| allowed.contains(key))
    }
}

/// Rewrites every well-formed placeholder through `resolve`.
///
/// The callback receives the parsed placeholder and returns the replacement,
/// or `None` to keep the original token text.
pub fn substitute<F>(template: &str, mut resolve: F) -> String
where
    F: FnMut(&Placeholder<'_>) -> Option<String>,
{
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[.. open]);
        let after_open = &rest[open + 1 ..];
        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open ..]);
            return output;
        };
        let body = &after_open[.. close];
        if body.contains('{') {
            // The `{` opens nothing; rescan from the next brace.
            output.push('{');
            rest = after_open;
            continue;
        }

        let replacement = Placeholder::parse(body).and_then(|placeholder| resolve(&placeholder));
        match replacement {
            Some(text) => output.push_str(&text),
            None => output.push_str(&rest[open ..= open + 1 + close]),
        }
        rest = &after_open[close + 1 ..];
    }

    output.push_str(rest);
    output
}

/// Returns true when the template contains a path-dependent placeholder.
#[must_use]
pub fn has_path_placeholder(template: &str) -> bool {
    let mut found = false;
    let _ = substitute(template, |placeholder| {
        if placeholder.name == PATH_ARG || placeholder.name == NAME_ARG {
            found = true;
        }
        None
    });
    found
}

/// Substitutes `{_path}` and `{_name}` for a concrete path.
#[must_use]
pub fn render_path_args(template: &str, concrete_path: &str) -> String {
    substitute(template, |placeholder| match placeholder.name {
        PATH_ARG if placeholder.params.is_empty() => Some(concrete_path.to_string()),
        NAME_ARG if placeholder.params_within(&["format"]) => {
            let name = path::last_segment(concrete_path);
            match placeholder.param("format") {
                None => Some(name.to_string()),
                Some("titleCase") => Some(path::title_case(name)),
                Some(_) => None,
            }
        }
        _ => None,
    })
}

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Numeric argument payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed integer.
    Int(i128),
    /// Floating point.
    Float(f64),
}

/// Closed set of argument kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Integer or floating point number.
    Number(Number),
    /// Free text.
    Text(String),
    /// Point in time.
    Time(OffsetDateTime),
    /// Globally unique identifier.
    Guid(Uuid),
    /// Enumeration variant.
    Enum {
        /// Enumeration type name.
        type_name: String,
        /// Variant name.
        variant: String,
        /// Discriminant value.
        value: i64,
    },
    /// Type reference.
    Type {
        /// Short type name.
        name: String,
        /// Fully qualified type name.
        full_name: String,
    },
}

/// Named error argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    /// Placeholder name the argument answers to.
    name: String,
    /// Argument payload.
    value: ArgValue,
}

impl Arg {
    /// Creates an argument from a name and payload.
    pub fn new(name: impl Into<String>, value: ArgValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Integer argument.
    pub fn int(name: impl Into<String>, value: impl Into<i128>) -> Self {
        Self::new(name, ArgValue::Number(Number::Int(value.into())))
    }

    /// Floating point argument.
    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, ArgValue::Number(Number::Float(value)))
    }

    /// Text argument.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ArgValue::Text(value.into()))
    }

    /// Time argument.
    pub fn time(name: impl Into<String>, value: OffsetDateTime) -> Self {
        Self::new(name, ArgValue::Time(value))
    }

    /// Guid argument.
    pub fn guid(name: impl Into<String>, value: Uuid) -> Self {
        Self::new(name, ArgValue::Guid(value))
    }

    /// Enumeration argument.
    pub fn enumeration(
        name: impl Into<String>,
        type_name: impl Into<String>,
        variant: impl Into<String>,
        value: i64,
    ) -> Self {
        Self::new(
            name,
            ArgValue::Enum {
                type_name: type_name.into(),
                variant: variant.into(),
                value,
            },
        )
    }

    /// Type argument for `U`.
    pub fn type_of<U: ?Sized>(name: impl Into<String>) -> Self {
        let full_name = std::any::type_name::<U>();
        Self::new(
            name,
            ArgValue::Type {
                name: short_type_name(full_name).to_string(),
                full_name: full_name.to_string(),
            },
        )
    }

    /// Returns the placeholder name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the payload.
    #[must_use]
    pub const fn value(&self) -> &ArgValue {
        &self.value
    }

    /// Stringifies the argument for a placeholder.
    ///
    /// `lookup` resolves translation keys for `translation=true`. Returns `None`
    /// when a parameter is not allowed for the kind or has an unusable value.
    pub fn stringify<'t, L>(&self, placeholder: &Placeholder<'_>, lookup: L) -> Option<String>
    where
        L: Fn(&str) -> Option<&'t str>,
    {
        match &self.value {
            ArgValue::Number(number) => {
                if !placeholder.params_within(&["format"]) {
                    return None;
                }
                format_number(*number, placeholder.param("format"))
            }
            ArgValue::Text(text) => {
                if !placeholder.params_within(&["case"]) {
                    return None;
                }
                apply_case(text, placeholder.param("case"))
            }
            ArgValue::Time(value) => {
                if !placeholder.params_within(&["format"]) {
                    return None;
                }
                match placeholder.param("format") {
                    None => value.format(&Rfc3339).ok(),
                    Some(description) => {
                        let items = format_description::parse_borrowed::<2>(description).ok()?;
                        value.format(&items).ok()
                    }
                }
            }
            ArgValue::Guid(value) => {
                if !placeholder.params_within(&["format", "case"]) {
                    return None;
                }
                let text = match placeholder.param("format").unwrap_or("d") {
                    "n" => value.simple().to_string(),
                    "d" => value.hyphenated().to_string(),
                    "b" => value.braced().to_string(),
                    "u" => value.urn().to_string(),
                    _ => return None,
                };
                apply_case(&text, placeholder.param("case"))
            }
            ArgValue::Enum {
                type_name,
                variant,
                value,
            } => {
                if !placeholder.params_within(&["format", "translation"]) {
                    return None;
                }
                match placeholder.param("translation") {
                    None | Some("false") => {}
                    Some("true") => {
                        let key = format!("{type_name}.{variant}");
                        return Some(lookup(&key).map_or(key.clone(), str::to_string));
                    }
                    Some(_) => return None,
                }
                match placeholder.param("format").unwrap_or("n") {
                    "n" => Some(variant.clone()),
                    "d" => Some(value.to_string()),
                    _ => None,
                }
            }
            ArgValue::Type {
                name,
                full_name,
            } => {
                if !placeholder.params_within(&["format", "translation"]) {
                    return None;
                }
                match placeholder.param("translation") {
                    None | Some("false") => {}
                    Some("true") => {
                        return Some(lookup(full_name).map_or(full_name.clone(), str::to_string));
                    }
                    Some(_) => return None,
                }
                match placeholder.param("format").unwrap_or("name") {
                    "name" => Some(name.clone()),
                    "fullName" => Some(full_name.clone()),
                    _ => None,
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Formatting Helpers
// ============================================================================

/// Strips module paths from a type name, keeping generic arguments readable.
fn short_type_name(full: &str) -> &str {
    let base_end = full.find('<').unwrap_or(full.len());
    let base = &full[.. base_end];
    base.rfind("::").map_or(full, |idx| &full[idx + 2 ..])
}

/// Applies a `case` parameter.
fn apply_case(text: &str, case: Option<&str>) -> Option<String> {
    match case {
        None => Some(text.to_string()),
        Some("upper") => Some(text.to_uppercase()),
        Some("lower") => Some(text.to_lowercase()),
        Some(_) => None,
    }
}

/// Formats a number with an optional `0.00`, `x`, or `X` format.
fn format_number(number: Number, format: Option<&str>) -> Option<String> {
    let Some(format) = format else {
        return Some(match number {
            Number::Int(value) => value.to_string(),
            Number::Float(value) => value.to_string(),
        });
    };

    match (format, number) {
        ("x", Number::Int(value)) => Some(format!("{value:x}")),
        ("X", Number::Int(value)) => Some(format!("{value:X}")),
        (pattern, _) => {
            let (whole, fraction) = pattern.split_once('.').unwrap_or((pattern, ""));
            if whole != "0" || !fraction.bytes().all(|b| b == b'0') {
                return None;
            }
            let precision = fraction.len();
            let mut text = String::new();
            let written = match number {
                #[allow(clippy::cast_precision_loss, reason = "display formatting only")]
                Number::Int(value) => write!(text, "{:.precision$}", value as f64),
                Number::Float(value) => write!(text, "{value:.precision$}"),
            };
            written.ok().map(|()| text)
        }
    }
}
