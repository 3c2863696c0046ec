// crates/spec-guard/src/path.rs
// ============================================================================
// Module: Path Grammar
// Description: Path construction, validation, and relative resolution.
// Purpose: Keep symbolic templates and concrete runtime paths reconcilable.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A path is a dot-separated list of segments. Collection items use the
//! reserved marker `#`: discovery emits the bare marker, runtime emits `#<n>`.
//! Relative paths may start with any number of `<` characters, each one
//! moving a level up from the base path before the remainder is appended.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::sync::LazyLock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Segment separator.
pub const SEPARATOR: char = '.';
/// Reserved collection-item marker.
pub const INDEX_MARKER: char = '#';
/// Prefix character that moves one level up in a relative path.
pub const UP_LEVEL: char = '<';
/// Number of index segments formatted once and reused.
const CACHED_INDEXES: usize = 256;

/// Pre-rendered `#0 .. #255` segments.
static INDEX_SEGMENTS: LazyLock<Vec<String>> =
    LazyLock::new(|| (0 .. CACHED_INDEXES).map(|i| format!("{INDEX_MARKER}{i}")).collect());

// ============================================================================
// SECTION: Segments
// ============================================================================

/// Returns the concrete segment for a collection index.
#[must_use]
pub fn index_segment(index: usize) -> Cow<'static, str> {
    INDEX_SEGMENTS
        .get(index)
        .map_or_else(|| Cow::Owned(format!("{INDEX_MARKER}{index}")), |s| Cow::Borrowed(s.as_str()))
}

/// Returns the symbolic marker segment used in templates.
#[must_use]
pub const fn marker_segment() -> &'static str {
    "#"
}

/// Returns true when `name` is usable as one path segment.
///
/// Segments are non-empty, contain no separator, no whitespace, no braces, and
/// start with neither the up-level prefix nor the index marker.
#[must_use]
pub fn is_valid_segment(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(UP_LEVEL)
        && !name.starts_with(INDEX_MARKER)
        && !name.chars().any(is_reserved_char)
}

/// Returns true for characters that never appear inside a segment.
fn is_reserved_char(c: char) -> bool {
    c == SEPARATOR || c == '{' || c == '}' || c.is_whitespace()
}

/// Turns a stringified dictionary key into a usable segment.
///
/// Reserved characters and a leading `<` or `#` become `_`. The empty key maps
/// to the bare marker. Keys that are already valid are borrowed unchanged.
#[must_use]
pub fn key_segment(key: &str) -> Cow<'_, str> {
    if key.is_empty() {
        return Cow::Borrowed(marker_segment());
    }
    if is_valid_segment(key) {
        return Cow::Borrowed(key);
    }
    let segment = key
        .chars()
        .enumerate()
        .map(|(position, c)| {
            let leading = position == 0 && (c == UP_LEVEL || c == INDEX_MARKER);
            if leading || is_reserved_char(c) { '_' } else { c }
        })
        .collect();
    Cow::Owned(segment)
}

/// Returns true when `path` is a valid relative path.
///
/// Grammar: `<`* followed by zero or more valid segments joined by `.`; at least
/// one character overall.
#[must_use]
pub fn is_valid_relative_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let rest = path.trim_start_matches(UP_LEVEL);
    rest.is_empty() || rest.split(SEPARATOR).all(is_valid_segment)
}

// ============================================================================
// SECTION: Composition
// ============================================================================

/// Appends one segment to a base path.
#[must_use]
pub fn append(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        let mut path = String::with_capacity(base.len() + 1 + segment.len());
        path.push_str(base);
        path.push(SEPARATOR);
        path.push_str(segment);
        path
    }
}

/// Resolves a relative path against a base path.
///
/// Each leading `<` drops one trailing segment from the base; moving above the
/// root clamps at the root. The remainder is appended segment-wise.
#[must_use]
pub fn resolve(base: &str, relative: &str) -> String {
    let ups = relative.chars().take_while(|c| *c == UP_LEVEL).count();
    let rest = &relative[ups ..];

    let mut trimmed = base;
    for _ in 0 .. ups {
        trimmed = trimmed.rfind(SEPARATOR).map_or("", |idx| &trimmed[.. idx]);
    }

    if rest.is_empty() {
        trimmed.to_string()
    } else {
        append(trimmed, rest)
    }
}

/// Returns the last segment of a path (empty for the root).
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.rfind(SEPARATOR).map_or(path, |idx| &path[idx + 1 ..])
}

// ============================================================================
// SECTION: Templates
// ============================================================================

/// Returns true when a segment is a concrete collection index (`#<digits>`).
fn is_index_segment(segment: &str) -> bool {
    segment
        .strip_prefix(INDEX_MARKER)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Returns true when the path contains a symbolic or concrete index segment.
#[must_use]
pub fn contains_index(path: &str) -> bool {
    path.split(SEPARATOR).any(|s| s == marker_segment() || is_index_segment(s))
}

/// Rewrites concrete `#<n>` segments into the symbolic `#` marker.
#[must_use]
pub fn template_of(path: &str) -> Cow<'_, str> {
    if !path.split(SEPARATOR).any(is_index_segment) {
        return Cow::Borrowed(path);
    }
    let segments: Vec<&str> = path
        .split(SEPARATOR)
        .map(|s| if is_index_segment(s) { marker_segment() } else { s })
        .collect();
    Cow::Owned(segments.join("."))
}

// ============================================================================
// SECTION: Display Helpers
// ============================================================================

/// Splits a camel/pascal/snake case segment into space separated title words.
///
/// `firstName` and `first_name` both become `First Name`.
#[must_use]
pub fn title_case(segment: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for c in segment.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
