// crates/spec-guard/src/messages.rs
// ============================================================================
// Module: Message Cache
// Description: Pre-rendered messages per translation and error id.
// Purpose: Turn error ids into text without re-rendering on every query.
// Dependencies: indexmap, smallvec, crate::{args, error, path, registry, translation}
// ============================================================================

//! ## Overview
//! The cache is built once per validator. For every translation and error it
//! resolves each message key through the translation (falling back to the key
//! itself) and substitutes every placeholder except `{_path}` and `{_name}`.
//! Messages still carrying those are remembered by index.
//!
//! Template paths without index markers are rendered up front. Concrete paths
//! with indices or dictionary keys are rendered at query time through a memo
//! that lives only for that query, so the shared cache is never written after
//! construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::args;
use crate::args::Arg;
use crate::args::TRANSLATION_ARG;
use crate::error::IntegrityError;
use crate::error::TranslationError;
use crate::path;
use crate::registry::ErrorId;
use crate::registry::ErrorRegistry;
use crate::translation::TranslationTable;
use crate::translation::Translations;

// ============================================================================
// SECTION: Cache Entries
// ============================================================================

/// Rendered messages of one error in one translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ErrorMessages {
    /// Messages with every path-independent placeholder substituted.
    messages: Vec<String>,
    /// Indices of messages that still carry path placeholders.
    path_args: SmallVec<[usize; 2]>,
}

impl ErrorMessages {
    /// Renders the path-dependent messages for a concrete path.
    fn render_for(&self, concrete_path: &str) -> Vec<String> {
        self.messages
            .iter()
            .enumerate()
            .map(|(index, message)| {
                if self.path_args.contains(&index) {
                    args::render_path_args(message, concrete_path)
                } else {
                    message.clone()
                }
            })
            .collect()
    }
}

/// Everything cached for one translation.
#[derive(Debug, Clone, Default)]
struct TranslationMessages {
    /// Entries indexed by error id.
    errors: Vec<ErrorMessages>,
    /// Eagerly rendered path-dependent messages by template path.
    by_path: HashMap<String, HashMap<ErrorId, Vec<String>>>,
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Immutable message cache for one compiled scheme.
#[derive(Debug, Clone, Default)]
pub struct MessageCache {
    /// Cached messages by translation name.
    translations: IndexMap<String, TranslationMessages>,
}

impl MessageCache {
    /// Builds the cache.
    #[must_use]
    pub fn build(
        translations: &Translations,
        registry: &ErrorRegistry,
        template: &IndexMap<String, Vec<ErrorId>>,
    ) -> Self {
        let mut cache = IndexMap::new();
        for (name, table) in translations.iter() {
            let errors: Vec<ErrorMessages> = registry
                .iter()
                .map(|(_, error)| {
                    let messages: Vec<String> = error
                        .messages()
                        .iter()
                        .map(|message| render_message(message, error.args(), table))
                        .collect();
                    let path_args = messages
                        .iter()
                        .enumerate()
                        .filter(|(_, message)| args::has_path_placeholder(message))
                        .map(|(index, _)| index)
                        .collect();
                    ErrorMessages {
                        messages,
                        path_args,
                    }
                })
                .collect();

            let mut by_path: HashMap<String, HashMap<ErrorId, Vec<String>>> = HashMap::new();
            for (template_path, ids) in template {
                if path::contains_index(template_path) {
                    continue;
                }
                for id in ids {
                    let Some(entry) = errors.get(id.index()) else {
                        continue;
                    };
                    if entry.path_args.is_empty() {
                        continue;
                    }
                    by_path
                        .entry(template_path.clone())
                        .or_default()
                        .insert(*id, entry.render_for(template_path));
                }
            }

            cache.insert(name.to_string(), TranslationMessages {
                errors,
                by_path,
            });
        }

        Self {
            translations: cache,
        }
    }

    /// Iterates the cached translation names.
    pub fn translation_names(&self) -> impl Iterator<Item = &str> {
        self.translations.keys().map(String::as_str)
    }

    /// Renders an errors map into messages for one translation.
    ///
    /// Paths carrying indices or dictionary keys are rendered on demand and
    /// memoized for this call only. Repeated queries render them again in
    /// exchange for a cache that is never written after construction and needs
    /// no lock across threads.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::Unknown`] when the translation is not cached.
    pub fn messages(
        &self,
        translation: &str,
        errors: &IndexMap<String, Vec<ErrorId>>,
    ) -> Result<IndexMap<String, Vec<String>>, TranslationError> {
        let cached = self
            .translations
            .get(translation)
            .ok_or_else(|| TranslationError::Unknown(translation.to_string()))?;

        let mut rendered_paths: HashMap<(&str, ErrorId), Vec<String>> = HashMap::new();
        let mut output = IndexMap::with_capacity(errors.len());
        for (concrete_path, ids) in errors {
            let mut messages = Vec::new();
            for id in ids {
                let Some(entry) = cached.errors.get(id.index()) else {
                    continue;
                };
                if entry.path_args.is_empty() {
                    messages.extend(entry.messages.iter().cloned());
                    continue;
                }
                if let Some(eager) =
                    cached.by_path.get(concrete_path.as_str()).and_then(|by_id| by_id.get(id))
                {
                    messages.extend(eager.iter().cloned());
                    continue;
                }
                let lazy = rendered_paths
                    .entry((concrete_path.as_str(), *id))
                    .or_insert_with(|| entry.render_for(concrete_path));
                messages.extend(lazy.iter().cloned());
            }
            if !messages.is_empty() {
                output.insert(concrete_path.clone(), messages);
            }
        }
        Ok(output)
    }

    /// Checks that every translation covers every error and that path-argument
    /// indices stay inside each message list.
    ///
    /// # Errors
    ///
    /// Returns the first [`IntegrityError`] found.
    pub fn verify_integrity(&self, registry: &ErrorRegistry) -> Result<(), IntegrityError> {
        for (name, cached) in &self.translations {
            for (id, _) in registry.iter() {
                let entry = cached.errors.get(id.index()).ok_or_else(|| {
                    IntegrityError::MissingTranslationEntry {
                        translation: name.clone(),
                        error: id,
                    }
                })?;
                if let Some(index) =
                    entry.path_args.iter().copied().find(|index| *index >= entry.messages.len())
                {
                    return Err(IntegrityError::PathArgIndexOutOfRange {
                        translation: name.clone(),
                        error: id,
                        index,
                        count: entry.messages.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Resolves a message key and substitutes its path-independent placeholders.
fn render_message(message: &str, error_args: &[Arg], table: &TranslationTable) -> String {
    let text = table.get(message).map_or(message, String::as_str);
    args::substitute(text, |placeholder| {
        if placeholder.name == TRANSLATION_ARG {
            if !placeholder.params_within(&["key"]) {
                return None;
            }
            let key = placeholder.param("key")?;
            return Some(table.get(key).map_or(key, String::as_str).to_string());
        }
        error_args
            .iter()
            .find(|arg| arg.name() == placeholder.name)?
            .stringify(placeholder, |key| table.get(key).map(String::as_str))
    })
}
