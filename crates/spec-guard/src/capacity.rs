// crates/spec-guard/src/capacity.rs
// ============================================================================
// Module: Capacity Planning
// Description: Pre-sizing hints for full validation error collections.
// Purpose: Trade one observed run for fewer reallocations on later runs.
// Dependencies: indexmap, serde, tracing, crate::{path, registry}
// ============================================================================

//! ## Overview
//! A [`CapacityInfo`] strategy answers how large the errors map and each
//! per-path error list should start. [`DisabledCapacity`] never answers.
//! [`MaxObservedCapacity`] is fed once with the result of the first full
//! validation and afterwards answers from that snapshot; later feeds are
//! ignored. Paths are normalized to their template form, so `Items.#7` and
//! `Items.#0` share one hint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use tracing::trace;

use crate::path;
use crate::registry::ErrorId;

// ============================================================================
// SECTION: Strategy Contract
// ============================================================================

/// Sizing strategy for full validation results.
pub trait CapacityInfo: Send + Sync + fmt::Debug {
    /// Returns true while the strategy still wants to observe a result.
    fn should_feed(&self) -> bool;

    /// Observes a result. Only the first feed has an effect.
    fn feed(&self, errors: &IndexMap<String, Vec<ErrorId>>);

    /// Returns the initial capacity of the errors map.
    fn errors_map_capacity(&self) -> usize;

    /// Returns the initial capacity of the error list at `path`.
    fn try_get_capacity(&self, path: &str) -> Option<usize>;
}

/// Selects a built-in capacity strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapacityStrategy {
    /// No pre-sizing.
    #[default]
    Disabled,
    /// Pre-size from the first full validation.
    MaxObserved,
}

impl CapacityStrategy {
    /// Builds the strategy.
    #[must_use]
    pub fn build(self) -> Box<dyn CapacityInfo> {
        match self {
            Self::Disabled => Box::new(DisabledCapacity),
            Self::MaxObserved => Box::new(MaxObservedCapacity::default()),
        }
    }
}

// ============================================================================
// SECTION: Disabled
// ============================================================================

/// Strategy that never pre-sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCapacity;

impl CapacityInfo for DisabledCapacity {
    fn should_feed(&self) -> bool {
        false
    }

    fn feed(&self, _errors: &IndexMap<String, Vec<ErrorId>>) {}

    fn errors_map_capacity(&self) -> usize {
        0
    }

    fn try_get_capacity(&self, _path: &str) -> Option<usize> {
        None
    }
}

// ============================================================================
// SECTION: Max Observed
// ============================================================================

/// Snapshot of one observed result.
#[derive(Debug, Clone, Default)]
struct Observation {
    /// Number of paths observed.
    paths: usize,
    /// Largest error count per template path.
    per_path: HashMap<String, usize>,
}

/// Strategy sized from the first observed result.
#[derive(Debug, Default)]
pub struct MaxObservedCapacity {
    /// Set by the first feed.
    observed: OnceLock<Observation>,
}

impl CapacityInfo for MaxObservedCapacity {
    fn should_feed(&self) -> bool {
        self.observed.get().is_none()
    }

    fn feed(&self, errors: &IndexMap<String, Vec<ErrorId>>) {
        if self.observed.get().is_some() {
            return;
        }
        let mut per_path: HashMap<String, usize> = HashMap::new();
        for (path, ids) in errors {
            let slot = per_path.entry(path::template_of(path).into_owned()).or_default();
            *slot = (*slot).max(ids.len());
        }
        let observation = Observation {
            paths: errors.len(),
            per_path,
        };
        trace!(paths = observation.paths, "capacity observed");
        let _ = self.observed.set(observation);
    }

    fn errors_map_capacity(&self) -> usize {
        self.observed.get().map_or(0, |observation| observation.paths)
    }

    fn try_get_capacity(&self, path: &str) -> Option<usize> {
        let observation = self.observed.get()?;
        observation.per_path.get(path::template_of(path).as_ref()).copied()
    }
}
