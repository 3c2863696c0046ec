// crates/spec-guard/src/context/flags.rs
// ============================================================================
// Module: Error Flags
// Description: Level-indexed enabled/detected error markers.
// Purpose: Track which composed errors fire when their level is left.
// Dependencies: smallvec, crate::registry
// ============================================================================

//! ## Overview
//! An [`ErrorFlag`] holds one entry per path level that enabled a composed
//! error. Reporting any error beneath marks the entries detected; leaving the
//! level removes its entry and yields the error id if it was detected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use smallvec::SmallVec;

use crate::registry::ErrorId;

/// One enabled error.
#[derive(Debug, Clone, Copy)]
struct FlagEntry {
    /// Path level the error was enabled at.
    level: usize,
    /// Error reported when the level is left after detection.
    error: ErrorId,
    /// True once anything beneath reported an error.
    detected: bool,
}

/// Stack of enabled errors ordered by level.
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorFlag {
    /// Entries, innermost last.
    entries: SmallVec<[FlagEntry; 4]>,
}

impl ErrorFlag {
    /// Enables an error at a level; a second enable at the same level is ignored.
    pub(crate) fn set_enabled(&mut self, level: usize, error: ErrorId) {
        if self.entries.last().is_some_and(|entry| entry.level == level) {
            return;
        }
        self.entries.push(FlagEntry {
            level,
            error,
            detected: false,
        });
    }

    /// Marks every enabled error as detected.
    pub(crate) fn set_detected(&mut self) {
        for entry in &mut self.entries {
            entry.detected = true;
        }
    }

    /// Returns true when any error is enabled.
    pub(crate) fn is_enabled(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns true when any enabled error was detected.
    pub(crate) fn is_detected(&self) -> bool {
        self.entries.iter().any(|entry| entry.detected)
    }

    /// Removes entries at or above `level` and returns the detected error at `level`.
    pub(crate) fn leave_level(&mut self, level: usize) -> Option<ErrorId> {
        let mut fired = None;
        while let Some(entry) = self.entries.last().copied() {
            if entry.level < level {
                break;
            }
            self.entries.pop();
            if entry.level == level && entry.detected {
                fired = Some(entry.error);
            }
        }
        fired
    }
}
