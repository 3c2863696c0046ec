// crates/spec-guard/src/context/path_stack.rs
// ============================================================================
// Module: Path Stack
// Description: Concrete and symbolic path tracking for full validation.
// Purpose: Keep the runtime path and its template in lockstep per level.
// Dependencies: crate::path
// ============================================================================

//! ## Overview
//! Every level holds the concrete path (`Items.#3.Name`) and its template
//! (`Items.#.Name`). Re-entering the same path shares the previous strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::rc::Rc;

use crate::path;

/// One path level.
#[derive(Debug, Clone)]
struct PathEntry {
    /// Concrete path.
    path: Rc<str>,
    /// Symbolic path.
    template: Rc<str>,
}

/// Stack of path levels; level 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct PathStack {
    /// Levels, innermost last.
    entries: Vec<PathEntry>,
}

impl PathStack {
    /// Creates a stack holding the root level.
    pub(crate) fn new() -> Self {
        let root: Rc<str> = Rc::from("");
        Self {
            entries: vec![PathEntry {
                path: Rc::clone(&root),
                template: root,
            }],
        }
    }

    /// Returns the current level.
    pub(crate) fn level(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Returns the current concrete path.
    pub(crate) fn path(&self) -> &str {
        self.entries.last().map_or("", |entry| &entry.path)
    }

    /// Returns the current symbolic path.
    pub(crate) fn template(&self) -> &str {
        self.entries.last().map_or("", |entry| &entry.template)
    }

    /// Returns the concrete path recorded at a level.
    pub(crate) fn path_at(&self, level: usize) -> Option<&str> {
        self.entries.get(level).map(|entry| &*entry.path)
    }

    /// Pushes the current path again.
    pub(crate) fn push_same(&mut self) {
        if let Some(entry) = self.entries.last().cloned() {
            self.entries.push(entry);
        }
    }

    /// Pushes a new level.
    pub(crate) fn push(&mut self, path: String, template: &str) {
        let template = if *template == *self.template() {
            self.entries.last().map_or_else(|| Rc::from(template), |entry| Rc::clone(&entry.template))
        } else {
            Rc::from(template)
        };
        self.entries.push(PathEntry {
            path: Rc::from(path),
            template,
        });
    }

    /// Pushes a collection item level.
    pub(crate) fn push_index(&mut self, index: usize) {
        let concrete = path::append(self.path(), &path::index_segment(index));
        let template = path::append(self.template(), path::marker_segment());
        self.push(concrete, &template);
    }

    /// Pops the innermost level; the root level is never popped.
    pub(crate) fn pop(&mut self) {
        if self.entries.len() > 1 {
            self.entries.pop();
        }
    }
}
