// crates/spec-guard/tests/support/models.rs
// ============================================================================
// Module: Test Models
// Description: Shared model types validated by the integration tests.
// ============================================================================
//! ## Overview
//! Plain structs for member, collection, and dictionary scopes, plus a linked
//! node type whose back-links can form genuine reference cycles.

#![allow(dead_code, reason = "Each test binary uses a subset of the shared models.")]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::OnceLock;

// ========================================================================
// Plain Models
// ========================================================================

/// Postal address.
#[derive(Debug, Clone, Default)]
pub struct Address {
    /// Street line.
    pub street: String,
    /// City name.
    pub city: String,
}

/// Person with scalar, optional, collection, and dictionary members.
#[derive(Debug, Clone, Default)]
pub struct Person {
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Optional contact address.
    pub email: Option<String>,
    /// Optional postal address.
    pub address: Option<Address>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Scores by subject.
    pub scores: BTreeMap<String, u32>,
}

impl Person {
    /// Creates a person with a name and age and nothing else.
    pub fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age,
            ..Self::default()
        }
    }
}

// ========================================================================
// Linked Models
// ========================================================================

/// Node whose successor is set after construction.
#[derive(Debug, Default)]
pub struct Node {
    /// Payload.
    pub value: i32,
    /// Successor, if linked.
    pub next: OnceLock<Arc<Node>>,
}

impl Node {
    /// Creates an unlinked node.
    pub fn new(value: i32) -> Arc<Self> {
        Arc::new(Self {
            value,
            next: OnceLock::new(),
        })
    }

    /// Returns the successor.
    pub fn successor(&self) -> Option<&Self> {
        self.next.get().map(AsRef::as_ref)
    }
}

/// Builds an acyclic chain of `len` nodes valued `0 .. len`.
pub fn chain(len: i32) -> Arc<Node> {
    let head = Node::new(0);
    let mut tail = Arc::clone(&head);
    for value in 1 .. len {
        let next = Node::new(value);
        let _ = tail.next.set(Arc::clone(&next));
        tail = next;
    }
    head
}

/// Builds a ring of `len` nodes whose last node links back to the head.
///
/// The ring owns itself and is leaked for the lifetime of the test binary.
pub fn ring(len: i32) -> Arc<Node> {
    let head = chain(len);
    let mut tail = Arc::clone(&head);
    while let Some(next) = tail.next.get().map(Arc::clone) {
        tail = next;
    }
    let _ = tail.next.set(Arc::clone(&head));
    head
}
