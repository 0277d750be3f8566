//! Duplicate function body detection.
//!
//! Bodies are reduced to a canonical token stream (names, literals, operator
//! symbols and a few keywords; comments and layout dropped) and hashed with a
//! base-31 polynomial hash. A body is a duplicate when an equal canonical
//! stream was registered before it.

use std::collections::HashMap;

use tracing::debug;

use super::syntax::{walk_node, Block, Node, Visitor};

const HASH_BASE: u64 = 31;

/// Polynomial rolling hash over the characters of `text`, wrapping on overflow.
pub fn rolling_hash(text: &str) -> u64 {
    text.chars().fold(0u64, |hash, ch| {
        hash.wrapping_mul(HASH_BASE).wrapping_add(u64::from(ch))
    })
}

/// Reduce a body to its canonical token stream.
pub fn canonicalize(body: &Block) -> String {
    let mut tokens = Tokens(Vec::new());
    tokens.visit_block(body);
    tokens.0.join(" ")
}

struct Tokens(Vec<String>);

impl Visitor for Tokens {
    fn visit_node(&mut self, node: &Node) {
        match node {
            Node::Comment(_) => return,
            Node::Ident(name) | Node::Literal(name) => self.0.push(name.clone()),
            Node::Unary { op, .. } | Node::Binary { op, .. } => self.0.push(op.clone()),
            Node::Selector { field, .. } => {
                walk_node(self, node);
                self.0.push(format!(".{}", field));
                return;
            }
            Node::Type(ty) => ty.for_each_name(&mut |name| self.0.push(name.to_string())),
            Node::Return(_) => self.0.push("return".to_string()),
            Node::If { .. } => self.0.push("if".to_string()),
            Node::For { .. } | Node::Range { .. } => self.0.push("for".to_string()),
            Node::Switch { .. } => self.0.push("switch".to_string()),
            _ => {}
        }
        walk_node(self, node);
    }
}

/// Registry of canonical bodies seen so far, fed in path order.
///
/// Equality is decided on the canonical string; the hash only buckets
/// candidates, so a collision cannot produce a false positive.
#[derive(Default)]
pub struct DuplicateDetector {
    seen: HashMap<u64, Vec<String>>,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `canonical` and report whether an identical body came first.
    pub fn check(&mut self, canonical: &str) -> bool {
        let hash = rolling_hash(canonical);
        let bucket = self.seen.entry(hash).or_default();
        if bucket.iter().any(|existing| existing == canonical) {
            debug!(hash, "duplicate body");
            return true;
        }
        bucket.push(canonical.to_string());
        false
    }

    /// Number of distinct bodies registered.
    pub fn len(&self) -> usize {
        self.seen.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
