//! Blank node identities.
//!
//! A [`BlankNodeManager`] belongs to exactly one parse. Its identities
//! carry a random session prefix, so labels from two documents never
//! resolve to the same node. A [`BlankNodeLabeler`] belongs to exactly
//! one write and hands out the `rdf:nodeID` values.

use crate::model::BlankNode;
use std::collections::HashMap;

#[derive(Debug)]
pub struct BlankNodeManager {
    session: String,
    labels: HashMap<String, BlankNode>,
    counter: u64,
}

impl Default for BlankNodeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BlankNodeManager {
    pub fn new() -> Self {
        BlankNodeManager {
            session: format!("r{:016x}", rand::random::<u64>()),
            labels: HashMap::new(),
            counter: 0,
        }
    }

    /// The node for `label`; the same label always yields the same node.
    pub fn identity(&mut self, label: &str) -> BlankNode {
        if let Some(bn) = self.labels.get(label) {
            return bn.clone();
        }
        let bn = self.fresh();
        self.labels.insert(label.to_string(), bn.clone());
        bn
    }

    /// A node no label maps to.
    pub fn fresh(&mut self) -> BlankNode {
        self.counter += 1;
        BlankNode::new(format!("{}b{}", self.session, self.counter))
    }
}

/// Surrogate labels for blank nodes during one write, in order of
/// first request.
#[derive(Debug, Default)]
pub struct BlankNodeLabeler {
    labels: HashMap<BlankNode, String>,
}

impl BlankNodeLabeler {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn label(&mut self, bn: &BlankNode) -> &str {
        let next = self.labels.len();
        self.labels
            .entry(bn.clone())
            .or_insert_with(|| format!("b{}", next))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_label_same_node() {
        let mut m = BlankNodeManager::new();
        let a = m.identity("x");
        let b = m.identity("y");
        assert_eq!(m.identity("x"), a);
        assert_ne!(a, b);
    }

    #[test]
    fn fresh_nodes_never_collide() {
        let mut m = BlankNodeManager::new();
        let x = m.identity("x");
        let f1 = m.fresh();
        let f2 = m.fresh();
        assert_ne!(f1, f2);
        assert_ne!(f1, x);
        assert_ne!(f2, x);
    }

    #[test]
    fn sessions_are_isolated() {
        let mut first = BlankNodeManager::new();
        let mut second = BlankNodeManager::new();
        assert_ne!(first.identity("x"), second.identity("x"));
    }

    #[test]
    fn labeler_is_stable() {
        let mut l = BlankNodeLabeler::new();
        let a = BlankNode::new("a");
        let b = BlankNode::new("b");
        assert_eq!(l.label(&a), "b0");
        assert_eq!(l.label(&b), "b1");
        assert_eq!(l.label(&a), "b0");
    }
}
