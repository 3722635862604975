//! Bottom-up activation propagation
//!
//! A protocol is active when it is not marked unavailable and either has no
//! child protocols or has at least one active child. Features carry no flag.

use crate::models::ProtocolNode;
use serde::{Deserialize, Serialize};

/// Protocol counts after propagation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationSummary {
    pub active: usize,
    pub inactive: usize,
}

impl ActivationSummary {
    pub fn total(&self) -> usize {
        self.active + self.inactive
    }
}

pub struct ActivationPropagator;

impl ActivationPropagator {
    /// Set the active flag of every protocol in the tree, children first
    pub fn propagate(root: &mut ProtocolNode) -> ActivationSummary {
        let mut summary = ActivationSummary::default();
        Self::visit(root, &mut summary);
        summary
    }

    fn visit(node: &mut ProtocolNode, summary: &mut ActivationSummary) -> bool {
        // every child is visited so the whole subtree gets its flag
        let mut any_child_active = false;
        for child in &mut node.children {
            any_child_active |= Self::visit(child, summary);
        }

        node.active = !node.unavailable && (node.children.is_empty() || any_child_active);
        if node.active {
            summary.active += 1;
        } else {
            summary.inactive += 1;
        }
        node.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> ProtocolNode {
        ProtocolNode::new(id, id)
    }

    fn unavailable(id: &str) -> ProtocolNode {
        let mut node = node(id);
        node.unavailable = true;
        node
    }

    #[test]
    fn test_leaf_is_active_unless_unavailable() {
        let mut leaf = node("leaf");
        assert_eq!(ActivationPropagator::propagate(&mut leaf).active, 1);
        assert!(leaf.active);

        let mut leaf = unavailable("leaf");
        ActivationPropagator::propagate(&mut leaf);
        assert!(!leaf.active);
    }

    #[test]
    fn test_one_active_child_keeps_parent_active() {
        let mut parent = node("parent");
        parent.children.push(unavailable("a"));
        parent.children.push(node("b"));

        let summary = ActivationPropagator::propagate(&mut parent);
        assert!(parent.active);
        assert!(!parent.children[0].active);
        assert!(parent.children[1].active);
        assert_eq!(summary, ActivationSummary { active: 2, inactive: 1 });
    }

    #[test]
    fn test_all_inactive_children_deactivate_parent() {
        let mut mid = node("mid");
        mid.children.push(unavailable("a"));
        mid.children.push(unavailable("b"));
        let mut root = node("root");
        root.children.push(mid);

        let summary = ActivationPropagator::propagate(&mut root);
        assert!(!root.active);
        assert!(!root.children[0].active);
        assert_eq!(summary.inactive, 4);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_unavailable_parent_with_active_children() {
        let mut parent = unavailable("parent");
        parent.children.push(node("child"));

        ActivationPropagator::propagate(&mut parent);
        assert!(!parent.active);
        assert!(parent.children[0].active);
    }

    #[test]
    fn test_propagation_recomputes_stale_flags() {
        let mut parent = node("parent");
        let mut child = unavailable("child");
        child.active = true;
        parent.children.push(child);
        parent.active = true;

        ActivationPropagator::propagate(&mut parent);
        assert!(!parent.active);
        assert!(!parent.children[0].active);
    }
}
