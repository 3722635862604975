//! Protocol tree model

use super::ontology::OntologyTerm;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Index of a feature in the owning catalog's feature arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRef(pub usize);

impl FeatureRef {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Grouping node produced from an organizer
///
/// Each protocol is owned by exactly one parent (or is the import root).
/// Features are referenced, not owned, so one feature may appear under
/// several protocols.
///
/// # Example
///
/// ```rust
/// use catalog_import::models::ProtocolNode;
///
/// let mut root = ProtocolNode::new("catalog_4", "LifeLines");
/// root.children.push(ProtocolNode::new("cohort", "Cohort"));
/// assert_eq!(root.iter().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolNode {
    pub identifier: String,
    pub name: String,
    /// JSON object mapping language to description text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology_term: Option<Arc<OntologyTerm>>,
    /// Explicitly marked unavailable by the source
    #[serde(default)]
    pub unavailable: bool,
    /// Computed by [`ActivationPropagator`](crate::import::activation::ActivationPropagator)
    #[serde(default)]
    pub active: bool,
    /// Set only on the synthesized import root
    #[serde(default)]
    pub root: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ProtocolNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<FeatureRef>,
}

impl ProtocolNode {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            description: None,
            ontology_term: None,
            unavailable: false,
            active: false,
            root: false,
            children: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Whether the protocol has no child protocols
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order iterator over this protocol and all descendants
    pub fn iter(&self) -> ProtocolIter<'_> {
        ProtocolIter { stack: vec![self] }
    }

    /// Find a protocol by identifier in this subtree
    pub fn find(&self, identifier: &str) -> Option<&ProtocolNode> {
        self.iter().find(|p| p.identifier == identifier)
    }
}

/// Depth-first, source-order traversal of a protocol tree
pub struct ProtocolIter<'a> {
    stack: Vec<&'a ProtocolNode>,
}

impl<'a> Iterator for ProtocolIter<'a> {
    type Item = &'a ProtocolNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_is_preorder_in_source_order() {
        let mut a = ProtocolNode::new("a", "A");
        let mut b = ProtocolNode::new("b", "B");
        b.children.push(ProtocolNode::new("b1", "B1"));
        a.children.push(b);
        a.children.push(ProtocolNode::new("c", "C"));

        let ids: Vec<&str> = a.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "b1", "c"]);
        assert!(a.find("b1").is_some_and(|p| p.is_leaf()));
        assert!(a.find("missing").is_none());
    }

    #[test]
    fn test_feature_ref_serializes_as_index() {
        let json = serde_json::to_string(&FeatureRef(3)).unwrap();
        assert_eq!(json, "3");
    }
}
