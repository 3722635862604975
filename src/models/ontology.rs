//! Ontology models shared across one import run

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Vocabulary a set of terms belongs to, keyed by code system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ontology {
    /// Derived from the code system
    pub identifier: String,
    pub name: String,
    pub code_system: String,
}

/// One code of an ontology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyTerm {
    /// Derived from code system and code
    pub identifier: String,
    pub code: String,
    /// Display name, empty when the source has none
    pub name: String,
    /// Owning ontology, absent when the source lacks the code system or its name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology: Option<Arc<Ontology>>,
}

/// Measurement unit of a physical-quantity feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub identifier: String,
    pub name: String,
}
