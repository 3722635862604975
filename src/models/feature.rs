//! Feature leaf model

use super::ontology::{OntologyTerm, Unit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Logical data type understood by the receiving store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Bool,
    Categorical,
    String,
    Int,
    Decimal,
    Datetime,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Bool => "bool",
            DataType::Categorical => "categorical",
            DataType::String => "string",
            DataType::Int => "int",
            DataType::Decimal => "decimal",
            DataType::Datetime => "datetime",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data item produced from an observation
///
/// Features are stored once per import in the catalog's feature arena and
/// referenced from protocols by [`FeatureRef`](super::protocol::FeatureRef).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLeaf {
    pub identifier: String,
    pub name: String,
    /// JSON object mapping language to description text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Arc<Unit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology_term: Option<Arc<OntologyTerm>>,
    /// Allowed values, only for categorical features
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
}

impl FeatureLeaf {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            description: None,
            data_type,
            unit: None,
            ontology_term: None,
            categories: Vec::new(),
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.data_type == DataType::Categorical
    }
}

/// One allowed coded value of a categorical feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub identifier: String,
    pub name: String,
    pub value_code: String,
    /// Identifier of the owning feature
    pub feature: String,
}
