//! Imported catalog model
//!
//! The batch handed to a [`CatalogStore`](crate::model::CatalogStore) at the
//! end of an import: the protocol tree, the feature arena and the shared
//! ontology objects created during the run.

use super::feature::FeatureLeaf;
use super::ontology::{Ontology, OntologyTerm, Unit};
use super::protocol::{FeatureRef, ProtocolNode};
use super::source::DocumentMeta;
use crate::import::identifier::CatalogId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Catalog selected for import
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum CatalogTarget {
    /// A published catalog release
    Release(String),
    /// The catalog attached to a study definition
    StudyDefinition(String),
}

impl CatalogTarget {
    /// Identifier of the synthesized root protocol
    pub fn root_identifier(&self) -> String {
        match self {
            CatalogTarget::Release(id) => CatalogId::for_release(id),
            CatalogTarget::StudyDefinition(id) => CatalogId::for_study_definition(id),
        }
    }

    /// Release coordinate used in composite identifiers
    pub fn release_id(&self) -> &str {
        match self {
            CatalogTarget::Release(id) | CatalogTarget::StudyDefinition(id) => id,
        }
    }

    /// File-name key used by file-based providers
    pub fn key(&self) -> String {
        match self {
            CatalogTarget::Release(id) => id.clone(),
            CatalogTarget::StudyDefinition(id) => format!("{}{}", STUDY_DEFINITION_KEY_PREFIX, id),
        }
    }

    /// Inverse of [`CatalogTarget::key`]
    pub fn from_key(key: &str) -> Self {
        match key.strip_prefix(STUDY_DEFINITION_KEY_PREFIX) {
            Some(id) if !id.is_empty() => CatalogTarget::StudyDefinition(id.to_string()),
            _ => CatalogTarget::Release(key.to_string()),
        }
    }
}

const STUDY_DEFINITION_KEY_PREFIX: &str = "studydefinition_";

/// Listing entry of an importable catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMeta {
    pub target: CatalogTarget,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

impl CatalogMeta {
    pub fn new(target: CatalogTarget, name: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
            description: None,
            version: None,
            authors: Vec::new(),
        }
    }

    /// Build from a document's descriptive block, naming it by key when untitled
    pub fn from_document(target: CatalogTarget, meta: Option<DocumentMeta>) -> Self {
        let meta = meta.unwrap_or_default();
        let name = meta
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| target.key());
        Self {
            target,
            name,
            description: meta.description,
            version: meta.version,
            authors: meta.authors,
        }
    }
}

impl std::fmt::Display for CatalogTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogTarget::Release(id) => write!(f, "catalog release {}", id),
            CatalogTarget::StudyDefinition(id) => write!(f, "study definition {}", id),
        }
    }
}

/// Kind of locally recovered problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingDisplayName,
    MissingTranslation,
    MissingOntologyCoordinates,
    MissingUnit,
    SkippedFeature,
}

/// Problem recovered during import, logged but not fatal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportWarning {
    pub kind: WarningKind,
    /// Identifier or code of the affected node
    pub subject: String,
    pub message: String,
}

impl ImportWarning {
    pub fn new(kind: WarningKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Observation left out of the tree under the skip-unsupported policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFeature {
    pub identifier: String,
    pub value_type: String,
}

/// Result of one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedCatalog {
    pub target: CatalogTarget,
    pub root: ProtocolNode,
    /// Every feature produced in this run, in creation order
    pub features: Vec<FeatureLeaf>,
    pub ontologies: Vec<Arc<Ontology>>,
    pub ontology_terms: Vec<Arc<OntologyTerm>>,
    pub units: Vec<Arc<Unit>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ImportWarning>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_features: Vec<SkippedFeature>,
    pub imported_at: DateTime<Utc>,
}

impl ImportedCatalog {
    /// Resolve a feature reference
    pub fn feature(&self, feature: FeatureRef) -> Option<&FeatureLeaf> {
        self.features.get(feature.index())
    }

    /// Find a feature by identifier
    pub fn find_feature(&self, identifier: &str) -> Option<&FeatureLeaf> {
        self.features.iter().find(|f| f.identifier == identifier)
    }

    /// Features referenced by a protocol, in source order
    pub fn features_of<'a>(
        &'a self,
        protocol: &'a ProtocolNode,
    ) -> impl Iterator<Item = &'a FeatureLeaf> + 'a {
        protocol.features.iter().filter_map(|f| self.feature(*f))
    }

    /// Find a protocol by identifier anywhere in the tree
    pub fn find_protocol(&self, identifier: &str) -> Option<&ProtocolNode> {
        self.root.find(identifier)
    }

    /// Number of protocols including the root
    pub fn protocol_count(&self) -> usize {
        self.root.iter().count()
    }

    /// Number of categories across all features
    pub fn category_count(&self) -> usize {
        self.features.iter().map(|f| f.categories.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_identifiers() {
        let release = CatalogTarget::Release("4".to_string());
        assert_eq!(release.root_identifier(), "catalog_4");
        assert_eq!(release.key(), "4");

        let study = CatalogTarget::StudyDefinition("12".to_string());
        assert_eq!(study.root_identifier(), "catalog_studydefinition_12");
        assert_eq!(study.key(), "studydefinition_12");
        assert_eq!(study.release_id(), "12");
    }

    #[test]
    fn test_target_from_key() {
        for target in [
            CatalogTarget::Release("4".to_string()),
            CatalogTarget::StudyDefinition("12".to_string()),
        ] {
            assert_eq!(CatalogTarget::from_key(&target.key()), target);
        }
        assert_eq!(
            CatalogTarget::from_key("studydefinition_"),
            CatalogTarget::Release("studydefinition_".to_string())
        );
    }

    #[test]
    fn test_catalog_meta_from_document() {
        let target = CatalogTarget::Release("4".to_string());
        let untitled = CatalogMeta::from_document(target.clone(), None);
        assert_eq!(untitled, CatalogMeta::new(target.clone(), "4"));

        let meta = CatalogMeta::from_document(
            target,
            Some(DocumentMeta {
                name: Some("LifeLines 2013".to_string()),
                version: Some("3".to_string()),
                authors: vec!["Data manager".to_string()],
                ..Default::default()
            }),
        );
        assert_eq!(meta.name, "LifeLines 2013");
        assert_eq!(meta.version.as_deref(), Some("3"));
        assert_eq!(meta.authors, vec!["Data manager"]);
        assert_eq!(meta.description, None);
    }

    #[test]
    fn test_target_serde() {
        let target = CatalogTarget::Release("4".to_string());
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, r#"{"kind":"release","id":"4"}"#);
        let back: CatalogTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(back, target);
    }
}
