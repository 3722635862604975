//! Data models
//!
//! Defines the source catalog document consumed by the importer and the
//! protocol/feature tree it produces.

pub mod catalog;
pub mod feature;
pub mod ontology;
pub mod protocol;
pub mod source;

pub use catalog::{
    CatalogMeta, CatalogTarget, ImportWarning, ImportedCatalog, SkippedFeature, WarningKind,
};
pub use feature::{Category, DataType, FeatureLeaf};
pub use ontology::{Ontology, OntologyTerm, Unit};
pub use protocol::{FeatureRef, ProtocolNode};
pub use source::{
    Code, Component, DocumentFormat, DocumentMeta, EffectiveTime, Observation, ObservationValue,
    Organizer, OriginalText, SourceCatalog, SourceNode, ValueSet, ValueSetCode, ValueSetTable,
};
