//! Import functionality
//!
//! Converts a registry catalog document into the internal protocol tree:
//! - Identifier codec (measurement, observation and catalog identifiers)
//! - Value type mapping (HL7 value tags to logical data types)
//! - Per-run ontology and unit cache
//! - Value-set lookup for coded observations
//! - Recursive catalog tree builder
//! - Bottom-up activation propagation

pub mod activation;
pub mod catalog;
pub mod identifier;
pub mod ontology;
pub mod value_sets;
pub mod value_type;

pub use activation::{ActivationPropagator, ActivationSummary};
pub use catalog::CatalogImporter;
pub use identifier::{CatalogId, MeasurementId, ObservationId};
pub use ontology::OntologyIndex;
pub use value_sets::ValueSetIndex;
pub use value_type::{ValueKind, ValueTypeMapper};

/// Error during import
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ImportError {
    #[error("Invalid identifier [{0}]")]
    InvalidIdentifier(String),
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(String),
    #[error("Missing value set: {0}")]
    MissingValueSet(String),
    #[error("Missing code or code system: {0}")]
    MissingCodeOrCodeSystem(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(String),
}
