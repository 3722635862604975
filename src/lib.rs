//! Catalog Import SDK - Converts clinical registry catalogs into protocol trees
//!
//! Provides unified interfaces for:
//! - Source catalog document models (organizers, observations, value sets)
//! - Composite identifier encoding and decoding
//! - Catalog tree conversion with per-run ontology deduplication
//! - Activation propagation over the converted tree
//! - Catalog loading against pluggable providers and stores
//! - Import configuration

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod import;
pub mod model;
pub mod models;

// Re-export commonly used types
pub use config::{ConfigError, ImportConfig};
pub use import::{
    ActivationPropagator, ActivationSummary, CatalogId, CatalogImporter, ImportError,
    MeasurementId, ObservationId, OntologyIndex, ValueKind, ValueSetIndex, ValueTypeMapper,
};
pub use model::{
    CatalogLoader, CatalogProvider, CatalogStatus, CatalogStore, FileCatalogProvider, LoadSummary,
    LoaderError, MemoryCatalogStore,
};

// Re-export models
pub use models::{
    CatalogMeta, CatalogTarget, Category, DataType, FeatureLeaf, FeatureRef, ImportedCatalog,
    Ontology, OntologyTerm, ProtocolNode, SourceCatalog, Unit, ValueSetTable,
};
