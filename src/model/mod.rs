//! Catalog loading
//!
//! Provides high-level operations for loading catalogs into a store:
//! fetch from a [`CatalogProvider`], convert with the
//! [`CatalogImporter`](crate::import::CatalogImporter), hand the result to a
//! [`CatalogStore`]. [`CatalogLoader::list`] reports which of the provider's
//! catalogs are already loaded.
//!
//! File structure read by [`FileCatalogProvider`]:
//! - Base directory
//!   - `{key}.catalog.json` / `{key}.catalog.yaml` - Catalog document
//!   - `{key}.valuesets.json` / `{key}.valuesets.yaml` - Value-set table (optional)
//!
//! where `{key}` is the release id, or `studydefinition_{id}` for the catalog
//! of a study definition.

pub mod loader;
pub mod provider;
pub mod store;

pub use loader::{CatalogLoader, CatalogStatus, LoadSummary};
pub use provider::{CatalogProvider, FileCatalogProvider};
pub use store::{CatalogStore, MemoryCatalogStore};

use crate::import::ImportError;

/// Error while loading, unloading or activating a catalog
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum LoaderError {
    #[error("Unknown catalog [{0}]")]
    UnknownCatalog(String),
    #[error("Catalog [{0}] is already loaded")]
    AlreadyLoaded(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Store error: {0}")]
    StoreError(String),
    #[error(transparent)]
    Import(#[from] ImportError),
}
