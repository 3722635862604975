//! Catalog stores

use super::LoaderError;
use crate::models::ImportedCatalog;
use std::collections::HashMap;
use tracing::info;

/// Receiver of imported catalogs, keyed by root protocol identifier
pub trait CatalogStore {
    /// Persist a whole catalog as one batch
    fn store(&mut self, catalog: ImportedCatalog) -> Result<(), LoaderError>;

    fn is_loaded(&self, root_identifier: &str) -> bool;

    /// Remove a catalog and all its protocols
    fn remove(&mut self, root_identifier: &str) -> Result<ImportedCatalog, LoaderError>;

    /// Override the active flag of a catalog root
    fn set_active(&mut self, root_identifier: &str, active: bool) -> Result<(), LoaderError>;

    /// Whether the catalog is loaded and active
    fn is_active(&self, root_identifier: &str) -> bool;
}

/// In-memory catalog store
///
/// Activation overrides are kept beside the stored tree, which is never
/// modified after import.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    catalogs: HashMap<String, ImportedCatalog>,
    activation: HashMap<String, bool>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, root_identifier: &str) -> Option<&ImportedCatalog> {
        self.catalogs.get(root_identifier)
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn store(&mut self, catalog: ImportedCatalog) -> Result<(), LoaderError> {
        let identifier = catalog.root.identifier.clone();
        if self.catalogs.contains_key(&identifier) {
            return Err(LoaderError::AlreadyLoaded(identifier));
        }
        info!("Storing catalog [{}]", identifier);
        self.activation.remove(&identifier);
        self.catalogs.insert(identifier, catalog);
        Ok(())
    }

    fn is_loaded(&self, root_identifier: &str) -> bool {
        self.catalogs.contains_key(root_identifier)
    }

    fn remove(&mut self, root_identifier: &str) -> Result<ImportedCatalog, LoaderError> {
        self.activation.remove(root_identifier);
        self.catalogs
            .remove(root_identifier)
            .ok_or_else(|| LoaderError::UnknownCatalog(root_identifier.to_string()))
    }

    fn set_active(&mut self, root_identifier: &str, active: bool) -> Result<(), LoaderError> {
        if !self.catalogs.contains_key(root_identifier) {
            return Err(LoaderError::UnknownCatalog(root_identifier.to_string()));
        }
        self.activation.insert(root_identifier.to_string(), active);
        Ok(())
    }

    fn is_active(&self, root_identifier: &str) -> bool {
        match self.catalogs.get(root_identifier) {
            Some(catalog) => self
                .activation
                .get(root_identifier)
                .copied()
                .unwrap_or(catalog.root.active),
            None => false,
        }
    }
}
