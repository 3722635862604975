//! Catalog document providers

use super::LoaderError;
use crate::import::ImportError;
use crate::models::{CatalogMeta, CatalogTarget, DocumentFormat, SourceCatalog, ValueSetTable};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source of catalog documents and their value-set tables
pub trait CatalogProvider {
    /// List the catalogs this provider can fetch
    fn list_catalogs(&self) -> Result<Vec<CatalogMeta>, LoaderError>;

    /// Fetch the full catalog document
    fn fetch_catalog(&self, target: &CatalogTarget) -> Result<SourceCatalog, LoaderError>;

    /// Fetch the value-set table, `None` when the catalog has none
    fn fetch_value_sets(&self, target: &CatalogTarget)
    -> Result<Option<ValueSetTable>, LoaderError>;
}

const CATALOG_SUFFIX: &str = "catalog";
const VALUE_SETS_SUFFIX: &str = "valuesets";
const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Provider reading catalog documents from a directory
#[derive(Debug, Clone)]
pub struct FileCatalogProvider {
    dir: PathBuf,
}

impl FileCatalogProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the catalog document for a target, if present
    pub fn catalog_path(&self, target: &CatalogTarget) -> Option<PathBuf> {
        self.find(target, CATALOG_SUFFIX)
    }

    /// Path of the value-set table for a target, if present
    pub fn value_sets_path(&self, target: &CatalogTarget) -> Option<PathBuf> {
        self.find(target, VALUE_SETS_SUFFIX)
    }

    /// Keys of every `{key}.catalog.{ext}` document in the directory, sorted
    pub fn catalog_keys(&self) -> Result<BTreeSet<String>, LoaderError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            LoaderError::ProviderError(format!("Failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut keys = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoaderError::ProviderError(e.to_string()))?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let key = EXTENSIONS.iter().find_map(|ext| {
                file_name
                    .strip_suffix(ext)?
                    .strip_suffix('.')?
                    .strip_suffix(CATALOG_SUFFIX)?
                    .strip_suffix('.')
            });
            if let Some(key) = key.filter(|key| !key.is_empty()) {
                keys.insert(key.to_string());
            }
        }
        Ok(keys)
    }

    fn find(&self, target: &CatalogTarget, suffix: &str) -> Option<PathBuf> {
        let key = target.key();
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}.{}", key, suffix, ext)))
            .find(|path| path.is_file())
    }
}

/// Read a document and detect its format from the extension
pub fn read_document(path: &Path) -> Result<(String, DocumentFormat), ImportError> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        ImportError::ParseError(format!("Unknown document format: {}", path.display()))
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        ImportError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok((content, format))
}

impl CatalogProvider for FileCatalogProvider {
    fn list_catalogs(&self) -> Result<Vec<CatalogMeta>, LoaderError> {
        let mut catalogs = Vec::new();
        for key in self.catalog_keys()? {
            let target = CatalogTarget::from_key(&key);
            let source = self.fetch_catalog(&target)?;
            catalogs.push(CatalogMeta::from_document(target, source.meta));
        }
        debug!("Found {} catalogs in {}", catalogs.len(), self.dir.display());
        Ok(catalogs)
    }

    fn fetch_catalog(&self, target: &CatalogTarget) -> Result<SourceCatalog, LoaderError> {
        let path = self
            .catalog_path(target)
            .ok_or_else(|| LoaderError::UnknownCatalog(target.to_string()))?;
        info!("Reading catalog from {}", path.display());

        let (content, format) = read_document(&path)?;
        Ok(SourceCatalog::parse(&content, format)?)
    }

    fn fetch_value_sets(
        &self,
        target: &CatalogTarget,
    ) -> Result<Option<ValueSetTable>, LoaderError> {
        let Some(path) = self.value_sets_path(target) else {
            debug!("No value sets for {} in {}", target, self.dir.display());
            return Ok(None);
        };
        info!("Reading value sets from {}", path.display());

        let (content, format) = read_document(&path)?;
        Ok(Some(ValueSetTable::parse(&content, format)?))
    }
}
