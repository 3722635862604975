//! Catalog loader
//!
//! Orchestrates one import: fetch, convert, propagate activation and hand
//! the result to the store. An import either stores a complete tree or
//! leaves the store untouched.

use super::provider::CatalogProvider;
use super::store::CatalogStore;
use super::LoaderError;
use crate::config::ImportConfig;
use crate::import::CatalogImporter;
use crate::models::{CatalogMeta, CatalogTarget, ImportedCatalog};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Counts describing a loaded catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub target: CatalogTarget,
    pub root_identifier: String,
    pub protocols: usize,
    pub active_protocols: usize,
    pub features: usize,
    pub categories: usize,
    pub ontology_terms: usize,
    pub units: usize,
    pub warnings: usize,
    pub skipped_features: usize,
}

impl LoadSummary {
    pub fn from_catalog(catalog: &ImportedCatalog) -> Self {
        Self {
            target: catalog.target.clone(),
            root_identifier: catalog.root.identifier.clone(),
            protocols: catalog.protocol_count(),
            active_protocols: catalog.root.iter().filter(|p| p.active).count(),
            features: catalog.features.len(),
            categories: catalog.category_count(),
            ontology_terms: catalog.ontology_terms.len(),
            units: catalog.units.len(),
            warnings: catalog.warnings.len(),
            skipped_features: catalog.skipped_features.len(),
        }
    }
}

/// Listed catalog together with its load state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatus {
    #[serde(flatten)]
    pub meta: CatalogMeta,
    pub loaded: bool,
}

/// Catalog loader over a provider and a store
pub struct CatalogLoader<P: CatalogProvider, S: CatalogStore> {
    provider: P,
    store: S,
    importer: CatalogImporter,
}

impl<P: CatalogProvider, S: CatalogStore> CatalogLoader<P, S> {
    pub fn new(provider: P, store: S) -> Self {
        Self {
            provider,
            store,
            importer: CatalogImporter::new(),
        }
    }

    pub fn with_config(provider: P, store: S, config: ImportConfig) -> Self {
        Self {
            provider,
            store,
            importer: CatalogImporter::with_config(config),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Import a catalog and store it
    ///
    /// Refuses to import a catalog that is already loaded; unload it first.
    pub fn load(&mut self, target: &CatalogTarget) -> Result<LoadSummary, LoaderError> {
        let root_identifier = target.root_identifier();
        if self.store.is_loaded(&root_identifier) {
            warn!("{} is already loaded as [{}]", target, root_identifier);
            return Err(LoaderError::AlreadyLoaded(root_identifier));
        }

        let value_sets = self.provider.fetch_value_sets(target)?;
        let source = self.provider.fetch_catalog(target)?;
        let catalog = self.importer.import(target, &source, value_sets.as_ref())?;

        let summary = LoadSummary::from_catalog(&catalog);
        self.store.store(catalog)?;

        info!(
            "Loaded {} as [{}] ({} protocols, {} features)",
            target, summary.root_identifier, summary.protocols, summary.features
        );
        Ok(summary)
    }

    pub fn is_loaded(&self, target: &CatalogTarget) -> bool {
        self.store.is_loaded(&target.root_identifier())
    }

    /// List the provider's catalogs, flagging those already in the store
    pub fn list(&self) -> Result<Vec<CatalogStatus>, LoaderError> {
        let catalogs = self.provider.list_catalogs()?;
        debug!("Provider lists {} catalogs", catalogs.len());
        Ok(catalogs
            .into_iter()
            .map(|meta| CatalogStatus {
                loaded: self.is_loaded(&meta.target),
                meta,
            })
            .collect())
    }

    /// Remove a loaded catalog
    pub fn unload(&mut self, target: &CatalogTarget) -> Result<(), LoaderError> {
        let root_identifier = target.root_identifier();
        self.store.remove(&root_identifier)?;
        info!("Unloaded {} [{}]", target, root_identifier);
        Ok(())
    }

    pub fn activate(&mut self, target: &CatalogTarget) -> Result<(), LoaderError> {
        self.set_active(target, true)
    }

    pub fn deactivate(&mut self, target: &CatalogTarget) -> Result<(), LoaderError> {
        self.set_active(target, false)
    }

    /// Whether the catalog is loaded and its root is active
    pub fn is_activated(&self, target: &CatalogTarget) -> bool {
        self.store.is_active(&target.root_identifier())
    }

    fn set_active(&mut self, target: &CatalogTarget, active: bool) -> Result<(), LoaderError> {
        self.store.set_active(&target.root_identifier(), active)?;
        info!(
            "{} {}",
            if active { "Activated" } else { "Deactivated" },
            target
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemoryCatalogStore;
    use crate::models::{Code, Observation, ObservationValue, Organizer, SourceCatalog, ValueSetTable};

    struct StaticProvider {
        catalog: SourceCatalog,
    }

    impl CatalogProvider for StaticProvider {
        fn list_catalogs(&self) -> Result<Vec<CatalogMeta>, LoaderError> {
            Ok(vec![
                CatalogMeta::new(CatalogTarget::Release("4".to_string()), "Release 4"),
                CatalogMeta::new(CatalogTarget::Release("5".to_string()), "Release 5"),
            ])
        }

        fn fetch_catalog(&self, _target: &CatalogTarget) -> Result<SourceCatalog, LoaderError> {
            Ok(self.catalog.clone())
        }

        fn fetch_value_sets(
            &self,
            _target: &CatalogTarget,
        ) -> Result<Option<ValueSetTable>, LoaderError> {
            Ok(None)
        }
    }

    fn loader() -> CatalogLoader<StaticProvider, MemoryCatalogStore> {
        let generic = Organizer::new(Code::new("Generic", "cs", "Generic")).with_observation(
            Observation::new(Code::new("AGE", "cs", "Age"), ObservationValue::new("INT")),
        );
        let provider = StaticProvider {
            catalog: SourceCatalog::new(Organizer::default().with_organizer(generic)),
        };
        CatalogLoader::new(provider, MemoryCatalogStore::new())
    }

    #[test]
    fn test_load_lifecycle() {
        let mut loader = loader();
        let target = CatalogTarget::Release("4".to_string());

        assert!(!loader.is_loaded(&target));
        let summary = loader.load(&target).unwrap();
        assert_eq!(summary.root_identifier, "catalog_4");
        assert_eq!(summary.protocols, 2);
        assert_eq!(summary.features, 1);
        assert!(loader.is_loaded(&target));
        assert!(loader.is_activated(&target));

        assert!(matches!(
            loader.load(&target),
            Err(LoaderError::AlreadyLoaded(id)) if id == "catalog_4"
        ));

        loader.deactivate(&target).unwrap();
        assert!(!loader.is_activated(&target));
        assert!(loader.store().get("catalog_4").unwrap().root.active);
        loader.activate(&target).unwrap();
        assert!(loader.is_activated(&target));

        loader.unload(&target).unwrap();
        assert!(!loader.is_loaded(&target));
        assert!(!loader.is_activated(&target));
        assert!(matches!(
            loader.unload(&target),
            Err(LoaderError::UnknownCatalog(_))
        ));
    }

    #[test]
    fn test_release_and_study_definition_are_separate() {
        let mut loader = loader();
        loader.load(&CatalogTarget::Release("4".to_string())).unwrap();
        loader
            .load(&CatalogTarget::StudyDefinition("4".to_string()))
            .unwrap();
        assert_eq!(loader.store().len(), 2);
    }

    #[test]
    fn test_list_flags_loaded_catalogs() {
        let mut loader = loader();
        loader.load(&CatalogTarget::Release("5".to_string())).unwrap();

        let listed = loader.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].meta.name, "Release 4");
        assert!(!listed[0].loaded);
        assert_eq!(listed[1].meta.name, "Release 5");
        assert!(listed[1].loaded);
    }

    #[test]
    fn test_activate_unknown_catalog() {
        let mut loader = loader();
        assert!(matches!(
            loader.activate(&CatalogTarget::Release("1".to_string())),
            Err(LoaderError::UnknownCatalog(_))
        ));
    }
}
