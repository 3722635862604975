//! Load and list command handlers
//!
//! Both go through the [`CatalogLoader`], the same path a service embedding
//! the engine uses. The CLI store lives for one command, so `load` reports
//! counts and optionally writes the stored catalog out.

use crate::cli::error::CliError;
use crate::config::ImportConfig;
use crate::model::{
    CatalogLoader, CatalogStatus, FileCatalogProvider, LoadSummary, MemoryCatalogStore,
};
use crate::models::CatalogTarget;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the load command
#[derive(Debug, Clone)]
pub struct LoadArgs {
    pub target: CatalogTarget,
    pub dir: PathBuf,
    pub config: ImportConfig,
    /// Write the loaded catalog as JSON here
    pub output: Option<PathBuf>,
}

fn loader(
    dir: &Path,
    config: ImportConfig,
) -> Result<CatalogLoader<FileCatalogProvider, MemoryCatalogStore>, CliError> {
    if !dir.is_dir() {
        return Err(CliError::FileNotFound(dir.to_path_buf()));
    }
    Ok(CatalogLoader::with_config(
        FileCatalogProvider::new(dir),
        MemoryCatalogStore::new(),
        config,
    ))
}

/// Load a catalog from a directory and return its summary
pub fn handle_load(args: &LoadArgs) -> Result<LoadSummary, CliError> {
    let mut loader = loader(&args.dir, args.config.clone())?;
    let summary = loader.load(&args.target)?;

    if let Some(path) = &args.output {
        let catalog = loader.store().get(&summary.root_identifier).ok_or_else(|| {
            CliError::InvalidArgument(format!("{} was not stored", summary.root_identifier))
        })?;
        let json = serde_json::to_string_pretty(catalog)
            .map_err(|e| CliError::SerializationError(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
        info!("Wrote {} to {}", summary.target, path.display());
    }

    Ok(summary)
}

/// List the catalogs available in a directory
pub fn handle_list(dir: &Path) -> Result<Vec<CatalogStatus>, CliError> {
    Ok(loader(dir, ImportConfig::default())?.list()?)
}
