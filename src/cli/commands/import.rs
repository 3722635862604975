//! Import command handler

use crate::cli::error::CliError;
use crate::cli::output::{OutputFormat, render_catalog};
use crate::config::ImportConfig;
use crate::import::CatalogImporter;
use crate::models::{CatalogTarget, DocumentFormat, ImportedCatalog, SourceCatalog, ValueSetTable};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

/// Input source for import operations
#[derive(Debug, Clone)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
    String(String),
}

impl InputSource {
    /// `-` reads from stdin, anything else is a file path
    pub fn parse(input: &str) -> Self {
        if input == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(input))
        }
    }

    fn path(&self) -> Option<&Path> {
        match self {
            InputSource::File(path) => Some(path),
            _ => None,
        }
    }
}

/// Arguments for the import command
#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub target: CatalogTarget,
    pub input: InputSource,
    /// Document format, detected from the file extension when absent
    pub format: Option<DocumentFormat>,
    pub value_sets: Option<PathBuf>,
    pub config: ImportConfig,
    pub output_format: OutputFormat,
    /// Write the rendered catalog here instead of stdout
    pub output: Option<PathBuf>,
}

/// Load input content from InputSource
pub fn load_input(input: &InputSource) -> Result<String, CliError> {
    match input {
        InputSource::File(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.clone()));
            }
            std::fs::read_to_string(path)
                .map_err(|e| CliError::FileReadError(path.clone(), e.to_string()))
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
            Ok(buffer)
        }
        InputSource::String(content) => Ok(content.clone()),
    }
}

fn document_format(explicit: Option<DocumentFormat>, path: Option<&Path>) -> DocumentFormat {
    explicit
        .or_else(|| path.and_then(DocumentFormat::from_path))
        .unwrap_or(DocumentFormat::Json)
}

/// Read a value-set table file
pub fn load_value_sets(path: &Path) -> Result<ValueSetTable, CliError> {
    let content = load_input(&InputSource::File(path.to_path_buf()))?;
    let format = document_format(None, Some(path));
    Ok(ValueSetTable::parse(&content, format)?)
}

/// Import a catalog document and write the rendered result
pub fn handle_import(args: &ImportArgs) -> Result<ImportedCatalog, CliError> {
    let content = load_input(&args.input)?;
    let format = document_format(args.format, args.input.path());
    let source = SourceCatalog::parse(&content, format)?;

    let value_sets = args
        .value_sets
        .as_deref()
        .map(load_value_sets)
        .transpose()?;

    let importer = CatalogImporter::with_config(args.config.clone());
    let catalog = importer.import(&args.target, &source, value_sets.as_ref())?;

    let rendered = render_catalog(&catalog, args.output_format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
            info!("Wrote {} to {}", catalog.target, path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(catalog)
}
