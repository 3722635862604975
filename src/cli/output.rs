//! Output formatting for CLI commands

use super::error::CliError;
use crate::model::{CatalogStatus, LoadSummary};
use crate::models::{ImportedCatalog, ProtocolNode};

/// Output format of an imported catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented protocol tree
    Tree,
    /// Counts only
    Summary,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tree" => Ok(OutputFormat::Tree),
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Unknown output format: {}. Use 'tree', 'summary', 'json' or 'yaml'.",
                s
            )),
        }
    }
}

/// Render an imported catalog
pub fn render_catalog(catalog: &ImportedCatalog, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Tree => Ok(format_tree(catalog)),
        OutputFormat::Summary => Ok(format_summary(&LoadSummary::from_catalog(catalog))),
        OutputFormat::Json => serde_json::to_string_pretty(catalog)
            .map_err(|e| CliError::SerializationError(e.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(catalog).map_err(|e| CliError::SerializationError(e.to_string()))
        }
    }
}

/// Format the protocol tree with one line per protocol and feature
pub fn format_tree(catalog: &ImportedCatalog) -> String {
    let mut out = String::new();
    format_protocol(catalog, &catalog.root, 0, &mut out);
    out
}

fn format_protocol(catalog: &ImportedCatalog, protocol: &ProtocolNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let marker = if protocol.active { "+" } else { "-" };
    out.push_str(&format!(
        "{}{} {} [{}]\n",
        indent, marker, protocol.name, protocol.identifier
    ));

    for child in &protocol.children {
        format_protocol(catalog, child, depth + 1, out);
    }

    for feature in catalog.features_of(protocol) {
        let unit = feature
            .unit
            .as_ref()
            .map(|u| format!(" ({})", u.name))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}  * {} [{}] {}{}\n",
            indent, feature.name, feature.identifier, feature.data_type, unit
        ));
        for category in &feature.categories {
            out.push_str(&format!(
                "{}      {} = {}\n",
                indent, category.value_code, category.name
            ));
        }
    }
}

/// Format a catalog listing, one line per catalog
pub fn format_catalog_list(catalogs: &[CatalogStatus]) -> String {
    catalogs
        .iter()
        .map(|status| {
            let meta = &status.meta;
            let version = meta
                .version
                .as_ref()
                .map(|v| format!(" v{}", v))
                .unwrap_or_default();
            let loaded = if status.loaded { " (loaded)" } else { "" };
            format!("{} [{}]{}{}\n", meta.name, meta.target, version, loaded)
        })
        .collect()
}

/// Format load counts
pub fn format_summary(summary: &LoadSummary) -> String {
    let mut lines = vec![
        format!("Catalog:        {} [{}]", summary.target, summary.root_identifier),
        format!(
            "Protocols:      {} ({} active)",
            summary.protocols, summary.active_protocols
        ),
        format!("Features:       {}", summary.features),
        format!("Categories:     {}", summary.categories),
        format!("Ontology terms: {}", summary.ontology_terms),
        format!("Units:          {}", summary.units),
        format!("Warnings:       {}", summary.warnings),
    ];
    if summary.skipped_features > 0 {
        lines.push(format!("Skipped:        {}", summary.skipped_features));
    }
    lines.join("\n") + "\n"
}
