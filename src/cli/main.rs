//! CLI binary entry point for catalog-import

use anyhow::Context;
use catalog_import::cli::commands::decode::{DecodeArgs, IdentifierKind, handle_decode};
use catalog_import::cli::commands::import::{ImportArgs, InputSource, handle_import};
use catalog_import::cli::commands::load::{LoadArgs, handle_list, handle_load};
use catalog_import::cli::commands::parse_target;
use catalog_import::cli::output::{OutputFormat, format_catalog_list, format_summary};
use catalog_import::config::{ImportConfig, sample_config};
use catalog_import::models::DocumentFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-import")]
#[command(about = "Convert clinical registry catalogs into protocol trees")]
#[command(version)]
struct Cli {
    /// Directory holding .catalog-import.toml
    #[arg(short, long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a catalog document
    Import {
        /// Catalog document (file path or '-' for stdin)
        input: String,
        /// Catalog release id
        #[arg(short, long, conflicts_with = "study_definition")]
        release: Option<String>,
        /// Study definition id
        #[arg(short, long)]
        study_definition: Option<String>,
        /// Value-set table file
        #[arg(long)]
        value_sets: Option<PathBuf>,
        /// Input format (json, yaml), detected from the extension by default
        #[arg(long)]
        input_format: Option<DocumentFormat>,
        /// Output format (tree, summary, json, yaml)
        #[arg(short, long, default_value = "tree")]
        format: OutputFormat,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip observations with unsupported value types
        #[arg(long)]
        skip_unsupported: bool,
    },

    /// Load a catalog from a directory of documents and print its counts
    ///
    /// The store only lives for this command; use --output to keep the result.
    Load {
        /// Directory holding {key}.catalog.* and {key}.valuesets.*
        dir: PathBuf,
        /// Catalog release id
        #[arg(short, long, conflicts_with = "study_definition")]
        release: Option<String>,
        /// Study definition id
        #[arg(short, long)]
        study_definition: Option<String>,
        /// Write the loaded catalog as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the catalogs in a directory of documents
    List {
        /// Directory holding {key}.catalog.* documents
        dir: PathBuf,
    },

    /// Decode a composite identifier
    Decode {
        #[arg(value_enum)]
        kind: IdentifierKindArg,
        identifier: String,
    },

    /// Show the effective configuration
    Config {
        /// Print a commented sample configuration instead
        #[arg(long)]
        sample: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum IdentifierKindArg {
    Measurement,
    Observation,
    Catalog,
    StudyDefinition,
}

impl From<IdentifierKindArg> for IdentifierKind {
    fn from(kind: IdentifierKindArg) -> Self {
        match kind {
            IdentifierKindArg::Measurement => IdentifierKind::Measurement,
            IdentifierKindArg::Observation => IdentifierKind::Observation,
            IdentifierKindArg::Catalog => IdentifierKind::Catalog,
            IdentifierKindArg::StudyDefinition => IdentifierKind::StudyDefinition,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(dir: &Path) -> anyhow::Result<ImportConfig> {
    ImportConfig::load(dir)
        .with_context(|| format!("Failed to load configuration from {}", dir.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Import {
            input,
            release,
            study_definition,
            value_sets,
            input_format,
            format,
            output,
            skip_unsupported,
        } => {
            let mut config = load_config(&cli.config_dir)?;
            if skip_unsupported {
                config.features.skip_unsupported_value_types = true;
            }
            let args = ImportArgs {
                target: parse_target(release, study_definition)?,
                input: InputSource::parse(&input),
                format: input_format,
                value_sets,
                config,
                output_format: format,
                output,
            };
            handle_import(&args)?;
        }
        Commands::Load {
            dir,
            release,
            study_definition,
            output,
        } => {
            let args = LoadArgs {
                target: parse_target(release, study_definition)?,
                dir,
                config: load_config(&cli.config_dir)?,
                output,
            };
            let summary = handle_load(&args)?;
            print!("{}", format_summary(&summary));
        }
        Commands::List { dir } => {
            let catalogs = handle_list(&dir)?;
            print!("{}", format_catalog_list(&catalogs));
        }
        Commands::Decode { kind, identifier } => {
            let decoded = handle_decode(&DecodeArgs {
                kind: kind.into(),
                identifier,
            })?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        Commands::Config { sample } => {
            if sample {
                print!("{}", sample_config());
            } else {
                let config = load_config(&cli.config_dir)?;
                print!("{}", config.to_toml()?);
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
