//! Catalog tree builder
//!
//! Walks a registry catalog document in source order and converts organizers
//! into protocols and observations into features. The role of an organizer
//! depends on its depth in the document:
//!
//! ```text
//! catalog
//! ├── Generic                  generic branch, opaque identifiers
//! │   └── ...
//! └── data source
//!     └── cohort
//!         └── measurement      measurement identifier
//!             └── items        observation identifiers
//! ```
//!
//! All per-run state (ontology cache, feature arena, value sets, warnings)
//! lives in an `ImportContext` created for one call to
//! [`CatalogImporter::import`].

use super::ImportError;
use super::activation::ActivationPropagator;
use super::identifier::{MeasurementId, ObservationId, opaque_identifier};
use super::ontology::OntologyIndex;
use super::value_sets::ValueSetIndex;
use super::value_type::ValueTypeMapper;
use crate::config::ImportConfig;
use crate::models::{
    CatalogTarget, Category, Code, FeatureLeaf, FeatureRef, ImportWarning, ImportedCatalog,
    Observation, ObservationValue, OntologyTerm, Organizer, ProtocolNode, SkippedFeature,
    SourceCatalog, SourceNode, ValueSetTable, WarningKind,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Description key for original text without a language
const UNDETERMINED_LANGUAGE: &str = "und";

/// Per-run conversion state
#[derive(Debug)]
struct ImportContext {
    release: String,
    ontology: OntologyIndex,
    value_sets: ValueSetIndex,
    features: Vec<FeatureLeaf>,
    feature_by_identifier: HashMap<String, FeatureRef>,
    warnings: Vec<ImportWarning>,
    skipped_features: Vec<SkippedFeature>,
    skipped_identifiers: HashSet<String>,
}

impl ImportContext {
    fn new(release: impl Into<String>, value_sets: ValueSetIndex) -> Self {
        Self {
            release: release.into(),
            ontology: OntologyIndex::new(),
            value_sets,
            features: Vec::new(),
            feature_by_identifier: HashMap::new(),
            warnings: Vec::new(),
            skipped_features: Vec::new(),
            skipped_identifiers: HashSet::new(),
        }
    }

    fn feature_ref(&self, identifier: &str) -> Option<FeatureRef> {
        self.feature_by_identifier.get(identifier).copied()
    }

    fn add_feature(&mut self, feature: FeatureLeaf) -> FeatureRef {
        let feature_ref = FeatureRef(self.features.len());
        self.feature_by_identifier
            .insert(feature.identifier.clone(), feature_ref);
        self.features.push(feature);
        feature_ref
    }

    fn warn(&mut self, kind: WarningKind, subject: &str, message: String) {
        warn!("{} [{}]", message, subject);
        self.warnings.push(ImportWarning::new(kind, subject, message));
    }
}

/// Role of the organizer whose components are being converted
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    Catalog,
    Generic,
    DataSource,
    Cohort {
        cohort: &'a Code,
    },
    Item {
        cohort_code: &'a str,
        measurement_code: &'a str,
    },
}

enum Converted {
    Protocol(ProtocolNode),
    Feature(FeatureRef),
    Skipped,
}

/// Catalog importer converting registry documents into protocol trees
#[derive(Debug, Clone, Default)]
pub struct CatalogImporter {
    config: ImportConfig,
}

impl CatalogImporter {
    /// Create a new catalog importer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ImportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Import a catalog document
    ///
    /// # Arguments
    ///
    /// * `target` - Release or study definition the document belongs to
    /// * `source` - Catalog document
    /// * `value_sets` - Value-set table, required when the catalog has coded observations
    ///
    /// # Returns
    ///
    /// The protocol tree under a single root, with activation flags set.
    /// Nothing is returned when any step fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use catalog_import::import::CatalogImporter;
    /// use catalog_import::models::{CatalogTarget, Code, Observation, ObservationValue, Organizer, SourceCatalog};
    ///
    /// let generic = Organizer::new(Code::new("Generic", "2.16.840.1", "Generic"))
    ///     .with_observation(Observation::new(Code::new("AGE", "2.16.840.1", "Age"), ObservationValue::new("INT")));
    /// let source = SourceCatalog::new(Organizer::default().with_organizer(generic));
    ///
    /// let catalog = CatalogImporter::new()
    ///     .import(&CatalogTarget::Release("4".to_string()), &source, None)
    ///     .unwrap();
    /// assert_eq!(catalog.root.identifier, "catalog_4");
    /// assert_eq!(catalog.features.len(), 1);
    /// ```
    pub fn import(
        &self,
        target: &CatalogTarget,
        source: &SourceCatalog,
        value_sets: Option<&ValueSetTable>,
    ) -> Result<ImportedCatalog, ImportError> {
        info!("Importing {}", target);

        let value_sets = value_sets.map(ValueSetIndex::from_table).unwrap_or_default();
        let mut ctx = ImportContext::new(target.release_id(), value_sets);

        let mut root = ProtocolNode::new(target.root_identifier(), &self.config.catalog.root_name);
        root.root = true;
        self.convert_components(&mut ctx, &source.catalog, Scope::Catalog, &mut root)?;

        let summary = ActivationPropagator::propagate(&mut root);
        debug!(
            "Ontology cache for {}: {} ontologies, {} terms, {} units",
            target,
            ctx.ontology.ontologies().len(),
            ctx.ontology.terms().len(),
            ctx.ontology.units().len()
        );

        let ImportContext {
            ontology,
            features,
            mut warnings,
            skipped_features,
            ..
        } = ctx;
        let parts = ontology.into_parts();
        warnings.extend(parts.warnings);

        info!(
            "Imported {}: {} protocols ({} active), {} features, {} ontology terms, {} warnings",
            target,
            summary.total(),
            summary.active,
            features.len(),
            parts.terms.len(),
            warnings.len()
        );

        Ok(ImportedCatalog {
            target: target.clone(),
            root,
            features,
            ontologies: parts.ontologies,
            ontology_terms: parts.terms,
            units: parts.units,
            warnings,
            skipped_features,
            imported_at: Utc::now(),
        })
    }

    fn convert_components<'a>(
        &self,
        ctx: &mut ImportContext,
        organizer: &'a Organizer,
        scope: Scope<'a>,
        protocol: &mut ProtocolNode,
    ) -> Result<(), ImportError> {
        for component in &organizer.components {
            match self.convert(ctx, component.node()?, scope)? {
                Converted::Protocol(child) => protocol.children.push(child),
                Converted::Feature(feature) => protocol.features.push(feature),
                Converted::Skipped => {}
            }
        }
        Ok(())
    }

    fn convert<'a>(
        &self,
        ctx: &mut ImportContext,
        node: SourceNode<'a>,
        scope: Scope<'a>,
    ) -> Result<Converted, ImportError> {
        match node {
            SourceNode::Organizer(organizer) => self
                .convert_organizer(ctx, organizer, scope)
                .map(Converted::Protocol),
            SourceNode::Observation(observation) => {
                self.convert_observation(ctx, observation, scope)
            }
        }
    }

    fn convert_organizer<'a>(
        &self,
        ctx: &mut ImportContext,
        organizer: &'a Organizer,
        scope: Scope<'a>,
    ) -> Result<ProtocolNode, ImportError> {
        let (identifier, child_scope) = self.protocol_identity(ctx, organizer, scope)?;
        let name = display_name(ctx, &organizer.code, &identifier);

        let mut protocol = ProtocolNode::new(identifier, name);
        protocol.description = describe(&organizer.code);
        protocol.ontology_term = translation_term(ctx, &organizer.code, None);
        protocol.unavailable = !organizer.is_available();

        self.convert_components(ctx, organizer, child_scope, &mut protocol)?;

        debug!(
            "Converted protocol [{}] with {} protocols and {} features",
            protocol.identifier,
            protocol.children.len(),
            protocol.features.len()
        );
        Ok(protocol)
    }

    /// Identifier of a protocol and the scope of its components
    fn protocol_identity<'a>(
        &self,
        ctx: &ImportContext,
        organizer: &'a Organizer,
        scope: Scope<'a>,
    ) -> Result<(String, Scope<'a>), ImportError> {
        let explicit = explicit_id(organizer.id.as_deref());
        match scope {
            Scope::Catalog => {
                let child_scope =
                    if organizer.code.code() == Some(self.config.catalog.generic_code.as_str()) {
                        Scope::Generic
                    } else {
                        Scope::DataSource
                    };
                Ok((explicit_or_opaque(explicit), child_scope))
            }
            Scope::Generic => Ok((explicit_or_opaque(explicit), Scope::Generic)),
            Scope::DataSource => Ok((
                explicit_or_opaque(explicit),
                Scope::Cohort {
                    cohort: &organizer.code,
                },
            )),
            Scope::Cohort { cohort } => {
                let (cohort_code, cohort_code_system) = required_coordinates(cohort, "cohort")?;
                let (measurement_code, measurement_code_system) =
                    required_coordinates(&organizer.code, "measurement")?;
                let identifier = match explicit {
                    Some(id) => id.to_string(),
                    None => MeasurementId::encode(
                        &ctx.release,
                        cohort_code_system,
                        cohort_code,
                        measurement_code_system,
                        measurement_code,
                    ),
                };
                Ok((
                    identifier,
                    Scope::Item {
                        cohort_code,
                        measurement_code,
                    },
                ))
            }
            Scope::Item { .. } => Ok((
                item_identifier(ctx, explicit, &organizer.code, scope),
                scope,
            )),
        }
    }

    fn convert_observation(
        &self,
        ctx: &mut ImportContext,
        observation: &Observation,
        scope: Scope<'_>,
    ) -> Result<Converted, ImportError> {
        let identifier = item_identifier(
            ctx,
            explicit_id(observation.id.as_deref()),
            &observation.code,
            scope,
        );
        if let Some(existing) = ctx.feature_ref(&identifier) {
            debug!("Reusing feature [{}]", identifier);
            return Ok(Converted::Feature(existing));
        }
        if ctx.skipped_identifiers.contains(&identifier) {
            return Ok(Converted::Skipped);
        }

        let kind = match ValueTypeMapper::classify(&observation.value.value_type) {
            Ok(kind) => kind,
            Err(e) if self.config.features.skip_unsupported_value_types => {
                ctx.warn(
                    WarningKind::SkippedFeature,
                    &identifier,
                    format!("Skipping feature: {}", e),
                );
                ctx.skipped_identifiers.insert(identifier.clone());
                ctx.skipped_features.push(SkippedFeature {
                    identifier,
                    value_type: observation.value.value_type.clone(),
                });
                return Ok(Converted::Skipped);
            }
            Err(e) => return Err(e),
        };

        let name = display_name(ctx, &observation.code, &identifier);
        let mut feature = FeatureLeaf::new(identifier, name, ValueTypeMapper::data_type(kind));
        feature.description = describe(&observation.code);
        feature.ontology_term = translation_term(ctx, &observation.code, Some(&feature.identifier));

        if ValueTypeMapper::records_unit(kind) {
            feature.unit = match explicit_id(observation.value.unit.as_deref()) {
                Some(unit) => Some(ctx.ontology.get_or_create_unit(unit)),
                None => {
                    ctx.warn(
                        WarningKind::MissingUnit,
                        &feature.identifier,
                        "Physical quantity without unit".to_string(),
                    );
                    None
                }
            };
        }

        if feature.is_categorical() {
            feature.categories = categories(ctx, &observation.value, &feature.identifier)?;
        }

        Ok(Converted::Feature(ctx.add_feature(feature)))
    }
}

fn explicit_id(id: Option<&str>) -> Option<&str> {
    id.map(str::trim).filter(|id| !id.is_empty())
}

fn explicit_or_opaque(explicit: Option<&str>) -> String {
    explicit.map_or_else(opaque_identifier, str::to_string)
}

/// Explicit id, else the observation identifier inside a measurement, else opaque
fn item_identifier(
    ctx: &ImportContext,
    explicit: Option<&str>,
    code: &Code,
    scope: Scope<'_>,
) -> String {
    if let Some(id) = explicit {
        return id.to_string();
    }
    match (scope, code.code()) {
        (
            Scope::Item {
                cohort_code,
                measurement_code,
            },
            Some(code),
        ) => ObservationId::encode(code, cohort_code, measurement_code, &ctx.release),
        _ => opaque_identifier(),
    }
}

fn required_coordinates<'a>(code: &'a Code, role: &str) -> Result<(&'a str, &'a str), ImportError> {
    let label = code.display_name().or(code.code()).unwrap_or("?");
    let value = code.code().ok_or_else(|| {
        ImportError::MissingCodeOrCodeSystem(format!("Expected code for {} [{}]", role, label))
    })?;
    let code_system = code.code_system().ok_or_else(|| {
        ImportError::MissingCodeOrCodeSystem(format!("Expected code system for {} [{}]", role, label))
    })?;
    Ok((value, code_system))
}

/// Display name, falling back to the code, the first translation and the code system name
fn display_name(ctx: &mut ImportContext, code: &Code, subject: &str) -> String {
    if let Some(name) = code.display_name() {
        return name.to_string();
    }
    let fallback = code
        .code()
        .or_else(|| code.translations.first().and_then(Code::display_name))
        .or_else(|| code.code_system_name())
        .unwrap_or(subject)
        .to_string();
    ctx.warn(
        WarningKind::MissingDisplayName,
        subject,
        format!("Missing display name, using [{}]", fallback),
    );
    fallback
}

/// JSON object mapping language to text, from the original text and every translation
fn describe(code: &Code) -> Option<String> {
    let texts = code
        .original_text
        .iter()
        .chain(code.translations.iter().filter_map(|t| t.original_text.as_ref()));

    let mut descriptions = BTreeMap::new();
    for text in texts {
        let language = text
            .language
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(UNDETERMINED_LANGUAGE);
        descriptions.insert(language, text.content.as_str());
    }

    if descriptions.is_empty() {
        return None;
    }
    serde_json::to_string(&descriptions).ok()
}

/// Ontology term of the first translation
///
/// A missing translation is only reported when `feature` is set.
fn translation_term(
    ctx: &mut ImportContext,
    code: &Code,
    feature: Option<&str>,
) -> Option<Arc<OntologyTerm>> {
    match code.translations.first() {
        Some(translation) => ctx.ontology.get_or_create_term(
            translation.code_system(),
            translation.code_system_name(),
            translation.code(),
            translation.display_name(),
        ),
        None => {
            if let Some(feature) = feature {
                ctx.warn(
                    WarningKind::MissingTranslation,
                    feature,
                    "No translation, feature has no ontology term".to_string(),
                );
            }
            None
        }
    }
}

/// Categories of a coded value, in value-set order
fn categories(
    ctx: &ImportContext,
    value: &ObservationValue,
    feature: &str,
) -> Result<Vec<Category>, ImportError> {
    let value_set_name = explicit_id(value.code_system_name.as_deref()).ok_or_else(|| {
        ImportError::MissingCodeOrCodeSystem(format!(
            "Coded value of feature [{}] has no code system name",
            feature
        ))
    })?;
    let value_set = ctx.value_sets.require(value_set_name)?;

    Ok(value_set
        .codes
        .iter()
        .map(|code| Category {
            identifier: opaque_identifier(),
            name: explicit_id(code.display_name.as_deref())
                .unwrap_or(code.code.as_str())
                .to_string(),
            value_code: code.code.clone(),
            feature: feature.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OriginalText;

    fn text(language: Option<&str>, content: &str) -> OriginalText {
        OriginalText {
            language: language.map(str::to_string),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut ctx = ImportContext::new("4", ValueSetIndex::new());

        let named = Code::new("A", "cs", "Alpha");
        assert_eq!(display_name(&mut ctx, &named, "id"), "Alpha");
        assert!(ctx.warnings.is_empty());

        let code_only = Code {
            code: Some("A".to_string()),
            ..Default::default()
        };
        assert_eq!(display_name(&mut ctx, &code_only, "id"), "A");

        let translated = Code {
            translations: vec![Code::new("123", "snomed", "Translated")],
            ..Default::default()
        };
        assert_eq!(display_name(&mut ctx, &translated, "id"), "Translated");

        let system_name = Code {
            code_system_name: Some("LOINC".to_string()),
            ..Default::default()
        };
        assert_eq!(display_name(&mut ctx, &system_name, "id"), "LOINC");

        assert_eq!(display_name(&mut ctx, &Code::default(), "id"), "id");
        assert_eq!(ctx.warnings.len(), 4);
        assert!(
            ctx.warnings
                .iter()
                .all(|w| w.kind == WarningKind::MissingDisplayName)
        );
    }

    #[test]
    fn test_describe_collects_languages() {
        let mut code = Code::new("A", "cs", "Alpha");
        assert_eq!(describe(&code), None);

        code.original_text = Some(text(Some("nl"), "Leeftijd"));
        let mut translation = Code::new("B", "cs2", "Beta");
        translation.original_text = Some(text(Some("en"), "Age"));
        code.translations.push(translation);
        code.translations.push(Code::new("C", "cs3", "Gamma"));

        assert_eq!(
            describe(&code).unwrap(),
            r#"{"en":"Age","nl":"Leeftijd"}"#
        );
    }

    #[test]
    fn test_describe_without_language() {
        let code = Code {
            original_text: Some(text(None, "Free text")),
            ..Default::default()
        };
        assert_eq!(describe(&code).unwrap(), r#"{"und":"Free text"}"#);
    }

    #[test]
    fn test_required_coordinates() {
        let code = Code::new("1", "2.16.840.1", "Cohort");
        assert_eq!(required_coordinates(&code, "cohort").unwrap(), ("1", "2.16.840.1"));

        let missing = Code {
            code: Some("1".to_string()),
            display_name: Some("Cohort".to_string()),
            ..Default::default()
        };
        let err = required_coordinates(&missing, "cohort").unwrap_err();
        assert_eq!(
            err,
            ImportError::MissingCodeOrCodeSystem(
                "Expected code system for cohort [Cohort]".to_string()
            )
        );
    }

    #[test]
    fn test_item_identifier() {
        let ctx = ImportContext::new("4", ValueSetIndex::new());
        let scope = Scope::Item {
            cohort_code: "5",
            measurement_code: "7",
        };
        let code = Code::new("UVFOODBB15", "cs", "Food");

        assert_eq!(
            item_identifier(&ctx, None, &code, scope),
            "UVFOODBB15.5.7.4"
        );
        assert_eq!(item_identifier(&ctx, Some("explicit"), &code, scope), "explicit");
        assert_ne!(
            item_identifier(&ctx, None, &Code::default(), scope),
            item_identifier(&ctx, None, &Code::default(), scope)
        );
        assert_ne!(
            item_identifier(&ctx, None, &code, Scope::Generic),
            "UVFOODBB15.5.7.4"
        );
    }

    #[test]
    fn test_explicit_id_ignores_blank() {
        assert_eq!(explicit_id(Some("  ")), None);
        assert_eq!(explicit_id(Some(" x ")), Some("x"));
        assert_eq!(explicit_id(None), None);
    }
}
