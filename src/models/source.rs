//! Source catalog document model
//!
//! Read-only mirror of the registry's catalog document: a tree of organizers
//! and observations, each carrying a coded descriptor. Documents are
//! deserialized from JSON or YAML; the registry's XML binding lives outside
//! this crate.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::import::ImportError;

/// Coded descriptor attached to every organizer, observation and translation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Free-text description in a single language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<OriginalText>,
    /// Equivalent codes in other vocabularies, in document order
    #[serde(default, alias = "translation", skip_serializing_if = "Vec::is_empty")]
    pub translations: Vec<Code>,
}

impl Code {
    /// Create a descriptor with a code, code system and display name
    pub fn new(
        code: impl Into<String>,
        code_system: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            code: Some(code.into()),
            code_system: Some(code_system.into()),
            display_name: Some(display_name.into()),
            ..Default::default()
        }
    }

    /// Code value, ignoring empty strings
    pub fn code(&self) -> Option<&str> {
        non_empty(self.code.as_deref())
    }

    /// Code system, ignoring empty strings
    pub fn code_system(&self) -> Option<&str> {
        non_empty(self.code_system.as_deref())
    }

    /// Code system name, ignoring empty strings
    pub fn code_system_name(&self) -> Option<&str> {
        non_empty(self.code_system_name.as_deref())
    }

    /// Display name, ignoring empty strings
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.display_name.as_deref())
    }
}

/// Original text of a code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginalText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub content: String,
}

/// Interval marking a group as unavailable in the registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<String>,
}

/// Grouping node: a cohort, a measurement instrument or a category folder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    /// Explicit identifier supplied by the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Code,
    #[serde(default, alias = "component", skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    /// Set by the registry when the group is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<EffectiveTime>,
}

impl Organizer {
    pub fn new(code: Code) -> Self {
        Self {
            code,
            ..Default::default()
        }
    }

    /// Append a child organizer
    pub fn with_organizer(mut self, organizer: Organizer) -> Self {
        self.components.push(Component::organizer(organizer));
        self
    }

    /// Append a child observation
    pub fn with_observation(mut self, observation: Observation) -> Self {
        self.components.push(Component::observation(observation));
        self
    }

    /// Mark the organizer unavailable
    pub fn unavailable(mut self) -> Self {
        self.effective_time = Some(EffectiveTime::default());
        self
    }

    pub fn is_available(&self) -> bool {
        self.effective_time.is_none()
    }
}

/// Leaf node describing one observable data item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Explicit identifier supplied by the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Code,
    pub value: ObservationValue,
}

impl Observation {
    pub fn new(code: Code, value: ObservationValue) -> Self {
        Self {
            id: None,
            code,
            value,
        }
    }

    /// Set the explicit identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Typed value template of an observation
///
/// `value_type` holds the variant tag exactly as the registry sends it
/// (e.g. `"CD"`, `"PQ"`). Classification happens in
/// [`ValueTypeMapper`](crate::import::value_type::ValueTypeMapper) so that
/// unknown tags surface as import errors instead of parse failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationValue {
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    /// Name of the value set holding the allowed codes (coded values only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Unit of a physical quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ObservationValue {
    pub fn new(value_type: impl Into<String>) -> Self {
        Self {
            value_type: value_type.into(),
            ..Default::default()
        }
    }

    /// Coded value drawing its categories from the named value set
    pub fn coded(value_set: impl Into<String>) -> Self {
        Self {
            value_type: "CD".to_string(),
            code_system_name: Some(value_set.into()),
            ..Default::default()
        }
    }

    /// Physical quantity measured in `unit`
    pub fn quantity(unit: impl Into<String>) -> Self {
        Self {
            value_type: "PQ".to_string(),
            unit: Some(unit.into()),
            ..Default::default()
        }
    }
}

/// Child slot of an organizer
///
/// Holds exactly one organizer or one observation in a well-formed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Organizer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<Observation>,
}

impl Component {
    pub fn organizer(organizer: Organizer) -> Self {
        Self {
            organizer: Some(organizer),
            observation: None,
        }
    }

    pub fn observation(observation: Observation) -> Self {
        Self {
            organizer: None,
            observation: Some(observation),
        }
    }

    /// Resolve the component to its node
    ///
    /// A component holding neither or both variants is unknown clinical
    /// content and is rejected.
    pub fn node(&self) -> Result<SourceNode<'_>, ImportError> {
        match (&self.organizer, &self.observation) {
            (Some(organizer), None) => Ok(SourceNode::Organizer(organizer)),
            (None, Some(observation)) => Ok(SourceNode::Observation(observation)),
            (None, None) => Err(ImportError::MissingCodeOrCodeSystem(
                "component holds neither an organizer nor an observation".to_string(),
            )),
            (Some(organizer), Some(_)) => Err(ImportError::MissingCodeOrCodeSystem(format!(
                "component under [{}] holds both an organizer and an observation",
                organizer.code.code().unwrap_or("?")
            ))),
        }
    }
}

/// Borrowed view of a source tree node
#[derive(Debug, Clone, Copy)]
pub enum SourceNode<'a> {
    Organizer(&'a Organizer),
    Observation(&'a Observation),
}

/// Descriptive block of a catalog release document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, alias = "author", skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

/// Catalog document as returned by the registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<DocumentMeta>,
    /// Top-level organizer whose components form the catalog forest
    pub catalog: Organizer,
}

impl SourceCatalog {
    pub fn new(catalog: Organizer) -> Self {
        Self {
            meta: None,
            catalog,
        }
    }

    /// Attach the descriptive block
    pub fn with_meta(mut self, meta: DocumentMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Parse a catalog document from JSON
    pub fn from_json(content: &str) -> Result<Self, ImportError> {
        serde_json::from_str(content)
            .map_err(|e| ImportError::ParseError(format!("Failed to parse catalog JSON: {}", e)))
    }

    /// Parse a catalog document from YAML
    pub fn from_yaml(content: &str) -> Result<Self, ImportError> {
        serde_yaml::from_str(content)
            .map_err(|e| ImportError::ParseError(format!("Failed to parse catalog YAML: {}", e)))
    }

    /// Parse a catalog document in the given format
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, ImportError> {
        match format {
            DocumentFormat::Json => Self::from_json(content),
            DocumentFormat::Yaml => Self::from_yaml(content),
        }
    }
}

/// One allowed code of a value set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetCode {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ValueSetCode {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: Some(display_name.into()),
            ..Default::default()
        }
    }
}

/// Named, ordered list of allowed codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueSet {
    pub name: String,
    #[serde(default, alias = "code")]
    pub codes: Vec<ValueSetCode>,
}

impl ValueSet {
    pub fn new(name: impl Into<String>, codes: Vec<ValueSetCode>) -> Self {
        Self {
            name: name.into(),
            codes,
        }
    }
}

/// Flat value-set table retrieved alongside a catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetTable {
    #[serde(default, alias = "valueSet")]
    pub value_sets: Vec<ValueSet>,
}

impl ValueSetTable {
    pub fn new(value_sets: Vec<ValueSet>) -> Self {
        Self { value_sets }
    }

    /// Parse a value-set table in the given format
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, ImportError> {
        match format {
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| {
                ImportError::ParseError(format!("Failed to parse value sets JSON: {}", e))
            }),
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| {
                ImportError::ParseError(format!("Failed to parse value sets YAML: {}", e))
            }),
        }
    }
}

/// Serialization format of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            _ => Err(format!("Unknown document format: {}. Use 'json' or 'yaml'.", s)),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
