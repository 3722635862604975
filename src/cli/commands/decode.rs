//! Decode command handler

use crate::cli::error::CliError;
use crate::import::{CatalogId, MeasurementId, ObservationId};
use serde::Serialize;

/// Composite identifier kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Measurement,
    Observation,
    Catalog,
    StudyDefinition,
}

/// Arguments for the decode command
#[derive(Debug, Clone)]
pub struct DecodeArgs {
    pub kind: IdentifierKind,
    pub identifier: String,
}

/// Fields recovered from a composite identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoded {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_code_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_definition_id: Option<String>,
}

impl Decoded {
    fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            measurement_code: None,
            measurement_code_system: None,
            observation_code: None,
            release_id: None,
            study_definition_id: None,
        }
    }
}

/// Decode a composite identifier
pub fn handle_decode(args: &DecodeArgs) -> Result<Decoded, CliError> {
    let id = args.identifier.as_str();
    let mut decoded = Decoded::new(id);
    match args.kind {
        IdentifierKind::Measurement => {
            decoded.measurement_code = Some(MeasurementId::measurement_code(id)?.to_string());
            decoded.measurement_code_system =
                Some(MeasurementId::measurement_code_system(id)?.to_string());
        }
        IdentifierKind::Observation => {
            decoded.observation_code = Some(ObservationId::observation_code(id)?.to_string());
        }
        IdentifierKind::Catalog => {
            decoded.release_id = Some(CatalogId::release_id(id)?.to_string());
        }
        IdentifierKind::StudyDefinition => {
            decoded.study_definition_id = Some(CatalogId::study_definition_id(id)?.to_string());
        }
    }
    Ok(decoded)
}
