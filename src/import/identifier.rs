//! Composite identifier codec
//!
//! Converted entities are named from their source coordinates so that
//! reimports produce the same identifiers. The formats are a wire-level
//! contract with previously stored identifiers and with data-loading code
//! that recovers codes from them.
//!
//! Both composite formats are lossy: decoding recovers only the trailing
//! coordinates.
//!
//! - Measurement: `{release}:{cohortCodeSystem}_{cohortCode}/{measurementCodeSystem}_{measurementCode}`
//! - Observation: `{observationCode}.{cohortCode}.{measurementCode}.{catalogVersion}`
//! - Catalog root: `catalog_{releaseId}` or `catalog_studydefinition_{studyDefinitionId}`

use super::ImportError;
use uuid::Uuid;

const CODESYSTEM_CODE_SEPARATOR: char = '_';
const COHORT_MEASUREMENT_SEPARATOR: char = '/';
const RELEASE_COHORT_SEPARATOR: char = ':';
const OBSERVATION_SEPARATOR: char = '.';

/// Number of trailing observation identifier segments (cohort, measurement, version)
const OBSERVATION_TRAILING_SEGMENTS: usize = 3;

pub const CATALOG_PREFIX: &str = "catalog_";
pub const STUDY_DEFINITION_CATALOG_PREFIX: &str = "catalog_studydefinition_";

/// Measurement protocol identifier codec
///
/// # Example
///
/// ```rust
/// use catalog_import::import::identifier::MeasurementId;
///
/// let id = MeasurementId::encode("4", "2.16.840.1.113883.2.4.3.8.1000.54.5.2", "1",
///     "2.16.840.1.113883.2.4.3.8.1000.54.5.6", "11");
/// assert_eq!(MeasurementId::measurement_code(&id).unwrap(), "11");
/// ```
pub struct MeasurementId;

impl MeasurementId {
    /// Encode a measurement identifier
    pub fn encode(
        catalog_release_id: &str,
        cohort_code_system: &str,
        cohort_code: &str,
        measurement_code_system: &str,
        measurement_code: &str,
    ) -> String {
        let mut id = String::with_capacity(
            catalog_release_id.len()
                + cohort_code_system.len()
                + cohort_code.len()
                + measurement_code_system.len()
                + measurement_code.len()
                + 4,
        );
        id.push_str(catalog_release_id);
        id.push(RELEASE_COHORT_SEPARATOR);
        id.push_str(cohort_code_system);
        id.push(CODESYSTEM_CODE_SEPARATOR);
        id.push_str(cohort_code);
        id.push(COHORT_MEASUREMENT_SEPARATOR);
        id.push_str(measurement_code_system);
        id.push(CODESYSTEM_CODE_SEPARATOR);
        id.push_str(measurement_code);
        id
    }

    /// Recover the measurement code (text after the rightmost `_`)
    pub fn measurement_code(id: &str) -> Result<&str, ImportError> {
        let (_, code_idx) = Self::separators(id)?;
        Ok(&id[code_idx + 1..])
    }

    /// Recover the measurement code system (text between the rightmost `/` and the rightmost `_`)
    pub fn measurement_code_system(id: &str) -> Result<&str, ImportError> {
        let (measurement_idx, code_idx) = Self::separators(id)?;
        if code_idx < measurement_idx {
            return Err(invalid(id));
        }
        Ok(&id[measurement_idx + 1..code_idx])
    }

    fn separators(id: &str) -> Result<(usize, usize), ImportError> {
        bounded(id, &[COHORT_MEASUREMENT_SEPARATOR, CODESYSTEM_CODE_SEPARATOR])?;
        let measurement_idx = interior(id, id.rfind(COHORT_MEASUREMENT_SEPARATOR))?;
        let code_idx = interior(id, id.rfind(CODESYSTEM_CODE_SEPARATOR))?;
        Ok((measurement_idx, code_idx))
    }
}

/// Observation protocol and feature identifier codec
///
/// # Example
///
/// ```rust
/// use catalog_import::import::identifier::ObservationId;
///
/// let code = ObservationId::observation_code("UVFOODBB15.SOMETHING.5.7.1").unwrap();
/// assert_eq!(code, "UVFOODBB15.SOMETHING");
/// ```
pub struct ObservationId;

impl ObservationId {
    /// Encode an observation identifier
    pub fn encode(
        observation_code: &str,
        cohort_code: &str,
        measurement_code: &str,
        catalog_version: &str,
    ) -> String {
        [observation_code, cohort_code, measurement_code, catalog_version]
            .join(&OBSERVATION_SEPARATOR.to_string())
    }

    /// Recover the observation code by stripping exactly three trailing segments
    ///
    /// The remainder is returned verbatim and may itself contain `.`.
    pub fn observation_code(id: &str) -> Result<&str, ImportError> {
        bounded(id, &[OBSERVATION_SEPARATOR])?;
        let mut remainder = id;
        for _ in 0..OBSERVATION_TRAILING_SEGMENTS {
            let idx = interior(remainder, remainder.rfind(OBSERVATION_SEPARATOR))
                .map_err(|_| invalid(id))?;
            remainder = &remainder[..idx];
        }
        Ok(remainder)
    }
}

/// Catalog root protocol identifier codec
pub struct CatalogId;

impl CatalogId {
    pub fn for_release(catalog_release_id: &str) -> String {
        format!("{}{}", CATALOG_PREFIX, catalog_release_id)
    }

    pub fn for_study_definition(study_definition_id: &str) -> String {
        format!("{}{}", STUDY_DEFINITION_CATALOG_PREFIX, study_definition_id)
    }

    /// Strip one `catalog_` prefix
    pub fn release_id(id: &str) -> Result<&str, ImportError> {
        strip_prefix(id, CATALOG_PREFIX)
    }

    /// Strip one `catalog_studydefinition_` prefix
    pub fn study_definition_id(id: &str) -> Result<&str, ImportError> {
        strip_prefix(id, STUDY_DEFINITION_CATALOG_PREFIX)
    }
}

/// Fresh opaque identifier for nodes without usable source coordinates
///
/// Identifiers produced this way differ on every import.
pub fn opaque_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// Accept a separator position only when it is neither the first nor the last byte
fn interior(id: &str, idx: Option<usize>) -> Result<usize, ImportError> {
    match idx {
        Some(idx) if idx > 0 && idx + 1 < id.len() => Ok(idx),
        _ => Err(invalid(id)),
    }
}

/// Reject identifiers that start or end with one of `separators`
fn bounded(id: &str, separators: &[char]) -> Result<(), ImportError> {
    if id.starts_with(separators) || id.ends_with(separators) {
        return Err(invalid(id));
    }
    Ok(())
}

fn strip_prefix<'a>(id: &'a str, prefix: &str) -> Result<&'a str, ImportError> {
    match id.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => Ok(rest),
        _ => Err(invalid(id)),
    }
}

fn invalid(id: &str) -> ImportError {
    ImportError::InvalidIdentifier(id.to_string())
}
