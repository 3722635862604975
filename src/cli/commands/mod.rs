//! CLI command implementations

pub mod decode;
pub mod import;
pub mod load;

use super::error::CliError;
use crate::models::CatalogTarget;

/// Resolve the catalog target from the mutually exclusive id arguments
pub fn parse_target(
    release: Option<String>,
    study_definition: Option<String>,
) -> Result<CatalogTarget, CliError> {
    match (release, study_definition) {
        (Some(release), None) => Ok(CatalogTarget::Release(release)),
        (None, Some(study)) => Ok(CatalogTarget::StudyDefinition(study)),
        (Some(_), Some(_)) => Err(CliError::InvalidArgument(
            "Use either --release or --study-definition, not both".to_string(),
        )),
        (None, None) => Err(CliError::InvalidArgument(
            "One of --release or --study-definition is required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(
            parse_target(Some("4".to_string()), None).unwrap(),
            CatalogTarget::Release("4".to_string())
        );
        assert_eq!(
            parse_target(None, Some("7".to_string())).unwrap(),
            CatalogTarget::StudyDefinition("7".to_string())
        );
        assert!(parse_target(None, None).is_err());
        assert!(parse_target(Some("4".to_string()), Some("7".to_string())).is_err());
    }
}
