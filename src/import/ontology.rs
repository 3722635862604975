//! Per-run ontology cache
//!
//! Ontologies are keyed by code system, terms by code system plus code and
//! units by name. The first request for a key creates the shared object;
//! later requests return the same `Arc`. Entries are append-only and the
//! index is dropped at the end of the import that created it.

use crate::models::{ImportWarning, Ontology, OntologyTerm, Unit, WarningKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Namespace for deterministic unit identifiers
pub const UNIT_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_3a52_9d0e_4b7a_8f21_5e4c_b0a9_d317);

/// Objects created by one run, in creation order
#[derive(Debug, Default)]
pub struct OntologyParts {
    pub ontologies: Vec<Arc<Ontology>>,
    pub terms: Vec<Arc<OntologyTerm>>,
    pub units: Vec<Arc<Unit>>,
    pub warnings: Vec<ImportWarning>,
}

/// Memoization cache for ontologies, ontology terms and units
#[derive(Debug, Default)]
pub struct OntologyIndex {
    ontologies: Vec<Arc<Ontology>>,
    ontology_by_code_system: HashMap<String, usize>,
    terms: Vec<Arc<OntologyTerm>>,
    term_by_key: HashMap<(String, String), usize>,
    units: Vec<Arc<Unit>>,
    unit_by_name: HashMap<String, usize>,
    warnings: Vec<ImportWarning>,
}

impl OntologyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the ontology for a code system, creating it on first request
    ///
    /// Returns `None` with a warning when either coordinate is missing.
    pub fn get_or_create_ontology(
        &mut self,
        code_system: Option<&str>,
        code_system_name: Option<&str>,
    ) -> Option<Arc<Ontology>> {
        let (code_system, code_system_name) = match (code_system, code_system_name) {
            (Some(cs), Some(name)) => (cs, name),
            _ => {
                let subject = code_system.or(code_system_name).unwrap_or("?");
                warn!(
                    "missing ontology code system [{:?}] or code system name [{:?}]",
                    code_system, code_system_name
                );
                self.warnings.push(ImportWarning::new(
                    WarningKind::MissingOntologyCoordinates,
                    subject,
                    "missing ontology code system or code system name",
                ));
                return None;
            }
        };

        if let Some(&idx) = self.ontology_by_code_system.get(code_system) {
            return Some(Arc::clone(&self.ontologies[idx]));
        }

        debug!("creating ontology [{}] ({})", code_system, code_system_name);
        let ontology = Arc::new(Ontology {
            identifier: code_system.to_string(),
            name: code_system_name.to_string(),
            code_system: code_system.to_string(),
        });
        self.ontology_by_code_system
            .insert(code_system.to_string(), self.ontologies.len());
        self.ontologies.push(Arc::clone(&ontology));
        Some(ontology)
    }

    /// Get the term for a code, creating it (and its ontology) on first request
    ///
    /// A term without a resolvable ontology is still created. Returns `None`
    /// only when the code itself is missing.
    pub fn get_or_create_term(
        &mut self,
        code_system: Option<&str>,
        code_system_name: Option<&str>,
        code: Option<&str>,
        display_name: Option<&str>,
    ) -> Option<Arc<OntologyTerm>> {
        let Some(code) = code else {
            warn!(
                "missing ontology term code in code system [{}]",
                code_system.unwrap_or("?")
            );
            self.warnings.push(ImportWarning::new(
                WarningKind::MissingOntologyCoordinates,
                code_system.unwrap_or("?"),
                "missing ontology term code",
            ));
            return None;
        };

        let key = (code_system.unwrap_or_default().to_string(), code.to_string());
        if let Some(&idx) = self.term_by_key.get(&key) {
            return Some(Arc::clone(&self.terms[idx]));
        }

        let ontology = self.get_or_create_ontology(code_system, code_system_name);
        let identifier = match code_system {
            Some(cs) => format!("{}.{}", cs, code),
            None => code.to_string(),
        };
        debug!("creating ontology term [{}]", identifier);
        let term = Arc::new(OntologyTerm {
            identifier,
            code: code.to_string(),
            name: display_name.unwrap_or_default().to_string(),
            ontology,
        });
        self.term_by_key.insert(key, self.terms.len());
        self.terms.push(Arc::clone(&term));
        Some(term)
    }

    /// Get the unit with this name, creating it on first request
    pub fn get_or_create_unit(&mut self, name: &str) -> Arc<Unit> {
        if let Some(&idx) = self.unit_by_name.get(name) {
            return Arc::clone(&self.units[idx]);
        }

        debug!("creating unit [{}]", name);
        let unit = Arc::new(Unit {
            identifier: Uuid::new_v5(&UNIT_NAMESPACE, name.as_bytes()).to_string(),
            name: name.to_string(),
        });
        self.unit_by_name.insert(name.to_string(), self.units.len());
        self.units.push(Arc::clone(&unit));
        unit
    }

    pub fn ontologies(&self) -> &[Arc<Ontology>] {
        &self.ontologies
    }

    pub fn terms(&self) -> &[Arc<OntologyTerm>] {
        &self.terms
    }

    pub fn units(&self) -> &[Arc<Unit>] {
        &self.units
    }

    /// Consume the index, returning everything it created
    pub fn into_parts(self) -> OntologyParts {
        OntologyParts {
            ontologies: self.ontologies,
            terms: self.terms,
            units: self.units,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNOMED: &str = "2.16.840.1.113883.6.96";

    #[test]
    fn test_ontology_is_shared_per_code_system() {
        let mut index = OntologyIndex::new();
        let a = index.get_or_create_ontology(Some(SNOMED), Some("SNOMED CT")).unwrap();
        let b = index.get_or_create_ontology(Some(SNOMED), Some("other name")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.identifier, SNOMED);
        assert_eq!(a.name, "SNOMED CT");
        assert_eq!(index.ontologies().len(), 1);
    }

    #[test]
    fn test_term_is_shared_and_links_ontology() {
        let mut index = OntologyIndex::new();
        let a = index
            .get_or_create_term(Some(SNOMED), Some("SNOMED CT"), Some("271649006"), Some("Systolic"))
            .unwrap();
        let b = index
            .get_or_create_term(Some(SNOMED), Some("SNOMED CT"), Some("271649006"), None)
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.identifier, "2.16.840.1.113883.6.96.271649006");
        assert_eq!(a.name, "Systolic");

        let ontology = index.get_or_create_ontology(Some(SNOMED), Some("SNOMED CT")).unwrap();
        assert!(Arc::ptr_eq(a.ontology.as_ref().unwrap(), &ontology));
        assert_eq!(index.terms().len(), 1);
    }

    #[test]
    fn test_term_without_code_system_name_has_no_ontology() {
        let mut index = OntologyIndex::new();
        let term = index
            .get_or_create_term(Some(SNOMED), None, Some("123"), None)
            .unwrap();
        assert!(term.ontology.is_none());
        assert_eq!(term.name, "");

        let warnings = index.into_parts().warnings;
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingOntologyCoordinates);
    }

    #[test]
    fn test_term_without_code_is_not_created() {
        let mut index = OntologyIndex::new();
        assert!(index.get_or_create_term(Some(SNOMED), Some("SNOMED CT"), None, Some("x")).is_none());
        assert!(index.terms().is_empty());
        assert_eq!(index.into_parts().warnings.len(), 1);
    }

    #[test]
    fn test_units_are_deduplicated_with_stable_identifiers() {
        let mut index = OntologyIndex::new();
        let a = index.get_or_create_unit("mmHg");
        let b = index.get_or_create_unit("mmHg");
        let c = index.get_or_create_unit("kg");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        let mut other = OntologyIndex::new();
        assert_eq!(other.get_or_create_unit("mmHg").identifier, a.identifier);
        assert_eq!(index.units().len(), 2);
    }
}
