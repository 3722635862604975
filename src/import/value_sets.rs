//! Value-set lookup
//!
//! Indexes the flat value-set table by name. Coded observations name their
//! value set in the value's code-system name.

use super::ImportError;
use crate::models::{ValueSet, ValueSetTable};
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct ValueSetIndex {
    value_sets: HashMap<String, ValueSet>,
}

impl ValueSetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from a value-set table
    ///
    /// When two value sets share a name the later one wins.
    pub fn from_table(table: &ValueSetTable) -> Self {
        let mut value_sets = HashMap::with_capacity(table.value_sets.len());
        for value_set in &table.value_sets {
            info!(
                "indexing value set [{}] with {} codes",
                value_set.name,
                value_set.codes.len()
            );
            if value_sets
                .insert(value_set.name.clone(), value_set.clone())
                .is_some()
            {
                warn!("duplicate value set [{}], keeping the last one", value_set.name);
            }
        }
        Self { value_sets }
    }

    pub fn get(&self, name: &str) -> Option<&ValueSet> {
        self.value_sets.get(name)
    }

    /// Look up a value set, failing when it is absent
    pub fn require(&self, name: &str) -> Result<&ValueSet, ImportError> {
        self.get(name)
            .ok_or_else(|| ImportError::MissingValueSet(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.value_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value_sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValueSetCode;

    #[test]
    fn test_index_and_require() {
        let table = ValueSetTable::new(vec![
            ValueSet::new("YESNO", vec![ValueSetCode::new("1", "Yes"), ValueSetCode::new("2", "No")]),
            ValueSet::new("SEX", vec![ValueSetCode::new("M", "Male")]),
        ]);
        let index = ValueSetIndex::from_table(&table);
        assert_eq!(index.len(), 2);
        assert_eq!(index.require("YESNO").unwrap().codes.len(), 2);
        assert_eq!(
            index.require("MISSING").unwrap_err(),
            ImportError::MissingValueSet("MISSING".to_string())
        );
    }

    #[test]
    fn test_duplicate_name_keeps_last() {
        let table = ValueSetTable::new(vec![
            ValueSet::new("YESNO", vec![ValueSetCode::new("1", "Yes")]),
            ValueSet::new("YESNO", vec![ValueSetCode::new("J", "Ja"), ValueSetCode::new("N", "Nee")]),
        ]);
        let index = ValueSetIndex::from_table(&table);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("YESNO").unwrap().codes[0].code, "J");
        assert!(ValueSetIndex::new().is_empty());
    }
}
