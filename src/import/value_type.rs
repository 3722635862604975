//! Value type mapping
//!
//! Maps the variant tag of an observation value to the logical data type of
//! the resulting feature.

use super::ImportError;
use crate::models::DataType;
use std::str::FromStr;

/// Value variant of a source observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Coded,
    CodedOrdinal,
    Identifier,
    Integer,
    PhysicalQuantity,
    Real,
    Text,
    Timestamp,
}

impl ValueKind {
    /// HL7 abbreviation of the variant
    pub fn tag(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "BL",
            ValueKind::Coded => "CD",
            ValueKind::CodedOrdinal => "CO",
            ValueKind::Identifier => "II",
            ValueKind::Integer => "INT",
            ValueKind::PhysicalQuantity => "PQ",
            ValueKind::Real => "REAL",
            ValueKind::Text => "ST",
            ValueKind::Timestamp => "TS",
        }
    }
}

impl FromStr for ValueKind {
    type Err = ImportError;

    /// Accepts HL7 abbreviations and spelled-out names, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "bl" | "boolean" | "bool" => Ok(ValueKind::Boolean),
            "cd" | "coded" | "code" => Ok(ValueKind::Coded),
            "co" | "codedordinal" => Ok(ValueKind::CodedOrdinal),
            "ii" | "identifier" => Ok(ValueKind::Identifier),
            "int" | "integer" => Ok(ValueKind::Integer),
            "pq" | "physicalquantity" | "quantity" => Ok(ValueKind::PhysicalQuantity),
            "real" => Ok(ValueKind::Real),
            "st" | "text" | "string" => Ok(ValueKind::Text),
            "ts" | "timestamp" => Ok(ValueKind::Timestamp),
            _ => Err(ImportError::UnsupportedValueType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Stateless mapping from value variant to data type
pub struct ValueTypeMapper;

impl ValueTypeMapper {
    /// Classify a raw value tag
    pub fn classify(tag: &str) -> Result<ValueKind, ImportError> {
        tag.parse()
    }

    /// Logical data type for a value variant
    pub fn data_type(kind: ValueKind) -> DataType {
        match kind {
            ValueKind::Boolean => DataType::Bool,
            ValueKind::Coded | ValueKind::CodedOrdinal => DataType::Categorical,
            ValueKind::Identifier | ValueKind::Text => DataType::String,
            ValueKind::Integer => DataType::Int,
            ValueKind::PhysicalQuantity | ValueKind::Real => DataType::Decimal,
            ValueKind::Timestamp => DataType::Datetime,
        }
    }

    /// Map a raw value tag straight to its data type
    pub fn map(tag: &str) -> Result<DataType, ImportError> {
        Self::classify(tag).map(Self::data_type)
    }

    /// Whether features of this variant carry a unit reference
    pub fn records_unit(kind: ValueKind) -> bool {
        kind == ValueKind::PhysicalQuantity
    }
}
