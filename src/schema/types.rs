use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared property type of a column.
///
/// Every variant maps to exactly one storage type string. `Custom` covers
/// anything the declaration layer could not classify and is stored as a
/// serialized string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Bool,
    Date,
    Timestamp,
    Uuid,
    FixedVector(Box<SemanticType>, usize),
    List(Box<SemanticType>),
    Custom(String),
}

impl SemanticType {
    pub fn fixed_vector(elem: SemanticType, dims: usize) -> Self {
        SemanticType::FixedVector(Box::new(elem), dims)
    }

    pub fn list(elem: SemanticType) -> Self {
        SemanticType::List(Box::new(elem))
    }

    /// Storage type string used in DDL and reported by the catalog.
    pub fn storage_type(&self) -> String {
        match self {
            SemanticType::Int8 => "INT8".into(),
            SemanticType::Int16 => "INT16".into(),
            SemanticType::Int32 => "INT32".into(),
            SemanticType::Int64 => "INT64".into(),
            SemanticType::UInt8 => "UINT8".into(),
            SemanticType::UInt16 => "UINT16".into(),
            SemanticType::UInt32 => "UINT32".into(),
            SemanticType::UInt64 => "UINT64".into(),
            SemanticType::Float => "FLOAT".into(),
            SemanticType::Double => "DOUBLE".into(),
            SemanticType::String => "STRING".into(),
            SemanticType::Bool => "BOOLEAN".into(),
            SemanticType::Date => "DATE".into(),
            SemanticType::Timestamp => "TIMESTAMP".into(),
            SemanticType::Uuid => "UUID".into(),
            SemanticType::FixedVector(elem, dims) => format!("{}[{dims}]", elem.storage_type()),
            SemanticType::List(elem) => format!("{}[]", elem.storage_type()),
            SemanticType::Custom(_) => "STRING".into(),
        }
    }

    /// Inverse of [`SemanticType::storage_type`] for catalog reconstruction.
    ///
    /// Unrecognized storage names come back as `Custom` carrying the raw name.
    pub fn from_storage(storage: &str) -> Self {
        let trimmed = storage.trim();
        if let Some(inner) = trimmed.strip_suffix("[]") {
            return SemanticType::list(SemanticType::from_storage(inner));
        }
        if let Some(open) = trimmed.rfind('[') {
            if trimmed.ends_with(']') {
                let dims = &trimmed[open + 1..trimmed.len() - 1];
                if let Ok(dims) = dims.trim().parse::<usize>() {
                    return SemanticType::fixed_vector(
                        SemanticType::from_storage(&trimmed[..open]),
                        dims,
                    );
                }
            }
        }
        match trimmed.to_ascii_uppercase().as_str() {
            "INT8" => SemanticType::Int8,
            "INT16" => SemanticType::Int16,
            "INT32" => SemanticType::Int32,
            "INT64" | "SERIAL" => SemanticType::Int64,
            "UINT8" => SemanticType::UInt8,
            "UINT16" => SemanticType::UInt16,
            "UINT32" => SemanticType::UInt32,
            "UINT64" => SemanticType::UInt64,
            "FLOAT" => SemanticType::Float,
            "DOUBLE" => SemanticType::Double,
            "STRING" => SemanticType::String,
            "BOOL" | "BOOLEAN" => SemanticType::Bool,
            "DATE" => SemanticType::Date,
            "TIMESTAMP" => SemanticType::Timestamp,
            "UUID" => SemanticType::Uuid,
            _ => SemanticType::Custom(trimmed.to_string()),
        }
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, SemanticType::Timestamp)
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, SemanticType::FixedVector(..))
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_type())
    }
}
