//! Type tags for runtime values and their source keywords

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of runtime types. `None` marks "no value produced".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Double,
    Bool,
    String,
    None,
}

impl DataType {
    /// Declarable types, in keyword form
    pub const DECLARABLE: [DataType; 4] = [
        DataType::Int,
        DataType::Double,
        DataType::Bool,
        DataType::String,
    ];

    /// Keyword spelling used in source and cast messages
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Double => "double",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::None => "none",
        }
    }

    /// Resolve a declaration keyword. `none` is not declarable.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::DECLARABLE.into_iter().find(|t| t.name() == name)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, DataType::Int | DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "Int",
            DataType::Double => "Double",
            DataType::Bool => "Bool",
            DataType::String => "String",
            DataType::None => "None",
        };
        f.write_str(name)
    }
}
