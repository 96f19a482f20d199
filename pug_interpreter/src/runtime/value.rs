//! Tagged runtime values and the coercion rules shared by operators,
//! declarations and built-in functions.
//!
//! Every conversion is total: it returns a `ValueError` naming the value
//! and the target type rather than panicking.

use super::{DataType, ValueError};
use crate::config::compile_time::runtime::MAX_STRING_LENGTH;
use crate::tokens::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for equality whenever either side is a Double
pub const EQUALITY_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type", content = "value")]
pub enum RuntimeValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    #[serde(rename = "String")]
    Str(String),
    None,
}

impl RuntimeValue {
    pub fn data_type(&self) -> DataType {
        match self {
            RuntimeValue::Int(_) => DataType::Int,
            RuntimeValue::Double(_) => DataType::Double,
            RuntimeValue::Bool(_) => DataType::Bool,
            RuntimeValue::Str(_) => DataType::String,
            RuntimeValue::None => DataType::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, RuntimeValue::None)
    }

    pub fn is_number(&self) -> bool {
        self.data_type().is_number()
    }

    /// Build a string value, enforcing the compile-time length limit
    pub fn checked_str(value: String) -> Result<Self, ValueError> {
        let length = value.chars().count();
        if length > MAX_STRING_LENGTH {
            return Err(ValueError::StringTooLong { length });
        }
        Ok(RuntimeValue::Str(value))
    }

    pub fn to_double(&self) -> Result<f64, ValueError> {
        match self {
            RuntimeValue::Double(d) => Ok(*d),
            RuntimeValue::Int(i) => Ok(*i as f64),
            other => {
                let text = other.to_string();
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| conversion_error(text, DataType::Double))
            }
        }
    }

    /// Doubles round half-to-even and saturate at the `i64` bounds
    pub fn to_int(&self) -> Result<i64, ValueError> {
        match self {
            RuntimeValue::Int(i) => Ok(*i),
            RuntimeValue::Double(d) => Ok(d.round_ties_even() as i64),
            other => {
                let text = other.to_string();
                text.trim()
                    .parse::<i64>()
                    .map_err(|_| conversion_error(text, DataType::Int))
            }
        }
    }

    pub fn to_bool(&self) -> Result<bool, ValueError> {
        match self {
            RuntimeValue::Bool(b) => Ok(*b),
            RuntimeValue::Str(s) => {
                let trimmed = s.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(conversion_error(s.clone(), DataType::Bool))
                }
            }
            other => Err(conversion_error(other.to_string(), DataType::Bool)),
        }
    }

    /// Convert to a declared type. Only Int and Double interconvert; every
    /// other pairing must already match.
    pub fn cast(&self, target: DataType) -> Result<RuntimeValue, ValueError> {
        let found = match self.data_type() {
            DataType::Int | DataType::Double => "int or double",
            other => other.name(),
        };
        let compatible = match self.data_type() {
            DataType::Int | DataType::Double => target.is_number(),
            DataType::None => false,
            source => source == target,
        };
        if !compatible {
            return Err(ValueError::InvalidCast {
                found,
                expected: target.name(),
            });
        }

        match target {
            DataType::Int => Ok(RuntimeValue::Int(self.to_int()?)),
            DataType::Double => Ok(RuntimeValue::Double(self.to_double()?)),
            DataType::Bool => Ok(RuntimeValue::Bool(self.to_bool()?)),
            DataType::String => Ok(RuntimeValue::Str(self.to_string())),
            DataType::None => Err(ValueError::UnknownType {
                name: target.name().to_string(),
            }),
        }
    }

    /// Cast to a type given by its keyword
    pub fn cast_named(&self, type_name: &str) -> Result<RuntimeValue, ValueError> {
        let target = DataType::from_name(type_name).ok_or_else(|| ValueError::UnknownType {
            name: type_name.to_string(),
        })?;
        self.cast(target)
    }

    /// Zero value of a declarable type
    pub fn default_for(data_type: DataType) -> RuntimeValue {
        match data_type {
            DataType::Int => RuntimeValue::Int(0),
            DataType::Double => RuntimeValue::Double(0.0),
            DataType::Bool => RuntimeValue::Bool(false),
            DataType::String => RuntimeValue::Str(String::new()),
            DataType::None => RuntimeValue::None,
        }
    }

    pub fn default_named(type_name: &str) -> Result<RuntimeValue, ValueError> {
        DataType::from_name(type_name)
            .map(Self::default_for)
            .ok_or_else(|| ValueError::UnknownType {
                name: type_name.to_string(),
            })
    }

    /// Value of a literal token. Numeric literals are always Double.
    pub fn from_literal_token(token: &Token) -> Result<RuntimeValue, ValueError> {
        match token.kind {
            TokenKind::Number => token
                .text
                .parse::<f64>()
                .map(RuntimeValue::Double)
                .map_err(|_| conversion_error(token.text.clone(), DataType::Double)),
            TokenKind::Bool => Ok(RuntimeValue::Bool(token.text == "true")),
            TokenKind::String => Ok(RuntimeValue::Str(token.text.clone())),
            kind => Err(ValueError::InvalidLiteral { kind }),
        }
    }

    /// Number types always interoperate; anything else must match exactly.
    /// `None` never takes part in an operator.
    pub fn ensure_same_types(
        left: &RuntimeValue,
        right: &RuntimeValue,
        operator: TokenKind,
    ) -> Result<(), ValueError> {
        if left.is_none() || right.is_none() {
            return Err(ValueError::NoneOperand { operator });
        }
        if left.is_number() && right.is_number() {
            return Ok(());
        }
        if left.data_type() != right.data_type() {
            return Err(ValueError::TypeMismatch {
                operator,
                left: left.data_type(),
                right: right.data_type(),
            });
        }
        Ok(())
    }
}

fn conversion_error(value: String, target: DataType) -> ValueError {
    ValueError::ConversionFailed {
        value,
        target: target.name(),
    }
}

/// Shortest round-trip form; whole numbers drop the fraction
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        value.to_string()
    }
}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeValue::Int(i) => write!(f, "{}", i),
            RuntimeValue::Double(d) => f.write_str(&format_double(*d)),
            RuntimeValue::Bool(b) => write!(f, "{}", b),
            RuntimeValue::Str(s) => f.write_str(s),
            RuntimeValue::None => Ok(()),
        }
    }
}
