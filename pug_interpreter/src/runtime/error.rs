//! Errors raised by value conversions and built-in functions

use super::DataType;
use crate::config::compile_time::runtime::MAX_STRING_LENGTH;
use crate::logging::codes;
use crate::tokens::TokenKind;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("Can't convert {value} to {target}")]
    ConversionFailed { value: String, target: &'static str },

    #[error("Invalid type {found}. Expected a {expected}")]
    InvalidCast {
        found: &'static str,
        expected: &'static str,
    },

    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    #[error("Cannot apply {operator} operator to different types: {left} and {right}")]
    TypeMismatch {
        operator: TokenKind,
        left: DataType,
        right: DataType,
    },

    #[error("Cannot apply {operator} operator to a None value")]
    NoneOperand { operator: TokenKind },

    #[error("Invalid token type: {kind}")]
    InvalidLiteral { kind: TokenKind },

    #[error("Function {name} not found")]
    FunctionNotFound { name: String },

    #[error("Invalid number of arguments for {name}")]
    InvalidArgumentCount { name: String },

    #[error("Invalid argument for {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("String too long: {length} characters (max {MAX_STRING_LENGTH})")]
    StringTooLong { length: usize },

    #[error("Host I/O failure: {message}")]
    Host { message: String },
}

impl ValueError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ValueError::ConversionFailed { .. } => codes::runtime::CONVERSION_FAILED,
            ValueError::InvalidCast { .. } => codes::runtime::INVALID_CAST,
            ValueError::UnknownType { .. } => codes::evaluation::UNKNOWN_TYPE,
            ValueError::TypeMismatch { .. } | ValueError::NoneOperand { .. } => {
                codes::evaluation::TYPE_MISMATCH
            }
            ValueError::InvalidLiteral { .. } => codes::evaluation::UNEXPECTED_TOKEN,
            ValueError::FunctionNotFound { .. } => codes::runtime::FUNCTION_NOT_FOUND,
            ValueError::InvalidArgumentCount { .. } => codes::runtime::INVALID_ARGUMENT_COUNT,
            ValueError::InvalidArgument { .. } => codes::runtime::INVALID_ARGUMENT,
            ValueError::StringTooLong { .. } => codes::runtime::STRING_TOO_LONG,
            ValueError::Host { .. } => codes::runtime::HOST_IO_FAILURE,
        }
    }

    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        ValueError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ValueError {
    fn from(error: std::io::Error) -> Self {
        ValueError::Host {
            message: error.to_string(),
        }
    }
}
