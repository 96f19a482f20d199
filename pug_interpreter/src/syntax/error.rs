//! Evaluation errors with the parser state needed to locate them

use crate::logging::{codes, Code};
use crate::runtime::{RuntimeValue, ValueError, VariableTable};
use crate::tokens::{Token, TokenKind};

/// What went wrong during evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalErrorKind {
    /// A token that cannot start an expression
    #[error("Unexpected token {kind} at position {offset}")]
    UnexpectedPrimary { kind: TokenKind, offset: usize },

    #[error("Unexpected token: {found}, expected: {expected}")]
    UnexpectedToken { found: TokenKind, expected: TokenKind },

    #[error("Unknown identifier: {name}")]
    UnknownIdentifier { name: String },

    #[error("Unexpected token: {operator}")]
    UnsupportedOperator { operator: TokenKind },

    #[error("Logical operator {operator} can only be applied to bool types")]
    NonBooleanLogicalOperand { operator: TokenKind },

    #[error("Missing end for {keyword} block")]
    UnterminatedBlock { keyword: &'static str },

    #[error("else is not allowed inside a while block")]
    ElseInWhile,

    #[error("Maximum nesting depth of {limit} exceeded")]
    MaxDepthExceeded { limit: usize },

    #[error("Loop exceeded {limit} iterations")]
    LoopLimitExceeded { limit: u64 },

    #[error("Too many arguments for {name}: at most {limit} are allowed")]
    TooManyArguments { name: String, limit: usize },

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl EvalErrorKind {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedPrimary { .. }
            | Self::UnexpectedToken { .. }
            | Self::ElseInWhile => codes::evaluation::UNEXPECTED_TOKEN,
            Self::UnknownIdentifier { .. } => codes::evaluation::UNKNOWN_IDENTIFIER,
            Self::UnsupportedOperator { .. } => codes::evaluation::UNSUPPORTED_OPERATOR,
            Self::NonBooleanLogicalOperand { .. } => {
                codes::evaluation::NON_BOOLEAN_LOGICAL_OPERAND
            }
            Self::UnterminatedBlock { .. } => codes::evaluation::UNTERMINATED_BLOCK,
            Self::MaxDepthExceeded { .. } => codes::evaluation::MAX_RECURSION_DEPTH,
            Self::LoopLimitExceeded { .. } => codes::evaluation::LOOP_LIMIT_EXCEEDED,
            Self::TooManyArguments { .. } => codes::evaluation::TOO_MANY_ARGUMENTS,
            Self::Value(error) => error.error_code(),
        }
    }
}

/// A fatal evaluation error.
///
/// Carries the offending token, the whole token sequence, a snapshot of
/// the variable table at the moment of failure and the statement values
/// produced before it. Assignments made by earlier statements stay in the
/// caller's table; the snapshot mirrors it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    token: Token,
    tokens: Vec<Token>,
    variables: VariableTable,
    values: Vec<RuntimeValue>,
}

impl EvalError {
    pub fn new(
        kind: EvalErrorKind,
        token: Token,
        tokens: Vec<Token>,
        variables: VariableTable,
        values: Vec<RuntimeValue>,
    ) -> Self {
        Self {
            kind,
            token,
            tokens,
            variables,
            values,
        }
    }

    /// The token the failure is attributed to
    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// Statement values produced before the failure, `None` included
    pub fn values(&self) -> &[RuntimeValue] {
        &self.values
    }

    pub fn error_code(&self) -> Code {
        self.kind.error_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let kind = EvalErrorKind::UnexpectedPrimary {
            kind: TokenKind::CloseParenthesis,
            offset: 4,
        };
        assert_eq!(kind.to_string(), "Unexpected token CloseParenthesis at position 4");

        let kind = EvalErrorKind::UnexpectedToken {
            found: TokenKind::EndOfInput,
            expected: TokenKind::CloseParenthesis,
        };
        assert_eq!(
            kind.to_string(),
            "Unexpected token: EndOfInput, expected: CloseParenthesis"
        );

        let kind = EvalErrorKind::from(ValueError::FunctionNotFound {
            name: "xpto".to_string(),
        });
        assert_eq!(kind.to_string(), "Function xpto not found");
        assert_eq!(kind.error_code(), codes::runtime::FUNCTION_NOT_FOUND);
    }

    #[test]
    fn test_error_exposes_context() {
        let token = Token::new(TokenKind::Identifier, "y", 8);
        let mut variables = VariableTable::new();
        variables.declare("x", RuntimeValue::Int(1));

        let error = EvalError::new(
            EvalErrorKind::UnknownIdentifier {
                name: "y".to_string(),
            },
            token.clone(),
            vec![token.clone(), Token::end_of_input(9)],
            variables,
            vec![RuntimeValue::Int(1)],
        );

        assert_eq!(error.to_string(), "Unknown identifier: y");
        assert_eq!(error.token(), &token);
        assert_eq!(error.tokens().len(), 2);
        assert_eq!(error.variables().get("x"), Some(&RuntimeValue::Int(1)));
        assert_eq!(error.values(), &[RuntimeValue::Int(1)]);
        assert_eq!(error.error_code(), codes::evaluation::UNKNOWN_IDENTIFIER);
    }
}
