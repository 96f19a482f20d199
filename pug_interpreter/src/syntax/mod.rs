//! Syntax-directed evaluation: executes a token sequence against a
//! caller-owned variable table.
//!
//! The variable table persists across calls, so a REPL can evaluate one
//! line at a time against the same state.

mod error;
mod evaluator;

pub use error::{EvalError, EvalErrorKind};
pub use evaluator::Evaluator;

use crate::config::runtime::EvaluatorPreferences;
use crate::runtime::{Host, RuntimeValue, VariableTable};
use crate::tokens::Token;

/// Evaluate tokens with default preferences
pub fn evaluate(
    variables: &mut VariableTable,
    tokens: &[Token],
    host: &mut dyn Host,
) -> Result<Vec<RuntimeValue>, EvalError> {
    Evaluator::new(tokens, variables, host).run()
}

pub fn evaluate_with_preferences(
    variables: &mut VariableTable,
    tokens: &[Token],
    host: &mut dyn Host,
    preferences: EvaluatorPreferences,
) -> Result<Vec<RuntimeValue>, EvalError> {
    Evaluator::with_preferences(tokens, variables, host, preferences).run()
}
