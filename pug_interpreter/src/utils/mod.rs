//! Shared source-location utilities used by the lexer, evaluator and diagnostics.

pub mod span;

pub use span::{Position, SourceMap, Span};
