// Internal modules
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod runtime;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use lexical::{tokenize, LexerError};
pub use pipeline::{execute, run_file, run_source, ExecutionReport, PipelineError, RunResult};
pub use runtime::{BuiltInFunctions, DataType, RuntimeValue, VariableTable};
pub use syntax::{evaluate, EvalError};
pub use tokens::{Token, TokenKind};
