//! Runtime model: types, values, variables and native functions

pub mod builtins;
pub mod data_type;
pub mod error;
pub mod host;
pub mod value;
pub mod variables;

pub use builtins::{Arity, BuiltInFunctions, NativeFn};
pub use data_type::DataType;
pub use error::ValueError;
pub use host::{ConsoleHost, Host, MemoryHost};
pub use value::{format_double, RuntimeValue, EQUALITY_EPSILON};
pub use variables::VariableTable;
