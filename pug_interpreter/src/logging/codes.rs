//! Error and success codes with their classification metadata
//!
//! Every error type in the crate maps onto one of these codes through its
//! `error_code()` method, so log output and diagnostics share one vocabulary.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const UNEXPECTED_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Parse/evaluate error codes
pub mod evaluation {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNKNOWN_IDENTIFIER: Code = Code::new("E041");
    pub const UNKNOWN_TYPE: Code = Code::new("E042");
    pub const TYPE_MISMATCH: Code = Code::new("E043");
    pub const UNSUPPORTED_OPERATOR: Code = Code::new("E044");
    pub const NON_BOOLEAN_LOGICAL_OPERAND: Code = Code::new("E045");
    pub const UNTERMINATED_BLOCK: Code = Code::new("E046");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E047");
    pub const LOOP_LIMIT_EXCEEDED: Code = Code::new("E048");
    pub const TOO_MANY_ARGUMENTS: Code = Code::new("E049");
}

/// Value and built-in function error codes
pub mod runtime {
    use super::Code;

    pub const CONVERSION_FAILED: Code = Code::new("E060");
    pub const INVALID_CAST: Code = Code::new("E061");
    pub const FUNCTION_NOT_FOUND: Code = Code::new("E062");
    pub const INVALID_ARGUMENT_COUNT: Code = Code::new("E063");
    pub const INVALID_ARGUMENT: Code = Code::new("E064");
    pub const HOST_IO_FAILURE: Code = Code::new("E065");
    pub const STRING_TOO_LONG: Code = Code::new("E066");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const EVALUATION_COMPLETE: Code = Code::new("I040");
    pub const PIPELINE_COMPLETE: Code = Code::new("I050");
    pub const SESSION_STARTED: Code = Code::new("I051");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();
        let mut register = |metadata: ErrorMetadata| {
            registry.insert(metadata.code, metadata);
        };

        // System errors
        register(ErrorMetadata::new(
            "ERR001",
            "System",
            Severity::Critical,
            false,
            true,
            "Critical internal interpreter error",
            "File a bug report with the script that triggered it",
        ));
        register(ErrorMetadata::new(
            "ERR002",
            "System",
            Severity::Critical,
            false,
            true,
            "System initialization failure",
            "Check runtime configuration and environment variables",
        ));
        register(ErrorMetadata::new(
            "ERR003",
            "System",
            Severity::High,
            false,
            true,
            "Invalid runtime configuration",
            "Fix the configuration file or PUG_* environment variables",
        ));

        // File processing errors
        register(ErrorMetadata::new(
            "E005",
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "Script file not found at specified path",
            "Check file path and ensure file exists",
        ));
        register(ErrorMetadata::new(
            "E006",
            "FileProcessing",
            Severity::Low,
            true,
            false,
            "File does not have .pug extension",
            "Rename file with .pug extension or disable the extension check",
        ));
        register(ErrorMetadata::new(
            "E007",
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "File exceeds maximum size limit",
            "Split the script or rebuild with a larger limit",
        ));
        register(ErrorMetadata::new(
            "E008",
            "FileProcessing",
            Severity::Low,
            true,
            false,
            "Script file is empty",
            "Provide a file with content",
        ));
        register(ErrorMetadata::new(
            "E009",
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "Permission denied accessing file",
            "Check file permissions and user access rights",
        ));
        register(ErrorMetadata::new(
            "E010",
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "File is not valid UTF-8",
            "Save the script with UTF-8 encoding",
        ));
        register(ErrorMetadata::new(
            "E011",
            "FileProcessing",
            Severity::Medium,
            false,
            true,
            "I/O error while reading file",
            "Check disk health and retry",
        ));
        register(ErrorMetadata::new(
            "E012",
            "FileProcessing",
            Severity::Low,
            false,
            true,
            "Path is not a regular file",
            "Pass the path of a script file, not a directory",
        ));

        // Lexical errors
        register(ErrorMetadata::new(
            "E020",
            "Lexical",
            Severity::High,
            false,
            true,
            "Unexpected character in source",
            "Remove or replace the highlighted character",
        ));
        register(ErrorMetadata::new(
            "E021",
            "Lexical",
            Severity::High,
            false,
            true,
            "String literal is not closed",
            "Add the closing double quote",
        ));
        register(ErrorMetadata::new(
            "E022",
            "Lexical",
            Severity::High,
            false,
            true,
            "Malformed numeric literal",
            "Use at most one decimal point in a number",
        ));
        register(ErrorMetadata::new(
            "E023",
            "Lexical",
            Severity::Medium,
            false,
            true,
            "Identifier exceeds maximum length",
            "Use a shorter variable name",
        ));
        register(ErrorMetadata::new(
            "E024",
            "Lexical",
            Severity::Medium,
            false,
            true,
            "String literal exceeds maximum size",
            "Split the literal into smaller pieces",
        ));
        register(ErrorMetadata::new(
            "E027",
            "Lexical",
            Severity::Medium,
            false,
            true,
            "Source produces too many tokens",
            "Split the script into smaller scripts",
        ));

        // Evaluation errors
        register(ErrorMetadata::new(
            "E040",
            "Evaluation",
            Severity::High,
            false,
            true,
            "Unexpected token",
            "Check the statement syntax around the highlighted token",
        ));
        register(ErrorMetadata::new(
            "E041",
            "Evaluation",
            Severity::High,
            false,
            true,
            "Identifier used before declaration",
            "Declare the variable with a type before using it",
        ));
        register(ErrorMetadata::new(
            "E042",
            "Evaluation",
            Severity::High,
            false,
            true,
            "Unknown data type name",
            "Use one of int, double, bool or string",
        ));
        register(ErrorMetadata::new(
            "E043",
            "Evaluation",
            Severity::High,
            false,
            true,
            "Operator applied to incompatible types",
            "Convert one operand with to_int, to_double, to_str or to_bool",
        ));
        register(ErrorMetadata::new(
            "E044",
            "Evaluation",
            Severity::High,
            false,
            true,
            "Operator is not supported for these operands",
            "Check operand types of the highlighted operator",
        ));
        register(ErrorMetadata::new(
            "E045",
            "Evaluation",
            Severity::High,
            false,
            true,
            "Logical operator applied to non-boolean operand",
            "Use comparisons to produce bool operands",
        ));
        register(ErrorMetadata::new(
            "E046",
            "Evaluation",
            Severity::High,
            false,
            true,
            "Block is missing its end keyword",
            "Close every if and while block with end",
        ));
        register(ErrorMetadata::new(
            "E047",
            "Evaluation",
            Severity::Critical,
            false,
            true,
            "Expression nesting exceeds maximum depth",
            "Simplify deeply nested expressions or blocks",
        ));
        register(ErrorMetadata::new(
            "E048",
            "Evaluation",
            Severity::High,
            false,
            true,
            "Loop exceeded the configured iteration limit",
            "Check the loop condition or raise PUG_EVALUATOR_MAX_LOOP_ITERATIONS",
        ));
        register(ErrorMetadata::new(
            "E049",
            "Evaluation",
            Severity::Medium,
            false,
            true,
            "Function call has too many arguments",
            "Reduce the number of call arguments",
        ));

        // Runtime errors
        register(ErrorMetadata::new(
            "E060",
            "Runtime",
            Severity::High,
            false,
            true,
            "Value cannot be converted to the requested type",
            "Check the value being converted",
        ));
        register(ErrorMetadata::new(
            "E061",
            "Runtime",
            Severity::High,
            false,
            true,
            "Value type does not match the declared type",
            "Declare the variable with a matching type or convert the value",
        ));
        register(ErrorMetadata::new(
            "E062",
            "Runtime",
            Severity::High,
            false,
            true,
            "Built-in function not found",
            "Check the function name",
        ));
        register(ErrorMetadata::new(
            "E063",
            "Runtime",
            Severity::High,
            false,
            true,
            "Wrong number of arguments for built-in function",
            "Check the function arity",
        ));
        register(ErrorMetadata::new(
            "E064",
            "Runtime",
            Severity::High,
            false,
            true,
            "Argument out of range for built-in function",
            "Check argument values",
        ));
        register(ErrorMetadata::new(
            "E065",
            "Runtime",
            Severity::High,
            false,
            true,
            "Host input/output failure",
            "Check the terminal or input stream",
        ));
        register(ErrorMetadata::new(
            "E066",
            "Runtime",
            Severity::Medium,
            false,
            true,
            "String result exceeds maximum length",
            "Reduce string repetition or concatenation",
        ));

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_code_is_registered() {
        let all = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            system::CONFIGURATION_ERROR,
            file_processing::FILE_NOT_FOUND,
            file_processing::INVALID_EXTENSION,
            file_processing::FILE_TOO_LARGE,
            file_processing::EMPTY_FILE,
            file_processing::PERMISSION_DENIED,
            file_processing::INVALID_ENCODING,
            file_processing::IO_ERROR,
            file_processing::INVALID_PATH,
            lexical::UNEXPECTED_CHARACTER,
            lexical::UNTERMINATED_STRING,
            lexical::INVALID_NUMBER,
            lexical::IDENTIFIER_TOO_LONG,
            lexical::STRING_TOO_LARGE,
            lexical::TOO_MANY_TOKENS,
            evaluation::UNEXPECTED_TOKEN,
            evaluation::UNKNOWN_IDENTIFIER,
            evaluation::UNKNOWN_TYPE,
            evaluation::TYPE_MISMATCH,
            evaluation::UNSUPPORTED_OPERATOR,
            evaluation::NON_BOOLEAN_LOGICAL_OPERAND,
            evaluation::UNTERMINATED_BLOCK,
            evaluation::MAX_RECURSION_DEPTH,
            evaluation::LOOP_LIMIT_EXCEEDED,
            evaluation::TOO_MANY_ARGUMENTS,
            runtime::CONVERSION_FAILED,
            runtime::INVALID_CAST,
            runtime::FUNCTION_NOT_FOUND,
            runtime::INVALID_ARGUMENT_COUNT,
            runtime::INVALID_ARGUMENT,
            runtime::HOST_IO_FAILURE,
            runtime::STRING_TOO_LONG,
        ];

        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification_lookups() {
        assert_eq!(get_category("E021"), "Lexical");
        assert_eq!(get_category("E041"), "Evaluation");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(is_recoverable("E006"));
        assert!(requires_halt("E020"));
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert!(!requires_halt("Z999"));
    }

    #[test]
    fn test_code_display() {
        assert_eq!(success::TOKENIZATION_COMPLETE.to_string(), "I020");
        assert_eq!(lexical::INVALID_NUMBER.as_str(), "E022");
    }
}
