// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to require the .pug extension on script files
    pub require_pug_extension: bool,

    /// Whether to log timing for file reads
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_pug_extension: env::var("PUG_REQUIRE_PUG_EXTENSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var("PUG_ENABLE_PERFORMANCE_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to count tokens per category
    pub collect_detailed_metrics: bool,

    /// Whether to show line/column information in lexical error logs
    pub include_position_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env::var("PUG_LEXICAL_DETAILED_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_position_in_errors: env::var("PUG_LEXICAL_INCLUDE_POSITIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorPreferences {
    /// Upper bound on `while` iterations per loop; 0 means unbounded
    pub max_loop_iterations: u64,

    /// Whether to emit a debug event for every top-level statement value
    pub trace_statements: bool,
}

impl Default for EvaluatorPreferences {
    fn default() -> Self {
        Self {
            max_loop_iterations: env::var("PUG_EVALUATOR_MAX_LOOP_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            trace_statements: env::var("PUG_EVALUATOR_TRACE_STATEMENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether log events go to the console; otherwise they are kept in memory
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include the current script path in log context
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("PUG_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("PUG_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("PUG_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_file_context: env::var("PUG_LOGGING_INCLUDE_FILE_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplPreferences {
    /// Prompt printed before each line
    pub prompt: String,

    /// Initial state of the `:t` token printing toggle
    pub print_tokens: bool,

    /// Whether to color values and errors with ANSI escapes
    pub color_output: bool,
}

impl Default for ReplPreferences {
    fn default() -> Self {
        Self {
            prompt: env::var("PUG_REPL_PROMPT").unwrap_or_else(|_| "> ".to_string()),
            print_tokens: env::var("PUG_REPL_PRINT_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            color_output: env::var("PUG_REPL_COLOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors raised while loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        crate::logging::codes::system::CONFIGURATION_ERROR
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub evaluator: EvaluatorPreferences,
    pub logging: LoggingPreferences,
    pub repl: ReplPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; missing sections and keys fall back to the environment defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load preferences from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_PUG_EXTENSION: &str = "PUG_REQUIRE_PUG_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "PUG_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "PUG_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "PUG_LEXICAL_INCLUDE_POSITIONS";

    // Evaluator
    pub const EVALUATOR_MAX_LOOP_ITERATIONS: &str = "PUG_EVALUATOR_MAX_LOOP_ITERATIONS";
    pub const EVALUATOR_TRACE_STATEMENTS: &str = "PUG_EVALUATOR_TRACE_STATEMENTS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "PUG_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "PUG_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "PUG_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "PUG_LOGGING_INCLUDE_FILE_CONTEXT";

    // REPL
    pub const REPL_PROMPT: &str = "PUG_REPL_PROMPT";
    pub const REPL_PRINT_TOKENS: &str = "PUG_REPL_PRINT_TOKENS";
    pub const REPL_COLOR: &str = "PUG_REPL_COLOR";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_toml_overrides_single_field() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [evaluator]
            max_loop_iterations = 500

            [repl]
            prompt = "pug> "
            "#,
        )
        .unwrap();

        assert_eq!(config.evaluator.max_loop_iterations, 500);
        assert_eq!(config.repl.prompt, "pug> ");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = RuntimeConfig::from_toml_str("[evaluator]\nmax_loop_iterations = \"many\"");
        assert_matches!(result, Err(ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RuntimeConfig::load("/definitely/not/here.toml");
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(env_vars::LOGGING_MIN_LEVEL.starts_with("PUG_"));
        assert!(env_vars::EVALUATOR_MAX_LOOP_ITERATIONS.starts_with("PUG_"));
    }
}
