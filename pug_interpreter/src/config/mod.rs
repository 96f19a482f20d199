//! Configuration module for the Pug interpreter
//! Compile-time limits are generated from TOML by build.rs; runtime
//! preferences come from `PUG_*` environment variables or a TOML file.

// Generated at compile time from config/<profile>.toml
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{
    EvaluatorPreferences, FileProcessorPreferences, LexicalPreferences, LogLevel,
    LoggingPreferences, ReplPreferences, RuntimeConfig, ConfigError,
};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("PUG_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("PUG_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
