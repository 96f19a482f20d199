//! Reads Pug scripts from disk before they are tokenized

mod processor;

use crate::config::runtime::FileProcessorPreferences;
pub use processor::{FileMetadata, FileProcessor, FileProcessorError, ScriptFile, PUG_EXTENSION};
use std::path::Path;

/// Read a script with preferences taken from the environment
pub fn process_file<P: AsRef<Path>>(file_path: P) -> Result<ScriptFile, FileProcessorError> {
    FileProcessor::from_preferences(&FileProcessorPreferences::default()).process_file(file_path)
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}
