//! Script file reading with size, encoding and extension validation

use crate::config::compile_time::file_processing::{LARGE_FILE_THRESHOLD, MAX_FILE_SIZE};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Extension of Pug script files
pub const PUG_EXTENSION: &str = "pug";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .pug, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => codes::file_processing::INVALID_EXTENSION,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::EmptyFile => codes::file_processing::EMPTY_FILE,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    fn from_io(error: &io::Error, path: &Path) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::InvalidData => Self::InvalidEncoding { path },
            _ => Self::IoError {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased extension, if any
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_pug_file: bool,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", self.size, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

/// A script's text together with what was learned while reading it
#[derive(Debug, Clone)]
pub struct ScriptFile {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl ScriptFile {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_pug_extension: bool,
    pub enable_performance_logging: bool,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_pug_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_pug_extension: prefs.require_pug_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_pug_extension_required(mut self, required: bool) -> Self {
        self.require_pug_extension = required;
        self
    }

    /// Compile-time upper bound on script size
    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    pub fn process_file<P: AsRef<Path>>(&self, file_path: P) -> Result<ScriptFile, FileProcessorError> {
        let start_time = Instant::now();
        let file_path = file_path.as_ref();
        let display_path = file_path.display().to_string();

        log_debug!("Starting file processing", "file" => &display_path);

        let result = self.read_validated(file_path, start_time);
        match &result {
            Ok(script) => self.log_processing_success(script, &display_path),
            Err(error) => {
                log_error!(error.error_code(), "Failed to read script file",
                    "file" => &display_path,
                    "error" => error
                );
            }
        }
        result
    }

    fn read_validated(&self, file_path: &Path, start_time: Instant) -> Result<ScriptFile, FileProcessorError> {
        let path = validate_path(file_path)?;
        let mut metadata = collect_metadata(&path)?;
        self.validate_file(&metadata)?;

        let source =
            fs::read_to_string(&path).map_err(|e| FileProcessorError::from_io(&e, &path))?;
        metadata.line_count = source.lines().count();

        Ok(ScriptFile {
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        })
    }

    fn validate_file(&self, metadata: &FileMetadata) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            });
        }

        if metadata.size == 0 {
            return Err(FileProcessorError::EmptyFile);
        }

        if self.require_pug_extension && !metadata.is_pug_file {
            return Err(FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            });
        }

        Ok(())
    }

    fn log_processing_success(&self, script: &ScriptFile, file_path: &str) {
        if self.enable_performance_logging {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "Script read with performance metrics",
                "file" => file_path,
                "size_human" => script.metadata.human_readable_size(),
                "lines" => script.metadata.line_count,
                "chars" => script.char_count(),
                "duration_ms" => format!("{:.2}", script.processing_duration.as_secs_f64() * 1000.0),
                "is_large_file" => script.metadata.is_large_file()
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "Script read",
                "file" => file_path,
                "size_bytes" => script.metadata.size
            );
        }

        if !script.metadata.is_pug_file {
            log_debug!("Processing script without .pug extension",
                "extension" => script.metadata.extension.as_deref().unwrap_or("none"),
                "file" => file_path
            );
        }
    }
}

fn validate_path(file_path: &Path) -> Result<PathBuf, FileProcessorError> {
    if file_path.as_os_str().is_empty() {
        return Err(FileProcessorError::InvalidPath {
            path: String::new(),
        });
    }

    if !file_path.exists() {
        return Err(FileProcessorError::FileNotFound {
            path: file_path.display().to_string(),
        });
    }

    if !file_path.is_file() {
        return Err(FileProcessorError::InvalidPath {
            path: file_path.display().to_string(),
        });
    }

    file_path
        .canonicalize()
        .map_err(|e| FileProcessorError::from_io(&e, file_path))
}

fn collect_metadata(path: &Path) -> Result<FileMetadata, FileProcessorError> {
    let metadata = fs::metadata(path).map_err(|e| FileProcessorError::from_io(&e, path))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase());
    let is_pug_file = extension.as_deref() == Some(PUG_EXTENSION);

    Ok(FileMetadata {
        path: path.to_path_buf(),
        size: metadata.len(),
        extension,
        line_count: 0,
        is_pug_file,
    })
}
