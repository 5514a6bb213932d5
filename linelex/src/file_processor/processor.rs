//! Source file acquisition: path checks, limits, and UTF-8 decoding

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::logging::Code;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension {extension:?}, expected one of: {}", .allowed.join(", "))]
    InvalidExtension {
        extension: Option<String>,
        allowed: Vec<String>,
    },

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

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> Code {
        match self {
            FileProcessorError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => {
                codes::file_processing::INVALID_EXTENSION
            }
            FileProcessorError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => codes::file_processing::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => {
                codes::file_processing::PERMISSION_DENIED
            }
            FileProcessorError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => codes::file_processing::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            FileProcessorError::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased extension without the dot
    pub extension: Option<String>,
    pub line_count: usize,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_readable(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

fn human_readable(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Decoded source text plus what was learned while reading it
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Characters read per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.char_count() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

/// Reads source files under the compile-time limits and the runtime preferences
#[derive(Debug, Clone)]
pub struct FileProcessor {
    /// Accepted extensions; empty accepts every file
    pub allowed_extensions: Vec<String>,
    pub enable_performance_logging: bool,
    pub reject_empty_files: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            allowed_extensions: Vec::new(),
            enable_performance_logging: true,
            reject_empty_files: false,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            allowed_extensions: prefs.allowed_extensions.clone(),
            enable_performance_logging: prefs.enable_performance_logging,
            reject_empty_files: prefs.reject_empty_files,
        }
    }

    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn with_empty_files_rejected(mut self, rejected: bool) -> Self {
        self.reject_empty_files = rejected;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    pub fn max_line_count() -> usize {
        MAX_LINE_COUNT
    }

    /// Validate, read and decode a file
    pub fn process_file<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = Instant::now();
        let file_path = file_path.as_ref();
        let display = file_path.display().to_string();

        log_debug!("Starting file processing", "file" => display);

        let path = validate_path(file_path, &display)?;
        let mut metadata = read_metadata(&path)?;
        self.validate_file(&metadata, &display)?;
        let source = read_source(&path, &display)?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            };
            log_error!(error.error_code(), "File exceeds maximum line count",
                "file" => display,
                "lines" => line_count,
                "max_lines" => MAX_LINE_COUNT);
            return Err(error);
        }
        metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start_time.elapsed(),
        };

        self.log_processing_success(&result, &display);
        Ok(result)
    }

    fn log_processing_success(&self, result: &FileProcessingResult, file: &str) {
        let duration_ms = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);

        if self.enable_performance_logging && crate::logging::config::log_performance_events() {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File read with performance metrics",
                "file" => file,
                "size" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "chars" => result.char_count(),
                "duration_ms" => duration_ms,
                "chars_per_ms" => format!("{:.2}", result.processing_rate()),
                "is_large_file" => result.metadata.is_large_file()
            );
        } else {
            log_success!(
                codes::success::FILE_PROCESSING_SUCCESS,
                "File read",
                "file" => file,
                "size_bytes" => result.metadata.size,
                "lines" => result.metadata.line_count
            );
        }
    }

    fn validate_file(&self, metadata: &FileMetadata, file: &str) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds maximum size limit",
                "file" => file,
                "size" => metadata.human_readable_size(),
                "limit" => human_readable(MAX_FILE_SIZE));
            return Err(error);
        }

        if metadata.size == 0 && self.reject_empty_files {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file);
            return Err(error);
        }

        if !self.allowed_extensions.is_empty() {
            let allowed = metadata
                .extension
                .as_ref()
                .is_some_and(|ext| self.allowed_extensions.contains(ext));
            if !allowed {
                let error = FileProcessorError::InvalidExtension {
                    extension: metadata.extension.clone(),
                    allowed: self.allowed_extensions.clone(),
                };
                log_error!(error.error_code(), "File extension not allowed",
                    "file" => file,
                    "extension" => metadata.extension.as_deref().unwrap_or("none"),
                    "allowed" => self.allowed_extensions.join(","));
                return Err(error);
            }
        }

        Ok(())
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_path(file_path: &Path, display: &str) -> Result<PathBuf, FileProcessorError> {
    if file_path.as_os_str().is_empty() {
        let error = FileProcessorError::InvalidPath {
            path: String::new(),
        };
        log_error!(error.error_code(), "Empty file path provided");
        return Err(error);
    }

    if !file_path.exists() {
        let error = FileProcessorError::FileNotFound {
            path: display.to_string(),
        };
        log_error!(error.error_code(), "File not found", "path" => display);
        return Err(error);
    }

    if !file_path.is_file() {
        let error = FileProcessorError::InvalidPath {
            path: display.to_string(),
        };
        log_error!(error.error_code(), "Path is not a regular file", "path" => display);
        return Err(error);
    }

    file_path
        .canonicalize()
        .map_err(|e| io_failure(e, file_path, "Failed to resolve path"))
}

fn read_metadata(path: &Path) -> Result<FileMetadata, FileProcessorError> {
    let metadata =
        fs::metadata(path).map_err(|e| io_failure(e, path, "Failed to read file metadata"))?;

    let file_metadata = FileMetadata {
        path: path.to_path_buf(),
        size: metadata.len(),
        extension: path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase),
        line_count: 0,
        modified: metadata.modified().ok(),
    };

    log_debug!("File metadata collected",
        "size" => file_metadata.human_readable_size(),
        "extension" => file_metadata.extension.as_deref().unwrap_or("none"),
        "is_large_file" => file_metadata.is_large_file());

    Ok(file_metadata)
}

fn read_source(path: &Path, display: &str) -> Result<String, FileProcessorError> {
    let bytes = fs::read(path).map_err(|e| io_failure(e, path, "Failed to read file"))?;

    String::from_utf8(bytes).map_err(|e| {
        let error = FileProcessorError::InvalidEncoding {
            path: display.to_string(),
        };
        log_error!(error.error_code(), "Invalid UTF-8 encoding in file",
            "file" => display,
            "valid_up_to" => e.utf8_error().valid_up_to());
        error
    })
}

/// Map an I/O failure to the matching error variant and log it
fn io_failure(e: io::Error, path: &Path, message: &str) -> FileProcessorError {
    let path_str = path.display().to_string();
    let error = match e.kind() {
        io::ErrorKind::NotFound => FileProcessorError::FileNotFound {
            path: path_str.clone(),
        },
        io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
            path: path_str.clone(),
        },
        io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding {
            path: path_str.clone(),
        },
        _ => FileProcessorError::IoError {
            message: format!("{} '{}': {}", message, path_str, e),
        },
    };
    log_error!(error.error_code(), message,
        "path" => path_str,
        "io_error" => e);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("input.txt");
        let content = "hello world\nsecond line\n";
        fs::write(&file_path, content).unwrap();

        let result = FileProcessor::new().process_file(&file_path).unwrap();

        assert_eq!(result.source, content);
        assert_eq!(result.metadata.line_count, 2);
        assert_eq!(result.metadata.extension.as_deref(), Some("txt"));
        assert_eq!(result.char_count(), content.chars().count());
        assert!(!result.metadata.is_large_file());
    }

    #[test]
    fn test_file_not_found() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path().join("missing.txt"));

        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path());

        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn test_empty_path() {
        let result = FileProcessor::new().process_file("");
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn test_file_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.txt");
        fs::write(&file_path, "a".repeat((MAX_FILE_SIZE + 1) as usize)).unwrap();

        let result = FileProcessor::new().process_file(&file_path);

        assert_matches!(
            result,
            Err(FileProcessorError::FileTooLarge { size, max_size })
                if size == MAX_FILE_SIZE + 1 && max_size == MAX_FILE_SIZE
        );
    }

    #[test]
    fn test_extension_allow_list() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("notes.md");
        fs::write(&file_path, "content").unwrap();

        let processor = FileProcessor::new().with_allowed_extensions([".txt", "SRC"]);
        assert_eq!(processor.allowed_extensions, vec!["txt", "src"]);

        let result = processor.process_file(&file_path);
        assert_matches!(
            result,
            Err(FileProcessorError::InvalidExtension { extension: Some(ref ext), .. }) if ext == "md"
        );

        let accepted = dir.path().join("code.SRC");
        fs::write(&accepted, "content").unwrap();
        assert!(processor.process_file(&accepted).is_ok());
    }

    #[test]
    fn test_empty_file_allowed_by_default() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.txt");
        fs::write(&file_path, "").unwrap();

        let result = FileProcessor::new().process_file(&file_path).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.metadata.line_count, 0);

        let strict = FileProcessor::new().with_empty_files_rejected(true);
        assert_matches!(strict.process_file(&file_path), Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_invalid_encoding() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("binary.txt");
        fs::write(&file_path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

        let result = FileProcessor::new().process_file(&file_path);
        assert_matches!(result, Err(FileProcessorError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_too_many_lines() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("many_lines.txt");
        fs::write(&file_path, "\n".repeat(MAX_LINE_COUNT + 1)).unwrap();

        let result = FileProcessor::new().process_file(&file_path);

        assert_matches!(
            result,
            Err(FileProcessorError::TooManyLines { lines, max_lines })
                if lines == MAX_LINE_COUNT + 1 && max_lines == MAX_LINE_COUNT
        );
    }

    #[test]
    fn test_error_classification() {
        let error = FileProcessorError::FileNotFound {
            path: "input.txt".to_string(),
        };

        assert_eq!(error.error_code().as_str(), "E005");
        assert_eq!(error.category(), "FileProcessing");
        assert_eq!(error.severity(), "Medium");
        assert!(!error.is_recoverable());
        assert!(error.requires_halt());

        let lines = FileProcessorError::TooManyLines {
            lines: 2,
            max_lines: 1,
        };
        assert_eq!(lines.error_code().as_str(), "E013");
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable(512), "512 B");
        assert_eq!(human_readable(2048), "2.00 KB");
        assert_eq!(human_readable(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            allowed_extensions: vec!["txt".to_string()],
            enable_performance_logging: false,
            reject_empty_files: true,
        };

        let processor = FileProcessor::from_preferences(&prefs);
        assert_eq!(processor.allowed_extensions, vec!["txt"]);
        assert!(!processor.enable_performance_logging);
        assert!(processor.reject_empty_files);
    }
}
