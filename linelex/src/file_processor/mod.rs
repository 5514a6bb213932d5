//! Raw-text acquisition for the tokenizer
//!
//! Reads a file under the compile-time size and line limits and returns decoded
//! UTF-8 text with its metadata. Failures are logged with their error code before
//! being returned.

mod processor;

use crate::config::runtime::FileProcessorPreferences;
use crate::logging::Code;
use std::path::Path;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Process a file with preferences read from the environment
pub fn process_file<P: AsRef<Path>>(
    file_path: P,
) -> Result<FileProcessingResult, FileProcessorError> {
    create_processor().process_file(file_path)
}

pub fn create_processor() -> FileProcessor {
    FileProcessor::from_preferences(&FileProcessorPreferences::default())
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

pub fn should_halt_on_error(error: &FileProcessorError) -> bool {
    error.requires_halt()
}

pub fn get_error_code(error: &FileProcessorError) -> Code {
    error.error_code()
}
