//! Diagnostic codes and their classification
//!
//! Every code emitted by linelex is declared here together with its metadata.
//! Lookups for unknown codes fall back to neutral defaults instead of failing.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Code wrapper shared by error, warning and success events
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
        f.write_str(self.0)
    }
}

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

/// Behavioral metadata attached to a code
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

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Raw-text acquisition failures
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
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// Tokenizer diagnostics and tokenizer configuration loading
pub mod lexical {
    use super::Code;

    pub const SOURCE_UNAVAILABLE: Code = Code::new("E020");
    pub const UNTERMINATED_REGION: Code = Code::new("W021");
    pub const TOKEN_COUNT_THRESHOLD: Code = Code::new("W022");
    pub const REGION_LENGTH_THRESHOLD: Code = Code::new("W023");
    pub const CONFIG_READ_FAILURE: Code = Code::new("E030");
    pub const CONFIG_PARSE_FAILURE: Code = Code::new("E031");
}

/// Token stream access violations
pub mod token_stream {
    use super::Code;

    pub const CURSOR_OUT_OF_RANGE: Code = Code::new("E040");
    pub const LINE_INDEX_OUT_OF_RANGE: Code = Code::new("E041");
    pub const EMPTY_LINE_RECORD: Code = Code::new("E042");
}

pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const CONFIGURATION_LOADED: Code = Code::new("I030");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

const fn entry(
    code: &'static str,
    category: &'static str,
    severity: Severity,
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
) -> ErrorMetadata {
    ErrorMetadata {
        code,
        category,
        severity,
        recoverable,
        requires_halt,
        description,
        recommended_action,
    }
}

#[rustfmt::skip]
const METADATA: &[ErrorMetadata] = &[
    // System
    entry("ERR001", "System", Severity::Critical, false, true,
        "Critical internal error", "File a bug report with the input that triggered it"),
    entry("ERR002", "System", Severity::Critical, false, true,
        "Logging or runtime initialization failed", "Check environment configuration"),

    // File processing
    entry("E005", "FileProcessing", Severity::Medium, false, true,
        "File not found at specified path", "Check the path and ensure the file exists"),
    entry("E006", "FileProcessing", Severity::Low, true, false,
        "File extension is not in the allowed list", "Rename the file or adjust LINELEX_ALLOWED_EXTENSIONS"),
    entry("E007", "FileProcessing", Severity::Medium, false, true,
        "File exceeds maximum size limit", "Split the input or build with a larger profile limit"),
    entry("E008", "FileProcessing", Severity::Medium, false, true,
        "File is empty and empty files are rejected", "Provide content or unset LINELEX_REJECT_EMPTY_FILES"),
    entry("E009", "FileProcessing", Severity::Medium, false, true,
        "Permission denied accessing file", "Check file permissions"),
    entry("E010", "FileProcessing", Severity::Medium, false, true,
        "File is not valid UTF-8", "Convert the file to UTF-8"),
    entry("E011", "FileProcessing", Severity::High, false, true,
        "I/O error while reading file", "Check storage health and retry"),
    entry("E012", "FileProcessing", Severity::Medium, false, true,
        "Path does not name a regular file", "Pass a path to a regular file"),
    entry("E013", "FileProcessing", Severity::Medium, false, true,
        "File exceeds maximum line count", "Split the input or build with a larger profile limit"),

    // Lexical
    entry("E020", "Lexical", Severity::High, false, true,
        "Source text could not be obtained", "Resolve the underlying file processing error"),
    entry("W021", "Lexical", Severity::Low, true, false,
        "Input ended inside a delimited region", "Close the region or check the combining rules"),
    entry("W022", "Lexical", Severity::Low, true, false,
        "Token count crossed the warning threshold", "Consider splitting the input"),
    entry("W023", "Lexical", Severity::Low, true, false,
        "Captured region crossed the length warning threshold", "Check for a missing end delimiter"),
    entry("E030", "Configuration", Severity::High, false, true,
        "Tokenizer configuration file could not be read", "Check the --config path"),
    entry("E031", "Configuration", Severity::High, false, true,
        "Tokenizer configuration file is not valid TOML", "Fix the configuration syntax"),

    // Token stream
    entry("E040", "TokenStream", Severity::High, false, true,
        "Cursor moved past either end of the stream", "Compare against end() or rend() before stepping"),
    entry("E041", "TokenStream", Severity::Medium, false, true,
        "Line index beyond the number of records", "Check line_count() before indexing"),
    entry("E042", "TokenStream", Severity::Medium, true, false,
        "Line record without tokens cannot be stored", "Drop the record instead of storing it"),

    // Success
    entry("I001", "Success", Severity::Low, true, false,
        "Operation completed successfully", "No action required"),
    entry("I004", "Success", Severity::Low, true, false,
        "Logging initialized", "No action required"),
    entry("I006", "FileProcessing", Severity::Low, true, false,
        "File read and validated", "Continue to tokenization"),
    entry("I020", "Lexical", Severity::Low, true, false,
        "Tokenization completed", "No action required"),
    entry("I030", "Configuration", Severity::Low, true, false,
        "Tokenizer configuration loaded", "No action required"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| METADATA.iter().map(|meta| (meta.code, meta)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
