// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Accepted file extensions, lowercase without the dot. Empty accepts any file.
    pub allowed_extensions: Vec<String>,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,

    /// Whether a zero-byte file is rejected instead of producing an empty stream
    pub reject_empty_files: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            allowed_extensions: env::var(env_vars::ALLOWED_EXTENSIONS)
                .ok()
                .map(|v| parse_extension_list(&v))
                .unwrap_or_default(),
            enable_performance_logging: env::var(env_vars::ENABLE_PERFORMANCE_LOGGING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            reject_empty_files: env::var(env_vars::REJECT_EMPTY_FILES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether to collect per-token metrics (longest token, individual counts)
    pub collect_detailed_metrics: bool,

    /// Whether to count how often each combining rule opened a region
    pub track_rule_usage: bool,

    /// Whether to emit a warning when input ends inside a delimited region
    pub warn_on_unterminated_region: bool,

    /// Whether to emit warnings when soft size thresholds are crossed
    pub warn_on_thresholds: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env::var(env_vars::LEXICAL_DETAILED_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            track_rule_usage: env::var(env_vars::LEXICAL_TRACK_RULE_USAGE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            warn_on_unterminated_region: env::var(env_vars::LEXICAL_WARN_UNTERMINATED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            warn_on_thresholds: env::var(env_vars::LEXICAL_WARN_THRESHOLDS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the loggers
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            log_performance_events: env::var(env_vars::LOGGING_LOG_PERFORMANCE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            enable_cargo_style_output: env::var(env_vars::LOGGING_CARGO_STYLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_file_context: env::var(env_vars::LOGGING_INCLUDE_FILE_CONTEXT)
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

/// Parse log level from string (used for environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Split a comma separated extension list, dropping dots and empty entries
fn parse_extension_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const ALLOWED_EXTENSIONS: &str = "LINELEX_ALLOWED_EXTENSIONS";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "LINELEX_ENABLE_PERFORMANCE_LOGGING";
    pub const REJECT_EMPTY_FILES: &str = "LINELEX_REJECT_EMPTY_FILES";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "LINELEX_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_TRACK_RULE_USAGE: &str = "LINELEX_LEXICAL_TRACK_RULE_USAGE";
    pub const LEXICAL_WARN_UNTERMINATED: &str = "LINELEX_LEXICAL_WARN_UNTERMINATED";
    pub const LEXICAL_WARN_THRESHOLDS: &str = "LINELEX_LEXICAL_WARN_THRESHOLDS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "LINELEX_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "LINELEX_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "LINELEX_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "LINELEX_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "LINELEX_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "LINELEX_LOGGING_INCLUDE_FILE_CONTEXT";
}
