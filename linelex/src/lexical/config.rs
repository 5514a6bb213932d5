//! Tokenizer classification rules as data
//!
//! A `TokenizerConfig` is the serializable description of what a `Tokenizer` does
//! with each character. Character classes are written as strings of their members:
//!
//! ```toml
//! special_alphabets = ["+-/*=<>!"]
//! individual_chars = "();,\n"
//! separators = " \t"
//!
//! [[combining_rules]]
//! start = "\""
//! end = "\""
//! ```
//!
//! Nothing is validated: overlapping classes are resolved by the tokenizer's
//! classification order.

use crate::logging::codes;
use crate::tokens::RuleConfig;
use crate::{log_error, log_success};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read tokenizer configuration '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid tokenizer configuration: {message}")]
    Parse { message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ConfigError::Io { .. } => codes::lexical::CONFIG_READ_FAILURE,
            ConfigError::Parse { .. } => codes::lexical::CONFIG_PARSE_FAILURE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Ordered character groups; a character belongs to the first group containing it
    pub special_alphabets: Vec<String>,
    /// Characters that always form a single-character token
    pub individual_chars: String,
    /// Characters that end a token without becoming one
    pub separators: String,
    /// Delimited regions, tried in order
    pub combining_rules: Vec<RuleConfig>,
}

impl TokenizerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| {
            let error = ConfigError::Parse {
                message: e.to_string(),
            };
            log_error!(error.error_code(), "Tokenizer configuration could not be parsed",
                "reason" => e.message()
            );
            error
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let text = fs::read_to_string(path).map_err(|e| {
            let error = ConfigError::Io {
                path: display.clone(),
                message: e.to_string(),
            };
            log_error!(error.error_code(), "Tokenizer configuration could not be read",
                "path" => display.as_str(),
                "reason" => e
            );
            error
        })?;

        let config = Self::from_toml_str(&text)?;
        log_success!(
            codes::success::CONFIGURATION_LOADED,
            "Tokenizer configuration loaded",
            "path" => display.as_str(),
            "rules" => config.combining_rules.len()
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// C-style punctuation, operators, strings and comments
    pub fn c_like() -> Self {
        Self {
            special_alphabets: vec!["+-/*=<>!".to_string()],
            individual_chars: "&?;$#@^:\"'|.,(){}[]\n".to_string(),
            separators: " \t".to_string(),
            combining_rules: vec![
                RuleConfig {
                    start: "\"".to_string(),
                    end: "\"".to_string(),
                },
                RuleConfig {
                    start: "//".to_string(),
                    end: "\n".to_string(),
                },
                RuleConfig {
                    start: "/*".to_string(),
                    end: "*/".to_string(),
                },
            ],
        }
    }

    /// Whitespace-separated words, newline tokens only
    pub fn plain() -> Self {
        Self {
            separators: " \t\r".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let config = TokenizerConfig::from_toml_str(
            r##"
            special_alphabets = ["+-", "<>="]
            individual_chars = "();"
            separators = " "

            [[combining_rules]]
            start = "#"
            end = "\n"
            "##,
        )
        .unwrap();

        assert_eq!(config.special_alphabets, vec!["+-", "<>="]);
        assert_eq!(config.individual_chars, "();");
        assert_eq!(config.separators, " ");
        assert_eq!(config.combining_rules.len(), 1);
        assert_eq!(config.combining_rules[0].end, "\n");
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let config = TokenizerConfig::from_toml_str("separators = \" \"").unwrap();
        assert!(config.special_alphabets.is_empty());
        assert!(config.combining_rules.is_empty());
    }

    #[test]
    fn test_parse_failure() {
        let result = TokenizerConfig::from_toml_str("separators = [");
        assert_matches!(result, Err(ConfigError::Parse { .. }));
        assert_eq!(result.unwrap_err().error_code().as_str(), "E031");
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokenizer.toml");
        let toml = TokenizerConfig::c_like().to_toml_string().unwrap();
        fs::write(&path, toml).unwrap();

        let loaded = TokenizerConfig::from_file(&path).unwrap();
        assert_eq!(loaded, TokenizerConfig::c_like());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = TokenizerConfig::from_file(dir.path().join("absent.toml"));
        assert_matches!(result, Err(ConfigError::Io { .. }));
        assert_eq!(result.unwrap_err().error_code().as_str(), "E030");
    }

    #[test]
    fn test_presets() {
        let c_like = TokenizerConfig::c_like();
        assert!(c_like.individual_chars.contains('\n'));
        assert_eq!(c_like.combining_rules[1].start, "//");

        let plain = TokenizerConfig::plain();
        assert!(plain.individual_chars.is_empty());
        assert!(plain.separators.contains('\t'));
    }
}
