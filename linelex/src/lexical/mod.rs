//! Character-to-token segmentation
//!
//! [`Tokenizer`] holds the classification rules and turns text into
//! [`LineRecord`](crate::tokens::LineRecord)s. [`TokenizerConfig`] is the same
//! rule set as serializable data, loadable from TOML.

pub mod analyzer;
pub mod config;

use crate::config::runtime::LexicalPreferences;
use crate::tokens::{LineRecord, TokenStream};
use std::path::Path;

pub use analyzer::{LexerError, LexicalMetrics, Tokenizer};
pub use config::{ConfigError, TokenizerConfig};

/// Tokenizer for `config` with preferences read from the environment
pub fn create_tokenizer(config: &TokenizerConfig) -> Tokenizer {
    Tokenizer::from_config(config).with_preferences(LexicalPreferences::default())
}

pub fn create_tokenizer_with_preferences(
    config: &TokenizerConfig,
    preferences: LexicalPreferences,
) -> Tokenizer {
    Tokenizer::from_config(config).with_preferences(preferences)
}

/// One-shot tokenization of `text`
pub fn tokenize(text: &str, config: &TokenizerConfig) -> Vec<LineRecord> {
    create_tokenizer(config).tokenize(text)
}

/// One-shot tokenization of the file at `path`
pub fn tokenize_file<P: AsRef<Path>>(
    path: P,
    config: &TokenizerConfig,
) -> Result<TokenStream, LexerError> {
    create_tokenizer(config).tokenize_file(path)
}

/// Load a tokenizer configuration file and build a tokenizer from it
pub fn load_tokenizer<P: AsRef<Path>>(path: P) -> Result<Tokenizer, LexerError> {
    let config = TokenizerConfig::from_file(path)?;
    Ok(create_tokenizer(&config))
}
