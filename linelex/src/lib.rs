//! Rule-driven, line-oriented tokenizer
//!
//! Text is split into tokens according to user-supplied character classes and
//! delimiter rules, grouped by source line, and exposed as a [`TokenStream`] with
//! flattened bidirectional cursors.
//!
//! ```
//! use linelex::{Tokenizer, TokenizerConfig};
//!
//! let mut tokenizer = Tokenizer::from_config(&TokenizerConfig::c_like());
//! let stream = tokenizer.tokenize_to_stream("if (age >= 18) then goodbay!\n");
//!
//! assert_eq!(stream.size(), 10);
//! assert_eq!(stream[0].texts()[3], ">=");
//! ```

pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;

pub use file_processor::{FileProcessingResult, FileProcessor, FileProcessorError};
pub use lexical::{ConfigError, LexerError, LexicalMetrics, Tokenizer, TokenizerConfig};
pub use tokens::{
    CombiningRule, Cursor, CursorMut, IdFunction, LineRecord, ReverseCursor, ReverseCursorMut,
    Token, TokenStream, TokenStreamError,
};
