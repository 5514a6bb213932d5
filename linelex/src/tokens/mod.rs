//! Token data model and line-grouped token storage
//!
//! - [`Token`]: text plus a numeric id derived from it by an [`IdFunction`]
//! - [`LineRecord`]: one source line with its verbatim text and tokens
//! - [`CombiningRule`]: start/end delimiters of a region captured as one token
//! - [`TokenStream`]: the records of one tokenization, with a cached token count
//! - [`Cursor`] and friends: flattened traversal across line boundaries
//!
//! ```
//! use linelex::tokens::{LineRecord, Token, TokenStream};
//!
//! let stream = TokenStream::new(vec![
//!     LineRecord::new(1, "a b\n", vec![Token::new("a"), Token::new("b"), Token::new("\n")]),
//! ]);
//!
//! let mut cursor = stream.begin();
//! let mut texts = Vec::new();
//! while cursor != stream.end() {
//!     texts.push(cursor.current_token().unwrap().into_text());
//!     cursor.advance().unwrap();
//! }
//! assert_eq!(texts, vec!["a", "b", "\n"]);
//! ```

pub mod cursor;
pub mod token;
pub mod token_stream;

pub use cursor::{
    Backward, Cursor, CursorMut, CursorPosition, Direction, Forward, RawCursor, ReverseCursor,
    ReverseCursorMut, StreamAccess,
};
pub use token::{
    fnv1a_32, fnv1a_64, CombiningRule, IdFunction, LineRecord, RuleConfig, Token, TokenId,
};
pub use token_stream::{TokenStream, TokenStreamError, Tokens};
