//! Token, line record and combining rule data model
//!
//! A token carries its text and a numeric id derived from that text by a pluggable
//! id function. Token identity is the id alone: two tokens with colliding ids compare
//! equal even when their text differs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub type TokenId = u64;

const FNV64_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV64_PRIME: u64 = 0x0000_0100_0000_01b3;
const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// 64-bit FNV-1a over the text's code points
pub fn fnv1a_64(text: &str) -> TokenId {
    text.chars().fold(FNV64_OFFSET_BASIS, |hash, c| {
        (hash ^ c as u64).wrapping_mul(FNV64_PRIME)
    })
}

/// 32-bit FNV-1a over the text's code points
pub fn fnv1a_32(text: &str) -> u32 {
    text.chars().fold(FNV32_OFFSET_BASIS, |hash, c| {
        (hash ^ c as u32).wrapping_mul(FNV32_PRIME)
    })
}

/// Text-to-id strategy shared by a tokenizer and every token it creates
#[derive(Clone)]
pub struct IdFunction(Arc<dyn Fn(&str) -> TokenId + Send + Sync>);

impl IdFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> TokenId + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn fnv1a_64() -> Self {
        Self::new(fnv1a_64)
    }

    pub fn compute(&self, text: &str) -> TokenId {
        (self.0)(text)
    }
}

impl Default for IdFunction {
    fn default() -> Self {
        Self::fnv1a_64()
    }
}

impl fmt::Debug for IdFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdFunction(..)")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Token {
    id: TokenId,
    text: String,
    #[serde(skip)]
    id_function: IdFunction,
}

impl Token {
    /// Token hashed with the default FNV-1a 64 id function
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id_function(text, IdFunction::default())
    }

    pub fn with_id_function(text: impl Into<String>, id_function: IdFunction) -> Self {
        let text = text.into();
        Self {
            id: id_function.compute(&text),
            text,
            id_function,
        }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Replace the text and recompute the id with this token's id function
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.id = self.id_function.compute(&self.text);
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Token::new(text)
    }
}

/// One source line: its 1-based number, verbatim text, and tokens
#[derive(Debug, Clone, Serialize)]
pub struct LineRecord {
    pub line_number: usize,
    /// Source text of the line including its newline; spans several physical
    /// lines when a delimited region crosses them
    pub original: String,
    pub tokens: Vec<Token>,
}

impl LineRecord {
    pub fn new(line_number: usize, original: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            line_number,
            original: original.into(),
            tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(Token::text).collect()
    }
}

/// Records compare by line number and tokens; `original` is ignored
impl PartialEq for LineRecord {
    fn eq(&self, other: &Self) -> bool {
        self.line_number == other.line_number && self.tokens == other.tokens
    }
}

impl Eq for LineRecord {}

/// Start/end delimiter pair for a region captured verbatim (strings, comments)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombiningRule {
    pub start: Token,
    pub end: Token,
}

impl CombiningRule {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: Token::new(start),
            end: Token::new(end),
        }
    }
}

/// Serializable form of a combining rule used in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub start: String,
    pub end: String,
}

impl From<&RuleConfig> for CombiningRule {
    fn from(rule: &RuleConfig) -> Self {
        CombiningRule::new(&rule.start, &rule.end)
    }
}
