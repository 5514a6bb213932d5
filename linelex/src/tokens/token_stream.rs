//! Line-grouped token storage
//!
//! `TokenStream` owns the line records produced by one tokenization and caches the
//! total token count. Every mutation path goes through a method that recounts, so the
//! cache always equals the live sum.

use super::cursor::{
    self, Backward, CursorPosition, Forward, RawCursor,
};
use super::token::{LineRecord, Token};
use crate::logging::codes;
use crate::logging::Code;
use serde::Serialize;
use std::iter::FusedIterator;
use std::ops::Index;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenStream {
    lines: Vec<LineRecord>,
    #[serde(skip)]
    size: usize,
}

fn count_tokens(lines: &[LineRecord]) -> usize {
    lines.iter().map(LineRecord::len).sum()
}

impl TokenStream {
    pub fn new(lines: Vec<LineRecord>) -> Self {
        let size = count_tokens(&lines);
        Self { lines, size }
    }

    /// Replace every record at once
    pub fn set_lines(&mut self, lines: Vec<LineRecord>) {
        self.size = count_tokens(&lines);
        self.lines = lines;
    }

    /// Replace the record at `index`; records without tokens are rejected
    pub fn replace_line(
        &mut self,
        index: usize,
        record: LineRecord,
    ) -> Result<LineRecord, TokenStreamError> {
        if record.is_empty() {
            return Err(TokenStreamError::EmptyLine { index });
        }
        let line_count = self.lines.len();
        let slot = self
            .lines
            .get_mut(index)
            .ok_or(TokenStreamError::LineIndexOutOfRange { index, line_count })?;

        let previous = std::mem::replace(slot, record);
        self.size = self.size - previous.len() + self.lines[index].len();
        Ok(previous)
    }

    /// Append a record; records without tokens are rejected
    pub fn push_line(&mut self, record: LineRecord) -> Result<(), TokenStreamError> {
        if record.is_empty() {
            return Err(TokenStreamError::EmptyLine {
                index: self.lines.len(),
            });
        }
        self.size += record.len();
        self.lines.push(record);
        Ok(())
    }

    /// Total number of tokens across all lines
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn token_count(&self) -> usize {
        self.size
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Checked line access
    pub fn line(&self, index: usize) -> Result<&LineRecord, TokenStreamError> {
        self.lines
            .get(index)
            .ok_or(TokenStreamError::LineIndexOutOfRange {
                index,
                line_count: self.lines.len(),
            })
    }

    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<LineRecord> {
        self.lines
    }

    /// Token at flattened position `n`
    pub fn nth_token(&self, mut n: usize) -> Option<&Token> {
        for record in &self.lines {
            if n < record.len() {
                return record.tokens.get(n);
            }
            n -= record.len();
        }
        None
    }

    /// Flattened iteration over every token in line order
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens {
            lines: &self.lines,
            front: cursor::first_position(&self.lines),
            back: cursor::last_position(&self.lines),
            remaining: self.size,
        }
    }

    // ------------------------------------------------------------------------
    // Cursors
    // ------------------------------------------------------------------------

    pub fn begin(&self) -> RawCursor<&TokenStream, Forward> {
        RawCursor::start(self)
    }

    pub fn end(&self) -> RawCursor<&TokenStream, Forward> {
        RawCursor::sentinel(self)
    }

    pub fn rbegin(&self) -> RawCursor<&TokenStream, Backward> {
        RawCursor::start(self)
    }

    pub fn rend(&self) -> RawCursor<&TokenStream, Backward> {
        RawCursor::sentinel(self)
    }

    pub fn begin_mut(&mut self) -> RawCursor<&mut TokenStream, Forward> {
        RawCursor::start(self)
    }

    pub fn end_mut(&mut self) -> RawCursor<&mut TokenStream, Forward> {
        RawCursor::sentinel(self)
    }

    pub fn rbegin_mut(&mut self) -> RawCursor<&mut TokenStream, Backward> {
        RawCursor::start(self)
    }

    pub fn rend_mut(&mut self) -> RawCursor<&mut TokenStream, Backward> {
        RawCursor::sentinel(self)
    }
}

impl From<Vec<LineRecord>> for TokenStream {
    fn from(lines: Vec<LineRecord>) -> Self {
        Self::new(lines)
    }
}

/// Unchecked line access; panics past `line_count()`
impl Index<usize> for TokenStream {
    type Output = LineRecord;

    fn index(&self, index: usize) -> &LineRecord {
        &self.lines[index]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = Tokens<'a>;

    fn into_iter(self) -> Tokens<'a> {
        self.tokens()
    }
}

/// Double-ended iterator over the flattened token sequence
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    lines: &'a [LineRecord],
    front: CursorPosition,
    back: CursorPosition,
    remaining: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<&'a Token> {
        if self.remaining == 0 {
            return None;
        }
        let token = cursor::token_at(self.lines, self.front)?;
        self.front = cursor::step_forward(self.lines, self.front).unwrap_or(CursorPosition::PastLast);
        self.remaining -= 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Tokens<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let token = cursor::token_at(self.lines, self.back)?;
        self.back =
            cursor::step_backward(self.lines, self.back).unwrap_or(CursorPosition::BeforeFirst);
        self.remaining -= 1;
        Some(token)
    }
}

impl ExactSizeIterator for Tokens<'_> {}

impl FusedIterator for Tokens<'_> {}

/// Token stream access errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStreamError {
    /// A cursor stepped past either end of the stream, or was dereferenced at a sentinel
    OutOfRange,
    /// Checked line access beyond the number of records
    LineIndexOutOfRange { index: usize, line_count: usize },
    /// A record without tokens was offered for storage
    EmptyLine { index: usize },
}

impl TokenStreamError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::OutOfRange => codes::token_stream::CURSOR_OUT_OF_RANGE,
            Self::LineIndexOutOfRange { .. } => codes::token_stream::LINE_INDEX_OUT_OF_RANGE,
            Self::EmptyLine { .. } => codes::token_stream::EMPTY_LINE_RECORD,
        }
    }
}

impl std::fmt::Display for TokenStreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "no more tokens"),
            Self::LineIndexOutOfRange { index, line_count } => {
                write!(f, "line index {} out of range ({} lines)", index, line_count)
            }
            Self::EmptyLine { index } => {
                write!(f, "line record at index {} has no tokens", index)
            }
        }
    }
}

impl std::error::Error for TokenStreamError {}
