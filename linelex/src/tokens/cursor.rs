//! Bidirectional cursors over a `TokenStream`
//!
//! A cursor walks the flattened token sequence in line order. Positions are either a
//! concrete (line, token) pair or one of two sentinels: `PastLast` terminates forward
//! traversal and `BeforeFirst` terminates reverse traversal. Records without tokens
//! are skipped in both directions.

use super::token::{LineRecord, Token};
use super::token_stream::{TokenStream, TokenStreamError};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorPosition {
    BeforeFirst,
    At { line: usize, token: usize },
    PastLast,
}

fn tokens_in(lines: &[LineRecord], line: usize) -> usize {
    lines.get(line).map_or(0, LineRecord::len)
}

pub(crate) fn first_position(lines: &[LineRecord]) -> CursorPosition {
    lines
        .iter()
        .position(|record| !record.is_empty())
        .map_or(CursorPosition::PastLast, |line| CursorPosition::At {
            line,
            token: 0,
        })
}

pub(crate) fn last_position(lines: &[LineRecord]) -> CursorPosition {
    lines
        .iter()
        .rposition(|record| !record.is_empty())
        .map_or(CursorPosition::BeforeFirst, |line| CursorPosition::At {
            line,
            token: lines[line].len() - 1,
        })
}

/// Next position in line order; `None` when already past the last token
pub(crate) fn step_forward(lines: &[LineRecord], position: CursorPosition) -> Option<CursorPosition> {
    match position {
        CursorPosition::BeforeFirst => Some(first_position(lines)),
        CursorPosition::At { line, token } if token + 1 < tokens_in(lines, line) => {
            Some(CursorPosition::At {
                line,
                token: token + 1,
            })
        }
        CursorPosition::At { line, .. } => {
            let rest = lines.get(line + 1..).unwrap_or_default();
            Some(
                rest.iter()
                    .position(|record| !record.is_empty())
                    .map_or(CursorPosition::PastLast, |offset| CursorPosition::At {
                        line: line + 1 + offset,
                        token: 0,
                    }),
            )
        }
        CursorPosition::PastLast => None,
    }
}

/// Previous position in line order; `None` when already before the first token
pub(crate) fn step_backward(
    lines: &[LineRecord],
    position: CursorPosition,
) -> Option<CursorPosition> {
    match position {
        CursorPosition::PastLast => Some(last_position(lines)),
        CursorPosition::At { line, token } if token > 0 => Some(CursorPosition::At {
            line,
            token: token - 1,
        }),
        CursorPosition::At { line, .. } => {
            let head = &lines[..line.min(lines.len())];
            Some(
                head.iter()
                    .rposition(|record| !record.is_empty())
                    .map_or(CursorPosition::BeforeFirst, |previous| CursorPosition::At {
                        line: previous,
                        token: head[previous].len() - 1,
                    }),
            )
        }
        CursorPosition::BeforeFirst => None,
    }
}

pub(crate) fn token_at(lines: &[LineRecord], position: CursorPosition) -> Option<&Token> {
    match position {
        CursorPosition::At { line, token } => lines.get(line)?.tokens.get(token),
        _ => None,
    }
}

// ============================================================================
// Directions
// ============================================================================

/// Traversal direction of a cursor
pub trait Direction {
    /// Where a fresh cursor starts
    fn start(lines: &[LineRecord]) -> CursorPosition;
    /// The terminal sentinel for this direction
    fn sentinel() -> CursorPosition;
    fn advance(lines: &[LineRecord], position: CursorPosition) -> Option<CursorPosition>;
    fn retreat(lines: &[LineRecord], position: CursorPosition) -> Option<CursorPosition>;
}

#[derive(Debug, Clone, Copy)]
pub struct Forward;

#[derive(Debug, Clone, Copy)]
pub struct Backward;

impl Direction for Forward {
    fn start(lines: &[LineRecord]) -> CursorPosition {
        first_position(lines)
    }

    fn sentinel() -> CursorPosition {
        CursorPosition::PastLast
    }

    fn advance(lines: &[LineRecord], position: CursorPosition) -> Option<CursorPosition> {
        step_forward(lines, position)
    }

    fn retreat(lines: &[LineRecord], position: CursorPosition) -> Option<CursorPosition> {
        step_backward(lines, position).filter(|p| *p != CursorPosition::BeforeFirst)
    }
}

impl Direction for Backward {
    fn start(lines: &[LineRecord]) -> CursorPosition {
        last_position(lines)
    }

    fn sentinel() -> CursorPosition {
        CursorPosition::BeforeFirst
    }

    fn advance(lines: &[LineRecord], position: CursorPosition) -> Option<CursorPosition> {
        step_backward(lines, position)
    }

    fn retreat(lines: &[LineRecord], position: CursorPosition) -> Option<CursorPosition> {
        step_forward(lines, position).filter(|p| *p != CursorPosition::PastLast)
    }
}

// ============================================================================
// Stream access
// ============================================================================

/// Shared or exclusive borrow of the stream a cursor walks
pub trait StreamAccess {
    fn stream(&self) -> &TokenStream;
}

impl StreamAccess for &TokenStream {
    fn stream(&self) -> &TokenStream {
        self
    }
}

impl StreamAccess for &mut TokenStream {
    fn stream(&self) -> &TokenStream {
        self
    }
}

// ============================================================================
// Cursor
// ============================================================================

pub struct RawCursor<S, D> {
    stream: S,
    position: CursorPosition,
    direction: PhantomData<D>,
}

pub type Cursor<'a> = RawCursor<&'a TokenStream, Forward>;
pub type ReverseCursor<'a> = RawCursor<&'a TokenStream, Backward>;
pub type CursorMut<'a> = RawCursor<&'a mut TokenStream, Forward>;
pub type ReverseCursorMut<'a> = RawCursor<&'a mut TokenStream, Backward>;

impl<S: StreamAccess, D: Direction> RawCursor<S, D> {
    pub(crate) fn start(stream: S) -> Self {
        let position = D::start(stream.stream().lines());
        Self::at(stream, position)
    }

    pub(crate) fn sentinel(stream: S) -> Self {
        Self::at(stream, D::sentinel())
    }

    fn at(stream: S, position: CursorPosition) -> Self {
        Self {
            stream,
            position,
            direction: PhantomData,
        }
    }

    fn lines(&self) -> &[LineRecord] {
        self.stream.stream().lines()
    }

    pub fn position(&self) -> CursorPosition {
        self.position
    }

    /// True at this direction's terminal sentinel
    pub fn is_end(&self) -> bool {
        self.position == D::sentinel()
    }

    /// Step one token in the cursor's direction
    pub fn advance(&mut self) -> Result<(), TokenStreamError> {
        self.position = D::advance(self.lines(), self.position).ok_or(TokenStreamError::OutOfRange)?;
        Ok(())
    }

    /// Step one token against the cursor's direction
    pub fn retreat(&mut self) -> Result<(), TokenStreamError> {
        self.position = D::retreat(self.lines(), self.position).ok_or(TokenStreamError::OutOfRange)?;
        Ok(())
    }

    /// Step `n` tokens forward; the cursor is left untouched if any step fails
    pub fn advance_by(&mut self, n: usize) -> Result<(), TokenStreamError> {
        let lines = self.lines();
        let mut position = self.position;
        for _ in 0..n {
            position = D::advance(lines, position).ok_or(TokenStreamError::OutOfRange)?;
        }
        self.position = position;
        Ok(())
    }

    /// Step `n` tokens backward; the cursor is left untouched if any step fails
    pub fn retreat_by(&mut self, n: usize) -> Result<(), TokenStreamError> {
        let lines = self.lines();
        let mut position = self.position;
        for _ in 0..n {
            position = D::retreat(lines, position).ok_or(TokenStreamError::OutOfRange)?;
        }
        self.position = position;
        Ok(())
    }

    /// Token under the cursor, `None` at a sentinel
    pub fn get(&self) -> Option<&Token> {
        token_at(self.lines(), self.position)
    }

    pub fn current_token(&self) -> Result<Token, TokenStreamError> {
        self.get().cloned().ok_or(TokenStreamError::OutOfRange)
    }

    /// Record containing the token under the cursor
    pub fn current_line(&self) -> Result<LineRecord, TokenStreamError> {
        match self.position {
            CursorPosition::At { line, .. } => self.stream.stream().line(line).cloned(),
            _ => Err(TokenStreamError::OutOfRange),
        }
    }
}

impl<D: Direction> RawCursor<&mut TokenStream, D> {
    /// Swap the record under the cursor for `record`
    ///
    /// The stream's size is recounted and the token index is clamped into the new
    /// record, so the cursor stays on the same line.
    pub fn replace_current_line(&mut self, record: LineRecord) -> Result<LineRecord, TokenStreamError> {
        let CursorPosition::At { line, token } = self.position else {
            return Err(TokenStreamError::OutOfRange);
        };

        let replacement_len = record.len();
        let previous = self.stream.replace_line(line, record)?;
        self.position = CursorPosition::At {
            line,
            token: token.min(replacement_len - 1),
        };
        Ok(previous)
    }
}

impl<S, D> PartialEq for RawCursor<S, D> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl<S, D> fmt::Debug for RawCursor<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCursor")
            .field("position", &self.position)
            .finish()
    }
}

impl<D> Clone for RawCursor<&TokenStream, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for RawCursor<&TokenStream, D> {}

/// Panics when the move leaves the stream; use `advance_by` to handle that case
impl<D: Direction> Add<usize> for RawCursor<&TokenStream, D> {
    type Output = Self;

    fn add(mut self, n: usize) -> Self {
        if let Err(e) = self.advance_by(n) {
            panic!("cursor + {}: {}", n, e);
        }
        self
    }
}

/// Panics when the move leaves the stream; use `retreat_by` to handle that case
impl<D: Direction> Sub<usize> for RawCursor<&TokenStream, D> {
    type Output = Self;

    fn sub(mut self, n: usize) -> Self {
        if let Err(e) = self.retreat_by(n) {
            panic!("cursor - {}: {}", n, e);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn record(line_number: usize, texts: &[&str]) -> LineRecord {
        LineRecord::new(
            line_number,
            texts.concat(),
            texts.iter().map(|t| Token::new(*t)).collect(),
        )
    }

    fn sample() -> TokenStream {
        TokenStream::new(vec![
            record(1, &["a", "b", "\n"]),
            record(2, &["c", "\n"]),
        ])
    }

    fn walk_forward(stream: &TokenStream) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = stream.begin();
        while cursor != stream.end() {
            out.push(cursor.current_token().unwrap().into_text());
            cursor.advance().unwrap();
        }
        out
    }

    #[test]
    fn test_forward_walk_visits_every_token() {
        let stream = sample();
        assert_eq!(walk_forward(&stream), vec!["a", "b", "\n", "c", "\n"]);
    }

    #[test]
    fn test_reverse_walk_is_mirror_image() {
        let stream = sample();
        let mut out = Vec::new();
        let mut cursor = stream.rbegin();
        while cursor != stream.rend() {
            out.push(cursor.current_token().unwrap().into_text());
            cursor.advance().unwrap();
        }
        assert_eq!(out, vec!["\n", "c", "\n", "b", "a"]);
    }

    #[test]
    fn test_begin_advanced_size_times_is_end() {
        let stream = sample();
        assert_eq!(stream.begin() + stream.size(), stream.end());
        assert_eq!(stream.rbegin() + stream.size(), stream.rend());
        assert_eq!(stream.end() - stream.size(), stream.begin());
    }

    #[test]
    fn test_begin_plus_n_is_flattened_index_n() {
        use crate::lexical::{Tokenizer, TokenizerConfig};

        let stream = Tokenizer::from_config(&TokenizerConfig::c_like())
            .tokenize_to_stream("int x = 1; // one\n\nif (x >= 1) {\n  y = \"a b\";\n}\n");
        assert!(stream.line_count() > 1);

        for n in 0..stream.size() {
            let cursor = stream.begin() + n;
            assert_eq!(cursor.get(), stream.nth_token(n), "index {}", n);
        }
        assert_eq!(stream.begin() + stream.size(), stream.end());
    }

    #[test]
    fn test_empty_stream_begin_equals_end() {
        let stream = TokenStream::default();
        assert_eq!(stream.begin(), stream.end());
        assert_eq!(stream.rbegin(), stream.rend());
        assert!(stream.begin().is_end());
    }

    #[test]
    fn test_advance_past_end_fails() {
        let stream = sample();
        let mut cursor = stream.end();
        assert_matches!(cursor.advance(), Err(TokenStreamError::OutOfRange));

        let mut reverse = stream.rend();
        assert_matches!(reverse.advance(), Err(TokenStreamError::OutOfRange));
    }

    #[test]
    fn test_retreat_before_begin_fails() {
        let stream = sample();
        let mut cursor = stream.begin();
        assert_matches!(cursor.retreat(), Err(TokenStreamError::OutOfRange));
        assert_eq!(cursor, stream.begin());

        let mut reverse = stream.rbegin();
        assert_matches!(reverse.retreat(), Err(TokenStreamError::OutOfRange));
    }

    #[test]
    fn test_retreat_from_end_reaches_last_token() {
        let stream = sample();
        let mut cursor = stream.end();
        cursor.retreat().unwrap();
        assert_eq!(cursor.position(), CursorPosition::At { line: 1, token: 1 });
        assert_eq!(cursor.get().map(Token::text), Some("\n"));
    }

    #[test]
    fn test_bulk_moves_are_atomic() {
        let stream = sample();
        let mut cursor = stream.begin();

        cursor.advance_by(3).unwrap();
        assert_eq!(cursor.get().map(Token::text), Some("c"));

        assert_matches!(cursor.advance_by(10), Err(TokenStreamError::OutOfRange));
        assert_eq!(cursor.get().map(Token::text), Some("c"));

        cursor.retreat_by(2).unwrap();
        assert_eq!(cursor.get().map(Token::text), Some("b"));
        assert_matches!(cursor.retreat_by(2), Err(TokenStreamError::OutOfRange));
        assert_eq!(cursor.get().map(Token::text), Some("b"));
    }

    #[test]
    #[should_panic]
    fn test_operator_move_out_of_range_panics() {
        let stream = sample();
        let _ = stream.begin() + (stream.size() + 1);
    }

    #[test]
    fn test_dereference_at_sentinel_fails() {
        let stream = sample();
        assert!(stream.end().get().is_none());
        assert_matches!(stream.end().current_token(), Err(TokenStreamError::OutOfRange));
        assert_matches!(stream.rend().current_line(), Err(TokenStreamError::OutOfRange));
    }

    #[test]
    fn test_current_line() {
        let stream = sample();
        let cursor = stream.begin() + 3;
        assert_eq!(cursor.current_line().unwrap().line_number, 2);
    }

    #[test]
    fn test_cursors_skip_records_without_tokens() {
        let stream = TokenStream::new(vec![record(1, &["a"]), record(2, &[]), record(3, &["b"])]);
        assert_eq!(walk_forward(&stream), vec!["a", "b"]);

        let mut reverse = stream.rbegin();
        reverse.advance().unwrap();
        assert_eq!(reverse.get().map(Token::text), Some("a"));
    }

    #[test]
    fn test_replace_current_line_through_mutable_cursor() {
        let mut stream = sample();
        {
            let mut cursor = stream.begin_mut();
            cursor.advance_by(2).unwrap();

            let previous = cursor.replace_current_line(record(1, &["z"])).unwrap();
            assert_eq!(previous.len(), 3);
            assert_eq!(cursor.position(), CursorPosition::At { line: 0, token: 0 });
            assert_eq!(cursor.get().map(Token::text), Some("z"));

            cursor.advance().unwrap();
            assert_eq!(cursor.get().map(Token::text), Some("c"));
        }
        assert_eq!(stream.size(), 3);
        assert_eq!(walk_forward(&stream), vec!["z", "c", "\n"]);
    }

    #[test]
    fn test_replace_current_line_rejects_empty_record() {
        let mut stream = sample();
        let mut cursor = stream.rbegin_mut();
        assert_matches!(
            cursor.replace_current_line(record(2, &[])),
            Err(TokenStreamError::EmptyLine { index: 1 })
        );

        let mut end = stream.end_mut();
        assert_matches!(
            end.replace_current_line(record(9, &["x"])),
            Err(TokenStreamError::OutOfRange)
        );
    }
}
