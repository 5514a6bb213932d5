//! Rendering of token streams for the terminal

use clap::ValueEnum;
use linelex::tokens::{CursorPosition, Direction, RawCursor};
use linelex::{TokenStream, TokenStreamError};
use serde_json::json;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One row per line record
    Text,
    /// Pretty-printed JSON records
    Json,
    /// One token per row, walked with a cursor
    Tokens,
}

/// `<line> | "tok" "tok" ...`, optionally under a `==> path <==` header
pub fn render_text(path: &Path, stream: &TokenStream, with_header: bool) -> String {
    let mut out = String::new();
    if with_header {
        out.push_str(&format!("==> {} <==\n", path.display()));
    }

    for record in stream.lines() {
        let tokens: Vec<String> = record
            .tokens
            .iter()
            .map(|token| format!("{:?}", token.text()))
            .collect();
        out.push_str(&format!("{:>4} | {}\n", record.line_number, tokens.join(" ")));
    }
    out
}

pub fn render_json(path: &Path, stream: &TokenStream) -> Result<String, serde_json::Error> {
    let document = json!({
        "file": path.display().to_string(),
        "token_count": stream.size(),
        "lines": stream.lines(),
    });
    let mut rendered = serde_json::to_string_pretty(&document)?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn render_tokens(stream: &TokenStream, reverse: bool) -> Result<String, TokenStreamError> {
    let mut out = String::new();
    if reverse {
        walk(stream, stream.rbegin(), stream.rend(), &mut out)?;
    } else {
        walk(stream, stream.begin(), stream.end(), &mut out)?;
    }
    Ok(out)
}

fn walk<D: Direction>(
    stream: &TokenStream,
    mut cursor: RawCursor<&TokenStream, D>,
    end: RawCursor<&TokenStream, D>,
    out: &mut String,
) -> Result<(), TokenStreamError> {
    while cursor != end {
        let CursorPosition::At { line, .. } = cursor.position() else {
            return Err(TokenStreamError::OutOfRange);
        };
        let token = cursor.current_token()?;
        out.push_str(&format!(
            "{}\t{:?}\n",
            stream.line(line)?.line_number,
            token.text()
        ));
        cursor.advance()?;
    }
    Ok(())
}
