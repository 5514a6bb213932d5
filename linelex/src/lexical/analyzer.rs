//! Rule-driven tokenizer
//!
//! Characters are classified in a fixed order: individual characters (newline is
//! always one), then special alphabets, then separators, then everything else. A
//! token that matches a combining rule's start text switches the scanner into
//! capture mode, where raw characters are collected until the rule's end text.

use super::config::{ConfigError, TokenizerConfig};
use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::{FileProcessingResult, FileProcessorError};
use crate::logging::codes;
use crate::tokens::{CombiningRule, IdFunction, LineRecord, Token, TokenStream};
use crate::{log_debug, log_success, log_warning};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Source '{path}' is unavailable: {source}")]
    SourceUnavailable {
        path: String,
        source: FileProcessorError,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::SourceUnavailable { .. } => codes::lexical::SOURCE_UNAVAILABLE,
            LexerError::Configuration(e) => e.error_code(),
        }
    }
}

/// Counters for the most recent tokenization
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub total_lines: usize,
    /// Lines that produced no tokens and therefore no record
    pub dropped_lines: usize,
    pub captured_regions: usize,
    pub unterminated_regions: usize,
    /// Length in characters of the longest token
    pub longest_token: usize,
    /// Regions opened per rule start text
    pub rule_usage: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    fn record_token(&mut self, text: &str, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        if preferences.collect_detailed_metrics {
            self.longest_token = self.longest_token.max(text.chars().count());
        }
    }

    fn record_rule(&mut self, start: &str, preferences: &LexicalPreferences) {
        if !preferences.track_rule_usage {
            return;
        }
        if let Some(count) = self.rule_usage.get_mut(start) {
            *count += 1;
        } else if self.rule_usage.len() < MAX_TRACKED_RULES {
            self.rule_usage.insert(start.to_string(), 1);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    special_alphabets: Vec<Vec<char>>,
    individual_chars: Vec<char>,
    combining_rules: Vec<CombiningRule>,
    separators: Vec<char>,
    id_function: IdFunction,
    preferences: LexicalPreferences,
    metrics: LexicalMetrics,
}

impl Tokenizer {
    /// Tokenizer with no classes: every line becomes one token plus its newline
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TokenizerConfig) -> Self {
        let mut tokenizer = Self::new();
        tokenizer.set_special_alphabets(&config.special_alphabets);
        tokenizer.set_individual_chars(&config.individual_chars);
        tokenizer.set_separators(&config.separators);
        tokenizer.set_combining_rules(config.combining_rules.iter().map(CombiningRule::from).collect());
        tokenizer
    }

    pub fn with_preferences(mut self, preferences: LexicalPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_id_function(mut self, id_function: IdFunction) -> Self {
        self.id_function = id_function;
        self
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    pub fn set_special_alphabets<S: AsRef<str>>(&mut self, groups: &[S]) {
        self.special_alphabets = groups
            .iter()
            .map(|group| group.as_ref().chars().collect())
            .collect();
    }

    pub fn add_special_alphabet(&mut self, group: &str) {
        self.special_alphabets.push(group.chars().collect());
    }

    pub fn set_individual_chars(&mut self, chars: &str) {
        self.individual_chars = chars.chars().collect();
    }

    pub fn add_individual_chars(&mut self, chars: &str) {
        self.individual_chars.extend(chars.chars());
    }

    pub fn set_separators(&mut self, chars: &str) {
        self.separators = chars.chars().collect();
    }

    pub fn add_separators(&mut self, chars: &str) {
        self.separators.extend(chars.chars());
    }

    pub fn set_combining_rules(&mut self, rules: Vec<CombiningRule>) {
        self.combining_rules = rules;
    }

    pub fn add_combining_rule(&mut self, rule: CombiningRule) {
        self.combining_rules.push(rule);
    }

    pub fn set_id_function(&mut self, id_function: IdFunction) {
        self.id_function = id_function;
    }

    pub fn special_alphabets(&self) -> &[Vec<char>] {
        &self.special_alphabets
    }

    pub fn individual_chars(&self) -> &[char] {
        &self.individual_chars
    }

    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    pub fn combining_rules(&self) -> &[CombiningRule] {
        &self.combining_rules
    }

    pub fn id_function(&self) -> &IdFunction {
        &self.id_function
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    /// Metrics of the most recent call to `tokenize`
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    fn alphabet_of(&self, c: char) -> Option<usize> {
        self.special_alphabets
            .iter()
            .position(|group| group.contains(&c))
    }

    fn rule_starting(&self, text: &str) -> Option<&CombiningRule> {
        self.combining_rules
            .iter()
            .find(|rule| rule.start.text() == text)
    }

    // ------------------------------------------------------------------------
    // Tokenization
    // ------------------------------------------------------------------------

    /// Split `text` into line records. Never fails; lines without tokens are dropped
    /// but still advance the line number.
    pub fn tokenize(&mut self, text: &str) -> Vec<LineRecord> {
        log_debug!("Starting tokenization",
            "chars" => text.chars().count(),
            "rules" => self.combining_rules.len()
        );

        let (records, metrics) = Scanner::new(self, text).run();
        self.metrics = metrics;
        self.report(records.len());
        records
    }

    pub fn tokenize_to_stream(&mut self, text: &str) -> TokenStream {
        TokenStream::new(self.tokenize(text))
    }

    pub fn tokenize_file_result(&mut self, file_result: &FileProcessingResult) -> TokenStream {
        log_debug!("Tokenizing file",
            "file" => file_result.metadata.path.display(),
            "lines" => file_result.metadata.line_count
        );
        self.tokenize_to_stream(&file_result.source)
    }

    /// Read `path` through the file processor and tokenize its contents
    pub fn tokenize_file<P: AsRef<Path>>(&mut self, path: P) -> Result<TokenStream, LexerError> {
        let path = path.as_ref();
        let file_result =
            crate::file_processor::process_file(path).map_err(|source| {
                LexerError::SourceUnavailable {
                    path: path.display().to_string(),
                    source,
                }
            })?;
        Ok(self.tokenize_file_result(&file_result))
    }

    fn report(&self, record_count: usize) {
        let metrics = &self.metrics;

        if self.preferences.warn_on_thresholds
            && metrics.total_tokens > TOKEN_COUNT_WARNING_THRESHOLD
        {
            log_warning!(codes::lexical::TOKEN_COUNT_THRESHOLD, "Token count above warning threshold",
                "tokens" => metrics.total_tokens,
                "threshold" => TOKEN_COUNT_WARNING_THRESHOLD
            );
        }

        log_success!(
            codes::success::TOKENIZATION_COMPLETE,
            "Tokenization completed",
            "tokens" => metrics.total_tokens,
            "records" => record_count,
            "dropped_lines" => metrics.dropped_lines,
            "regions" => metrics.captured_regions
        );
    }
}

/// Tail comparison of a capture buffer against an end delimiter. Both are walked from
/// the back until either runs out, so a buffer shorter than the delimiter can match.
fn ends_with_delimiter(buffer: &str, end: &str) -> bool {
    !buffer.is_empty()
        && buffer
            .chars()
            .rev()
            .zip(end.chars().rev())
            .all(|(a, b)| a == b)
}

/// Single-use state for one tokenization pass
struct Scanner<'a> {
    tokenizer: &'a Tokenizer,
    chars: Chars<'a>,
    buffer: String,
    original: String,
    tokens: Vec<Token>,
    line_number: usize,
    records: Vec<LineRecord>,
    metrics: LexicalMetrics,
}

impl<'a> Scanner<'a> {
    fn new(tokenizer: &'a Tokenizer, text: &'a str) -> Self {
        Self {
            tokenizer,
            chars: text.chars(),
            buffer: String::new(),
            original: String::new(),
            tokens: Vec::new(),
            line_number: 1,
            records: Vec::new(),
            metrics: LexicalMetrics::default(),
        }
    }

    fn run(mut self) -> (Vec<LineRecord>, LexicalMetrics) {
        while let Some(c) = self.chars.next() {
            self.original.push(c);
            self.classify(c);

            if self.original.ends_with('\n') {
                self.close_line();
            }
        }

        self.flush(None);
        if !self.original.is_empty() || !self.tokens.is_empty() {
            self.close_line();
        }

        (self.records, self.metrics)
    }

    fn classify(&mut self, c: char) {
        let tokenizer = self.tokenizer;

        if c == '\n' || tokenizer.individual_chars.contains(&c) {
            if !self.flush(Some(c)) {
                let text = c.to_string();
                let rule = tokenizer.rule_starting(&text);
                self.emit(text);
                if let Some(rule) = rule {
                    self.capture(rule, None);
                }
            }
        } else if let Some(group) = tokenizer.alphabet_of(c) {
            let boundary = self
                .buffer
                .chars()
                .last()
                .is_some_and(|last| tokenizer.alphabet_of(last) != Some(group));
            if boundary && self.flush(Some(c)) {
                return;
            }
            self.buffer.push(c);
        } else if tokenizer.separators.contains(&c) {
            self.flush(Some(c));
        } else {
            self.buffer.push(c);
        }
    }

    /// Emit the buffer as a token. Returns true when the token opened a region and
    /// `trigger` was taken as its first character.
    fn flush(&mut self, trigger: Option<char>) -> bool {
        if self.buffer.is_empty() {
            return false;
        }

        let tokenizer = self.tokenizer;
        let text = std::mem::take(&mut self.buffer);
        let rule = tokenizer.rule_starting(&text);
        self.emit(text);

        match rule {
            Some(rule) => {
                self.capture(rule, trigger);
                true
            }
            None => false,
        }
    }

    fn emit(&mut self, text: String) {
        self.metrics.record_token(&text, &self.tokenizer.preferences);
        self.tokens
            .push(Token::with_id_function(text, self.tokenizer.id_function.clone()));
    }

    fn capture(&mut self, rule: &CombiningRule, seed: Option<char>) {
        let tokenizer = self.tokenizer;
        let preferences = &tokenizer.preferences;
        let end = rule.end.text();
        let start_line = self.line_number;

        self.metrics.record_rule(rule.start.text(), preferences);

        let mut region: String = seed.into_iter().collect();
        let mut terminated = ends_with_delimiter(&region, end);
        while !terminated {
            let Some(c) = self.chars.next() else {
                break;
            };
            region.push(c);
            self.original.push(c);
            terminated = ends_with_delimiter(&region, end);
        }

        if !terminated {
            self.metrics.unterminated_regions += 1;
            if !region.is_empty() {
                self.emit(region);
            }
            if preferences.warn_on_unterminated_region {
                log_warning!(codes::lexical::UNTERMINATED_REGION, "Input ended inside a delimited region",
                    line = start_line,
                    "start" => rule.start.text().escape_debug(),
                    "end" => end.escape_debug()
                );
            }
            return;
        }

        let keep = region
            .chars()
            .count()
            .saturating_sub(end.chars().count());
        let content: String = region.chars().take(keep).collect();

        if preferences.warn_on_thresholds && keep > REGION_LENGTH_WARNING_THRESHOLD {
            log_warning!(codes::lexical::REGION_LENGTH_THRESHOLD, "Delimited region above length threshold",
                line = start_line,
                "length" => keep,
                "threshold" => REGION_LENGTH_WARNING_THRESHOLD
            );
        }

        if !content.is_empty() {
            self.emit(content);
        }
        self.emit(end.to_string());
        self.metrics.captured_regions += 1;
    }

    fn close_line(&mut self) {
        let original = std::mem::take(&mut self.original);
        let tokens = std::mem::take(&mut self.tokens);

        self.metrics.total_lines += 1;
        if tokens.is_empty() {
            self.metrics.dropped_lines += 1;
        } else {
            self.records
                .push(LineRecord::new(self.line_number, original, tokens));
        }
        self.line_number += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::fnv1a_64;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const PROGRAM: &str = "hello world\n\
        10 * name\n\
        \n\
        return\tfalse;\n\
        if (age >= 18) then goodbay!\n\
        \"some text\"\n\
        // some comment\n\
        /* one more comment\nnext comment line*/";

    fn test_preferences() -> LexicalPreferences {
        LexicalPreferences {
            collect_detailed_metrics: true,
            track_rule_usage: true,
            warn_on_unterminated_region: true,
            warn_on_thresholds: true,
        }
    }

    fn c_like() -> Tokenizer {
        Tokenizer::from_config(&TokenizerConfig::c_like()).with_preferences(test_preferences())
    }

    fn texts(records: &[LineRecord]) -> Vec<Vec<&str>> {
        records.iter().map(LineRecord::texts).collect()
    }

    #[test]
    fn test_words_and_newline() {
        let records = c_like().tokenize("hello world\n");

        assert_eq!(texts(&records), vec![vec!["hello", "world", "\n"]]);
        assert_eq!(records[0].line_number, 1);
        assert_eq!(records[0].original, "hello world\n");
        assert_eq!(records[0].tokens[0].id(), fnv1a_64("hello"));
    }

    #[test]
    fn test_alphabet_and_separators() {
        assert_eq!(
            texts(&c_like().tokenize("10 * name\n")),
            vec![vec!["10", "*", "name", "\n"]]
        );
        assert_eq!(
            texts(&c_like().tokenize("return\tfalse;\n")),
            vec![vec!["return", "false", ";", "\n"]]
        );
    }

    #[test]
    fn test_alphabet_group_boundaries() {
        assert_eq!(
            texts(&c_like().tokenize("if (age >= 18) then goodbay!\n")),
            vec![vec!["if", "(", "age", ">=", "18", ")", "then", "goodbay", "!", "\n"]]
        );
    }

    #[test]
    fn test_distinct_alphabets_split() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.set_special_alphabets(&["+-", "<>"]);
        tokenizer.set_separators(" ");

        assert_eq!(
            texts(&tokenizer.tokenize("a+-<>b\n")),
            vec![vec!["a", "+-", "<>b", "\n"]]
        );
    }

    #[test]
    fn test_single_newline() {
        let records = c_like().tokenize("\n");
        assert_eq!(texts(&records), vec![vec!["\n"]]);
        assert_eq!(records[0].original, "\n");
    }

    #[test]
    fn test_newline_is_a_token_without_configuration() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.set_separators(" ");
        assert_eq!(
            texts(&tokenizer.tokenize("a b\nc")),
            vec![vec!["a", "b", "\n"], vec!["c"]]
        );
    }

    #[test]
    fn test_quoted_string() {
        let records = c_like().tokenize("\"some text\"\n");
        assert_eq!(texts(&records), vec![vec!["\"", "some text", "\"", "\n"]]);
        assert_eq!(records[0].original, "\"some text\"\n");
    }

    #[test]
    fn test_empty_quoted_string() {
        assert_eq!(
            texts(&c_like().tokenize("\"\";\n")),
            vec![vec!["\"", "\"", ";", "\n"]]
        );
    }

    #[test]
    fn test_line_comment_keeps_separator() {
        assert_eq!(
            texts(&c_like().tokenize("// some comment\n")),
            vec![vec!["//", " some comment", "\n"]]
        );
    }

    #[test]
    fn test_line_comment_with_alphabet_slash() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.set_special_alphabets(&["/"]);
        tokenizer.set_separators(" ");
        tokenizer.add_combining_rule(CombiningRule::new("//", "\n"));

        assert_eq!(
            texts(&tokenizer.tokenize("// c\n")),
            vec![vec!["//", " c", "\n"]]
        );
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let input = "/* one more comment\nnext comment line*/";
        let records = c_like().tokenize(input);

        assert_eq!(
            texts(&records),
            vec![vec!["/*", " one more comment\nnext comment line", "*/"]]
        );
        assert_eq!(records[0].line_number, 1);
        assert_eq!(records[0].original, input);
    }

    #[test]
    fn test_full_program() {
        let mut tokenizer = c_like();
        let stream = tokenizer.tokenize_to_stream(PROGRAM);

        assert_eq!(stream.size(), 32);
        assert_eq!(stream.line_count(), 8);

        let numbers: Vec<usize> = stream.lines().iter().map(|r| r.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(stream[2].texts(), vec!["\n"]);
        assert_eq!(stream[6].texts(), vec!["//", " some comment", "\n"]);

        let metrics = tokenizer.metrics();
        assert_eq!(metrics.total_tokens, 32);
        assert_eq!(metrics.captured_regions, 3);
        assert_eq!(metrics.unterminated_regions, 0);
        assert_eq!(metrics.rule_usage.get("\""), Some(&1));
        assert_eq!(metrics.rule_usage.get("/*"), Some(&1));
    }

    #[test]
    fn test_originals_reproduce_input() {
        let records = c_like().tokenize(PROGRAM);
        let joined: String = records.iter().map(|r| r.original.as_str()).collect();
        assert_eq!(joined, PROGRAM);
    }

    #[test]
    fn test_tokenizing_twice_is_idempotent() {
        let mut tokenizer = c_like();
        let first = tokenizer.tokenize_to_stream(PROGRAM);
        let second = tokenizer.tokenize_to_stream(PROGRAM);
        assert_eq!(first, second);
        assert_eq!(tokenizer.metrics().total_tokens, 32);
    }

    #[test]
    fn test_trailing_line_without_tokens_is_dropped() {
        let mut tokenizer = c_like();
        let records = tokenizer.tokenize("a\n   ");

        assert_eq!(texts(&records), vec![vec!["a", "\n"]]);
        assert_eq!(tokenizer.metrics().total_lines, 2);
        assert_eq!(tokenizer.metrics().dropped_lines, 1);
    }

    #[test]
    fn test_whitespace_only_line_keeps_its_newline() {
        let records = c_like().tokenize("a;\n   \nb;\n");
        let numbers: Vec<usize> = records.iter().map(|r| r.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(records[1].texts(), vec!["\n"]);
        assert_eq!(records[1].original, "   \n");
    }

    #[test]
    fn test_unterminated_region_keeps_partial_content() {
        let mut tokenizer = c_like();
        let records = tokenizer.tokenize("x = \"open");

        assert_eq!(texts(&records), vec![vec!["x", "=", "\"", "open"]]);
        assert_eq!(tokenizer.metrics().unterminated_regions, 1);
        assert_eq!(tokenizer.metrics().captured_regions, 0);
    }

    #[test]
    fn test_no_trailing_newline_keeps_last_character() {
        assert_eq!(texts(&c_like().tokenize("abc")), vec![vec!["abc"]]);
        assert_eq!(texts(&c_like().tokenize("a;")), vec![vec!["a", ";"]]);
    }

    #[test]
    fn test_carriage_return_is_ordinary() {
        assert_eq!(
            texts(&c_like().tokenize("a\r\n")),
            vec![vec!["a\r", "\n"]]
        );
    }

    #[test]
    fn test_empty_input() {
        let mut tokenizer = c_like();
        assert!(tokenizer.tokenize("").is_empty());
        assert_eq!(tokenizer.metrics(), &LexicalMetrics::default());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.set_individual_chars("'");
        tokenizer.add_combining_rule(CombiningRule::new("'", "'"));
        tokenizer.add_combining_rule(CombiningRule::new("'", "\n"));

        assert_eq!(
            texts(&tokenizer.tokenize("'a b' c\n")),
            vec![vec!["'", "a b", "'", " c", "\n"]]
        );
    }

    #[test]
    fn test_overlapping_classes_resolve_by_classification_order() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.set_special_alphabets(&["+=", "=<"]);
        tokenizer.set_individual_chars(";");
        tokenizer.set_separators("; ");

        // ';' is individual before separator, '=' belongs to the first group
        assert_eq!(
            texts(&tokenizer.tokenize("a+=<b;c\n")),
            vec![vec!["a", "+=", "<b", ";", "c", "\n"]]
        );
    }

    #[test]
    fn test_custom_id_function() {
        let mut tokenizer = c_like().with_id_function(IdFunction::new(|text| text.len() as u64));
        let records = tokenizer.tokenize("abc;\n");
        let ids: Vec<u64> = records[0].tokens.iter().map(Token::id).collect();
        assert_eq!(ids, vec![3, 1, 1]);
    }

    #[test]
    fn test_configuration_unchanged_by_tokenize() {
        let mut tokenizer = c_like();
        let before = TokenizerConfig::c_like();
        tokenizer.tokenize(PROGRAM);

        assert_eq!(tokenizer.special_alphabets().len(), before.special_alphabets.len());
        assert_eq!(
            tokenizer.individual_chars().iter().collect::<String>(),
            before.individual_chars
        );
        assert_eq!(tokenizer.combining_rules().len(), 3);
    }

    #[test]
    fn test_rule_usage_not_tracked_by_default_preference() {
        let mut preferences = test_preferences();
        preferences.track_rule_usage = false;
        let mut tokenizer =
            Tokenizer::from_config(&TokenizerConfig::c_like()).with_preferences(preferences);

        tokenizer.tokenize(PROGRAM);
        assert!(tokenizer.metrics().rule_usage.is_empty());
        assert_eq!(tokenizer.metrics().longest_token, " one more comment\nnext comment line".chars().count());
    }

    #[test]
    fn test_tokenize_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("program.txt");
        fs::write(&path, PROGRAM).unwrap();

        let stream = c_like().tokenize_file(&path).unwrap();
        assert_eq!(stream.size(), 32);
    }

    #[test]
    fn test_tokenize_missing_file() {
        let dir = tempdir().unwrap();
        let result = c_like().tokenize_file(dir.path().join("missing.txt"));

        assert_matches!(
            result,
            Err(LexerError::SourceUnavailable {
                source: FileProcessorError::FileNotFound { .. },
                ..
            })
        );
    }

    #[test]
    fn test_error_codes() {
        let error = LexerError::Configuration(ConfigError::Parse {
            message: "bad".to_string(),
        });
        assert_eq!(error.error_code().as_str(), "E031");
    }
}
