//! # linelex CLI
//!
//! Tokenizes one or more files with a built-in preset or a TOML rule file and prints
//! the resulting line records.

mod output;

use clap::{Parser, ValueEnum};
use linelex::config::runtime::LoggingPreferences;
use linelex::lexical::{self, LexerError, Tokenizer, TokenizerConfig};
use linelex::logging::{self, codes};
use linelex::{log_error, log_info, log_success};
use output::OutputFormat;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// C-style operators, strings and comments
    CLike,
    /// Whitespace-separated words
    Plain,
}

impl Preset {
    fn config(self) -> TokenizerConfig {
        match self {
            Preset::CLike => TokenizerConfig::c_like(),
            Preset::Plain => TokenizerConfig::plain(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "linelex", version)]
#[command(about = "Split files into line-grouped tokens")]
struct Args {
    /// Files to tokenize
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Tokenizer rules as TOML; takes precedence over --preset
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Preset::CLike)]
    preset: Preset,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Walk tokens from last to first (tokens format)
    #[arg(long)]
    reverse: bool,

    /// Emit log events as JSON on stderr
    #[arg(long)]
    structured_logs: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging(args.structured_logs).map_err(initialization_failure)?;
    log_info!("linelex starting", "files" => args.files.len());

    let mut tokenizer = build_tokenizer(&args)?;
    let start = Instant::now();
    let mut failed = 0;

    for (index, path) in args.files.iter().enumerate() {
        let result = logging::with_file_context(path.clone(), index + 1, || {
            tokenize_one(&mut tokenizer, path, &args)
        });

        match result {
            Ok(rendered) => print!("{}", rendered),
            Err(e) => {
                failed += 1;
                eprintln!("error: {}: {}", path.display(), e);
            }
        }
    }

    report_finished(args.files.len(), failed, start.elapsed().as_millis());
    logging::print_cargo_style_summary();

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(structured: bool) -> Result<(), String> {
    let mut preferences = LoggingPreferences::default();
    preferences.use_structured_logging |= structured;

    logging::config::init_runtime_preferences(preferences)?;
    logging::init_global_logging()
}

fn initialization_failure(message: String) -> String {
    format!("{}: {}", codes::system::INITIALIZATION_FAILURE, message)
}

fn report_finished(files: usize, failed: usize, duration_ms: u128) {
    if failed == 0 {
        log_success!(codes::success::OPERATION_COMPLETED_SUCCESSFULLY, "linelex finished",
            "files" => files,
            "duration_ms" => duration_ms
        );
    } else {
        log_info!("linelex finished",
            "files" => files,
            "failed" => failed,
            "duration_ms" => duration_ms
        );
    }
}

fn build_tokenizer(args: &Args) -> Result<Tokenizer, LexerError> {
    let config = match &args.config {
        Some(path) => TokenizerConfig::from_file(path)?,
        None => args.preset.config(),
    };
    Ok(lexical::create_tokenizer(&config))
}

fn tokenize_one(
    tokenizer: &mut Tokenizer,
    path: &Path,
    args: &Args,
) -> Result<String, Box<dyn std::error::Error>> {
    let stream = tokenizer.tokenize_file(path).map_err(|e| {
        log_error!(e.error_code(), "Tokenization failed", "error" => &e);
        e
    })?;

    let rendered = match args.format {
        OutputFormat::Text => output::render_text(path, &stream, args.files.len() > 1),
        OutputFormat::Json => output::render_json(path, &stream)?,
        OutputFormat::Tokens => output::render_tokens(&stream, args.reverse)?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use linelex::logging::{LogLevel, LoggingService, MemoryLogger};
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["linelex", "a.c"]).unwrap();
        assert_eq!(args.files, vec![PathBuf::from("a.c")]);
        assert_eq!(args.preset, Preset::CLike);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.reverse);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_options() {
        let args = Args::try_parse_from([
            "linelex", "--preset", "plain", "--format", "tokens", "--reverse", "a", "b",
        ])
        .unwrap();
        assert_eq!(args.preset, Preset::Plain);
        assert_eq!(args.format, OutputFormat::Tokens);
        assert!(args.reverse);
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn test_files_required() {
        assert!(Args::try_parse_from(["linelex"]).is_err());
    }

    #[test]
    fn test_tokenize_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.txt");
        fs::write(&path, "one two\n").unwrap();

        let args = Args::try_parse_from(["linelex", "--preset", "plain", "x"]).unwrap();
        let mut tokenizer = build_tokenizer(&args).unwrap();
        let rendered = tokenize_one(&mut tokenizer, &path, &args).unwrap();
        assert_eq!(rendered, "   1 | \"one\" \"two\" \"\\n\"\n");
    }

    #[test]
    fn test_config_file_overrides_preset() {
        let dir = tempdir().unwrap();
        let rules = dir.path().join("rules.toml");
        fs::write(&rules, "separators = \";\"\n").unwrap();

        let args = Args::try_parse_from([
            "linelex",
            "--config",
            rules.to_str().unwrap(),
            "x",
        ])
        .unwrap();
        let tokenizer = build_tokenizer(&args).unwrap();
        assert_eq!(tokenizer.separators(), &[';']);
    }

    #[test]
    fn test_initialization_failure_carries_code() {
        let message = initialization_failure("Global logger already initialized".to_string());
        assert_eq!(message, "ERR002: Global logger already initialized");
    }

    #[test]
    fn test_clean_run_reports_success() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Debug);
        logging::init_global_logging_with_service(Arc::new(service)).unwrap();

        report_finished(2, 1, 3);
        assert!(!memory.has_success_with_code(codes::success::OPERATION_COMPLETED_SUCCESSFULLY));

        report_finished(2, 0, 3);
        assert!(memory.has_success_with_code(codes::success::OPERATION_COMPLETED_SUCCESSFULLY));
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = tempdir().unwrap();
        let args = Args::try_parse_from(["linelex", "x"]).unwrap();
        let mut tokenizer = build_tokenizer(&args).unwrap();
        assert!(tokenize_one(&mut tokenizer, &dir.path().join("absent"), &args).is_err());
    }
}
