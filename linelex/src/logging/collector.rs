//! Per-file event collection with cargo-style reporting
//!
//! The CLI tokenizes several files in one run; errors and warnings raised while a
//! file context is active are grouped here and rendered after the run.

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

/// Thread-safe store of events keyed by file path
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a file so it is counted even if it produces no events
    pub fn record_file_context(&self, context: &FileProcessingContext) {
        self.events().entry(context.file_path.clone()).or_default();
    }

    /// Store an event; past the per-file limit a single overflow warning is kept
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.events();
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events().get(file_path).cloned().unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events()
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        self.events()
            .get(file_path)
            .is_some_and(|events| events.iter().any(|e| e.is_error()))
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.events().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.events();

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
                summary.successful_files += 1;
            } else {
                summary.successful_files += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn total_event_count(&self) -> usize {
        self.events().values().map(Vec::len).sum()
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn push_context_lines(output: &mut String, event: &LogEvent) {
    let mut entries: Vec<(&String, &String)> = event
        .context
        .iter()
        .filter(|(key, _)| key.as_str() != "file" && key.as_str() != "file_id")
        .collect();
    entries.sort();
    for (key, value) in entries {
        output.push_str(&format!("  = {}: {}\n", key, value));
    }
}

/// Render collected diagnostics the way cargo prints compiler output
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let reported: Vec<&LogEvent> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reported.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in reported {
            let kind = if event.is_error() { "error" } else { "warning" };
            output.push_str(&format!("{}[{}]: {}\n", kind, event.code, event.message));

            let location = match event.line {
                Some(line) => format!("{}:{}", file_path.display(), line),
                None => file_path.display().to_string(),
            };
            output.push_str(&format!("  --> {}\n", location));

            if event.is_error() {
                output.push_str(&format!(
                    "  = severity: {}, category: {}\n",
                    event.severity(),
                    event.category()
                ));
            }

            push_context_lines(&mut output, event);

            if event.is_error() {
                output.push_str(&format!("  = help: {}\n", event.recommended_action()));
            }
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    output.push_str(&format!(
        "Processed {} file(s): {} ok, {} failed",
        summary.total_files, summary.successful_files, summary.failed_files
    ));
    if summary.total_warnings > 0 {
        output.push_str(&format!(", {} warning(s)", summary.total_warnings));
    }
    output.push('\n');

    output
}
