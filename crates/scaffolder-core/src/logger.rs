//! Prefix-tagged logger handed to each pipeline component

use colored::Colorize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
enum Sink {
    Stderr,
    Capture(Arc<Mutex<Vec<(Level, String)>>>),
}

/// Logger capability
///
/// Cheap to clone; every clone writes to the same sink. Lines are printed as
/// `[<prefix>] message` with the prefix in blue.
#[derive(Debug, Clone)]
pub struct Logger {
    prefix: String,
    sink: Sink,
}

impl Logger {
    /// Logger writing to stderr
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sink: Sink::Stderr,
        }
    }

    /// Logger that records lines in memory instead of printing them
    pub fn capture(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sink: Sink::Capture(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::Info, message.as_ref());
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.emit(Level::Success, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(Level::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::Error, message.as_ref());
    }

    /// Recorded lines for a capturing logger, empty otherwise
    pub fn lines(&self) -> Vec<(Level, String)> {
        match &self.sink {
            Sink::Stderr => Vec::new(),
            Sink::Capture(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
        }
    }

    /// True if any recorded line at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|(l, line)| *l == level && line.contains(needle))
    }

    fn emit(&self, level: Level, message: &str) {
        match &self.sink {
            Sink::Stderr => {
                let tag = format!("[{}]", self.prefix);
                let tag = tag.as_str().blue();
                let body = match level {
                    Level::Info => message.normal(),
                    Level::Success => message.green(),
                    Level::Warn => message.yellow(),
                    Level::Error => message.red(),
                };
                eprintln!("{} {}", tag, body);
            }
            Sink::Capture(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push((level, message.to_string()));
                }
            }
        }
    }
}
