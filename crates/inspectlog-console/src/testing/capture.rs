//! CaptureSink for asserting on logged output in tests
//!
//! Collects every message it receives, along with its rendered text.

use std::sync::{Arc, Mutex};

use inspectlog_core::{AnsiColor, Colorize, FormatOptions, PlainColor};
use strip_ansi_escapes::strip;

use crate::logger::MessageSink;
use crate::message::{LogMessage, format_message};

/// A sink that captures messages for testing
///
/// Clones share the same buffer, so keep one clone for assertions and hand
/// another to the logger.
#[derive(Clone)]
pub struct CaptureSink {
    buffer: Arc<Mutex<CaptureBuffer>>,
    rich: bool,
    line_limit: usize,
}

#[derive(Debug, Default)]
struct CaptureBuffer {
    messages: Vec<LogMessage>,
    /// Lines with ANSI codes stripped
    lines: Vec<String>,
    /// Lines with ANSI codes preserved
    raw_lines: Vec<String>,
}

impl CaptureSink {
    /// A capture sink that renders plain text
    #[must_use]
    pub fn new() -> Self {
        Self::new_inner(false)
    }

    /// A capture sink that renders with ANSI colors
    #[must_use]
    pub fn new_rich() -> Self {
        Self::new_inner(true)
    }

    fn new_inner(rich: bool) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(CaptureBuffer::default())),
            rich,
            line_limit: 50,
        }
    }

    /// Set the line limit used when rendering
    #[must_use]
    pub fn with_line_limit(mut self, line_limit: usize) -> Self {
        self.line_limit = line_limit;
        self
    }

    /// All captured messages
    #[must_use]
    pub fn messages(&self) -> Vec<LogMessage> {
        self.buffer
            .lock()
            .map(|b| b.messages.clone())
            .unwrap_or_default()
    }

    /// All captured output lines (ANSI codes stripped)
    #[must_use]
    pub fn output(&self) -> Vec<String> {
        self.buffer
            .lock()
            .map(|b| b.lines.clone())
            .unwrap_or_default()
    }

    /// All captured output lines (with ANSI codes)
    #[must_use]
    pub fn raw_output(&self) -> Vec<String> {
        self.buffer
            .lock()
            .map(|b| b.raw_lines.clone())
            .unwrap_or_default()
    }

    /// Output as a single string
    #[must_use]
    pub fn output_string(&self) -> String {
        self.output().join("\n")
    }

    /// Check if output contains a string (case-insensitive)
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        let output = self.output_string().to_lowercase();
        output.contains(&needle.to_lowercase())
    }

    /// Check if output contains all of the given strings
    #[must_use]
    pub fn contains_all(&self, needles: &[&str]) -> bool {
        needles.iter().all(|n| self.contains(n))
    }

    /// Check if output matches a regex pattern
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        match regex::Regex::new(pattern) {
            Ok(re) => re.is_match(&self.output_string()),
            Err(_) => false,
        }
    }

    /// Assert that output contains a string
    ///
    /// # Panics
    ///
    /// Panics if the output does not contain the needle string.
    pub fn assert_contains(&self, needle: &str) {
        assert!(
            self.contains(needle),
            "Output did not contain '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// Assert that output does NOT contain a string
    ///
    /// # Panics
    ///
    /// Panics if the output contains the needle string.
    pub fn assert_not_contains(&self, needle: &str) {
        assert!(
            !self.contains(needle),
            "Output unexpectedly contained '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// Assert output has a specific number of lines
    ///
    /// # Panics
    ///
    /// Panics if the line count doesn't match expected.
    pub fn assert_line_count(&self, expected: usize) {
        let actual = self.output().len();
        assert_eq!(
            actual, expected,
            "Expected {} lines but got {}. Actual output:\n{}",
            expected, actual, self.output_string()
        );
    }

    /// Clear the buffer
    pub fn clear(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.messages.clear();
            buf.lines.clear();
            buf.raw_lines.clear();
        }
    }

    /// Whether output is rendered with colors
    #[must_use]
    pub fn is_rich(&self) -> bool {
        self.rich
    }
}

impl Default for CaptureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSink for CaptureSink {
    fn send_message(&self, message: LogMessage) {
        let color: &dyn Colorize = if self.rich { &AnsiColor } else { &PlainColor };
        let rendered = format_message(&message, &FormatOptions::new(color).with_line_limit(self.line_limit));
        let stripped = strip(rendered.as_bytes());
        let stripped = String::from_utf8_lossy(&stripped);

        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.raw_lines.extend(rendered.lines().map(String::from));
            buffer.lines.extend(stripped.lines().map(String::from));
            buffer.messages.push(message);
        }
    }
}

impl std::fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSink")
            .field("is_rich", &self.rich)
            .field("message_count", &self.messages().len())
            .finish()
    }
}
