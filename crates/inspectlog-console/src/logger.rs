//! The message pipeline.
//!
//! A [`Logger`] turns a [`Template`] into a [`LogMessage`] by describing each
//! value once, then hands the message to a [`MessageSink`]. Prefixed child
//! loggers decorate their parent's sink with an extra tag.
//!
//! # Example
//!
//! ```
//! use inspectlog_console::testing::CaptureSink;
//! use inspectlog_console::{ColorName, Logger, Tag, template};
//!
//! let capture = CaptureSink::new();
//! let logger = Logger::new(capture.clone());
//! let db = logger.prefix(Tag::new("db", ColorName::Blue));
//!
//! db.info(template!("connected to {}", "primary"));
//! capture.assert_contains("[INFO][db] connected to \"primary\"");
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use inspectlog_core::{DescribeOptions, describe_with};

use crate::level::LogLevel;
use crate::message::{Content, LogMessage, Tag};
use crate::template::{Part, Template};

/// Destination for finished messages.
pub trait MessageSink: Send + Sync {
    fn send_message(&self, message: LogMessage);
}

impl<S: MessageSink + ?Sized> MessageSink for Arc<S> {
    fn send_message(&self, message: LogMessage) {
        (**self).send_message(message);
    }
}

/// Shared minimum importance below which messages are dropped.
///
/// Clones share the same setting, so a threshold handed to several loggers
/// adjusts all of them at once.
#[derive(Clone, Default)]
pub struct Threshold(Arc<AtomicU8>);

impl Threshold {
    /// A threshold letting through messages of at least `importance`.
    #[must_use]
    pub fn new(importance: u8) -> Self {
        Self(Arc::new(AtomicU8::new(importance)))
    }

    /// A threshold letting through `level` and anything more important.
    #[must_use]
    pub fn at(level: LogLevel) -> Self {
        Self::new(level.importance())
    }

    #[must_use]
    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, importance: u8) {
        self.0.store(importance, Ordering::Relaxed);
    }

    pub fn set_level(&self, level: LogLevel) {
        self.set(level.importance());
    }

    /// Whether a message at `level` passes.
    #[must_use]
    pub fn allows(&self, level: LogLevel) -> bool {
        level.importance() >= self.get()
    }
}

impl fmt::Debug for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Threshold").field(&self.get()).finish()
    }
}

/// Builds messages from templates and dispatches them.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn MessageSink>,
    threshold: Threshold,
    describe_options: DescribeOptions,
}

impl Logger {
    /// A logger writing to `sink` with a threshold that lets everything
    /// through.
    #[must_use]
    pub fn new(sink: impl MessageSink + 'static) -> Self {
        Self::from_shared(Arc::new(sink))
    }

    /// A logger writing to an already shared sink.
    #[must_use]
    pub fn from_shared(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            sink,
            threshold: Threshold::default(),
            describe_options: DescribeOptions::default(),
        }
    }

    /// Use an existing threshold handle.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the truncation thresholds used when describing values.
    #[must_use]
    pub fn with_describe_options(mut self, options: DescribeOptions) -> Self {
        self.describe_options = options;
        self
    }

    #[must_use]
    pub fn threshold(&self) -> &Threshold {
        &self.threshold
    }

    /// A child logger that tags each message with `tag` before passing it to
    /// this logger's sink. Relayed messages pass through untagged.
    ///
    /// The child shares this logger's threshold.
    #[must_use]
    pub fn prefix(&self, tag: Tag) -> Logger {
        Logger {
            sink: Arc::new(PrefixSink {
                parent: Arc::clone(&self.sink),
                tag,
            }),
            threshold: self.threshold.clone(),
            describe_options: self.describe_options,
        }
    }

    /// Builds and dispatches a message unless `level` is below the
    /// threshold. Nothing is described for suppressed messages.
    pub fn log(&self, level: LogLevel, template: impl Into<Template>) {
        if !self.threshold.allows(level) {
            return;
        }
        let content = template
            .into()
            .into_parts()
            .into_iter()
            .map(|part| match part {
                Part::Text(text) => Content::Text(text),
                Part::Value(value) => {
                    Content::Description(describe_with(&value, &self.describe_options))
                }
            })
            .collect();
        self.send_message(LogMessage::new(level, content));
    }

    /// Dispatches a finished message as is.
    pub fn send_message(&self, message: LogMessage) {
        self.sink.send_message(message);
    }

    pub fn debug(&self, template: impl Into<Template>) {
        self.log(LogLevel::Debug, template);
    }

    pub fn conn(&self, template: impl Into<Template>) {
        self.log(LogLevel::Conn, template);
    }

    pub fn info(&self, template: impl Into<Template>) {
        self.log(LogLevel::Info, template);
    }

    pub fn warn(&self, template: impl Into<Template>) {
        self.log(LogLevel::Warn, template);
    }

    pub fn error(&self, template: impl Into<Template>) {
        self.log(LogLevel::Error, template);
    }

    pub fn crit(&self, template: impl Into<Template>) {
        self.log(LogLevel::Crit, template);
    }
}

impl MessageSink for Logger {
    fn send_message(&self, message: LogMessage) {
        Logger::send_message(self, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .field("describe_options", &self.describe_options)
            .finish_non_exhaustive()
    }
}

struct PrefixSink {
    parent: Arc<dyn MessageSink>,
    tag: Tag,
}

impl MessageSink for PrefixSink {
    fn send_message(&self, mut message: LogMessage) {
        if !message.is_relayed() {
            message.prefix.insert(0, self.tag.clone());
        }
        self.parent.send_message(message);
    }
}
