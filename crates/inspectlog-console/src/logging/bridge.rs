//! Routing `log` crate records into an inspectlog [`Logger`].
//!
//! # Usage
//!
//! ```ignore
//! use inspectlog_console::logging::LogBridge;
//! use inspectlog_console::{ConsoleSink, DisplayContext, Logger};
//!
//! let logger = Logger::new(ConsoleSink::new(DisplayContext::detect()));
//! LogBridge::builder()
//!     .level(log::Level::Debug)
//!     .with_targets(true)
//!     .init(logger)
//!     .expect("logger already set");
//!
//! log::info!(target: "app::db", "connected");
//! // [INFO][app::db] connected
//! ```

use inspectlog_core::ColorName;
use inspectlog_core::logging::targets;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::level::LogLevel;
use crate::logger::Logger;
use crate::message::Tag;

/// A `log` crate logger that forwards records to a [`Logger`].
///
/// Levels map `error`→error, `warn`→warn, `info`→info, and
/// `debug`/`trace`→debug. Records from inspectlog's own targets are not
/// forwarded.
#[derive(Debug)]
pub struct LogBridge {
    logger: Logger,
    min_level: Level,
    show_targets: bool,
}

impl LogBridge {
    /// Create a bridge forwarding records at `min_level` and above.
    #[must_use]
    pub fn new(logger: Logger, min_level: Level) -> Self {
        Self {
            logger,
            min_level,
            show_targets: true,
        }
    }

    /// Create a bridge using the builder pattern.
    #[must_use]
    pub fn builder() -> LogBridgeBuilder {
        LogBridgeBuilder::new()
    }

    fn target_logger(&self, target: &str) -> Logger {
        if self.show_targets && !target.is_empty() {
            self.logger.prefix(Tag::new(target, ColorName::Gray))
        } else {
            self.logger.clone()
        }
    }
}

/// Builder for configuring the log bridge.
#[derive(Debug)]
pub struct LogBridgeBuilder {
    min_level: Level,
    show_targets: bool,
}

impl Default for LogBridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBridgeBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_level: Level::Info,
            show_targets: true,
        }
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Set the minimum log level from a LevelFilter.
    #[must_use]
    pub fn level_filter(mut self, filter: LevelFilter) -> Self {
        self.min_level = filter.to_level().unwrap_or(Level::Trace);
        self
    }

    /// Set whether record targets become prefix tags.
    #[must_use]
    pub fn with_targets(mut self, show: bool) -> Self {
        self.show_targets = show;
        self
    }

    /// Build the bridge without installing it.
    #[must_use]
    pub fn build(self, logger: Logger) -> LogBridge {
        LogBridge {
            logger,
            min_level: self.min_level,
            show_targets: self.show_targets,
        }
    }

    /// Build and install as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(self, logger: Logger) -> Result<(), log::SetLoggerError> {
        let level = self.min_level;
        log::set_boxed_logger(Box::new(self.build(logger)))?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level && !metadata.target().starts_with(targets::INSPECTLOG)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let text = record.args().to_string();
        self.target_logger(record.target())
            .log(LogLevel::from(record.level()), text);
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CaptureSink;

    fn metadata(level: Level, target: &str) -> Metadata<'_> {
        Metadata::builder().level(level).target(target).build()
    }

    #[test]
    fn test_enabled_respects_level() {
        let bridge = LogBridge::new(Logger::new(CaptureSink::new()), Level::Info);
        assert!(bridge.enabled(&metadata(Level::Error, "app")));
        assert!(bridge.enabled(&metadata(Level::Info, "app")));
        assert!(!bridge.enabled(&metadata(Level::Debug, "app")));
    }

    #[test]
    fn test_own_targets_are_skipped() {
        let bridge = LogBridge::new(Logger::new(CaptureSink::new()), Level::Trace);
        assert!(!bridge.enabled(&metadata(Level::Error, targets::BRIDGE)));
    }

    #[test]
    fn test_records_become_messages() {
        let capture = CaptureSink::new();
        let bridge = LogBridge::builder()
            .level_filter(LevelFilter::Trace)
            .build(Logger::new(capture.clone()));

        bridge.log(
            &Record::builder()
                .args(format_args!("cache warmed in {}ms", 12))
                .level(Level::Trace)
                .target("app::cache")
                .build(),
        );
        bridge.log(
            &Record::builder()
                .args(format_args!("disk full"))
                .level(Level::Error)
                .target("app")
                .build(),
        );

        assert_eq!(
            capture.output(),
            vec!["[@DBG][app::cache] cache warmed in 12ms", "[ERR!][app] disk full"]
        );
    }

    #[test]
    fn test_targets_can_be_hidden() {
        let capture = CaptureSink::new();
        let bridge = LogBridge::builder()
            .with_targets(false)
            .build(Logger::new(capture.clone()));
        bridge.log(
            &Record::builder()
                .args(format_args!("plain"))
                .level(Level::Warn)
                .target("app")
                .build(),
        );
        assert_eq!(capture.output(), vec!["[WARN] plain"]);
    }

    #[test]
    fn test_logger_threshold_still_applies() {
        let capture = CaptureSink::new();
        let logger = Logger::new(capture.clone());
        logger.threshold().set_level(LogLevel::Warn);
        let bridge = LogBridge::new(logger, Level::Trace);
        bridge.log(
            &Record::builder()
                .args(format_args!("chatty"))
                .level(Level::Info)
                .target("app")
                .build(),
        );
        assert!(capture.messages().is_empty());
    }
}
