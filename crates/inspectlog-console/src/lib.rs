//! Structured log messages for inspectlog.
//!
//! This crate builds on [`inspectlog_core`] to provide:
//!
//! - **Levels** ([`LogLevel`]) with labels, colors, and importance
//! - **Templates** ([`Template`], [`template!`]) mixing text with values
//! - **Loggers** ([`Logger`]) with shared thresholds and prefixed children
//! - **Sinks** ([`sink`]) for the console and for JSON-lines relays
//! - **Bridges** ([`logging`]) from the `log` and `tracing` facades
//! - **Configuration** ([`ConsoleConfig`]) from files and environment
//!
//! # Example
//!
//! ```
//! use inspectlog_console::testing::CaptureSink;
//! use inspectlog_console::{LogLevel, Logger, template};
//!
//! let capture = CaptureSink::new();
//! let logger = Logger::new(capture.clone());
//! logger.threshold().set_level(LogLevel::Info);
//!
//! logger.debug("hidden");
//! logger.warn(template!("retrying {} of {}", 2, 5));
//!
//! assert_eq!(capture.output(), vec!["[WARN] retrying 2 of 5"]);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod detection;
pub mod level;
pub mod logger;
pub mod logging;
pub mod message;
pub mod sink;
pub mod template;
pub mod testing;

pub use config::ConsoleConfig;
pub use detection::DisplayContext;
pub use level::{LogLevel, Role};
pub use logger::{Logger, MessageSink, Threshold};
pub use message::{Content, LogMessage, Tag, format_message};
pub use sink::{BridgeReceiver, BridgeSink, ConsoleSink, ReceiveSummary};
pub use template::{Part, Template};

pub use inspectlog_core::{ColorName, IntoValue, Value};
