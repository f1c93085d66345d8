//! Terminal output.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use inspectlog_core::logging::targets;
use inspectlog_core::{
    AnsiColor, ColorName, Colorize, FormatOptions, InspectError, InspectResult, PlainColor,
};
use log::debug;
use time::{OffsetDateTime, format_description};

use crate::config::ConsoleConfig;
use crate::detection::DisplayContext;
use crate::logger::MessageSink;
use crate::message::{LogMessage, format_message};

type Writer = Mutex<Box<dyn Write + Send>>;

/// Writes rendered messages to stdout (log role) and stderr (warn and error
/// roles).
///
/// Human contexts get ANSI colors; agent contexts get plain text.
pub struct ConsoleSink {
    out: Writer,
    err: Writer,
    context: DisplayContext,
    line_limit: usize,
    timestamps: bool,
}

impl ConsoleSink {
    /// A sink on the process's stdout and stderr.
    #[must_use]
    pub fn new(context: DisplayContext) -> Self {
        Self::with_writers(context, io::stdout(), io::stderr())
    }

    /// A sink using the context, line limit and timestamp setting of
    /// `config`.
    #[must_use]
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::new(config.resolve_context())
            .with_line_limit(config.line_limit)
            .with_timestamps(config.timestamps)
    }

    /// A sink on arbitrary writers.
    #[must_use]
    pub fn with_writers(
        context: DisplayContext,
        out: impl Write + Send + 'static,
        err: impl Write + Send + 'static,
    ) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
            context,
            line_limit: 50,
            timestamps: false,
        }
    }

    #[must_use]
    pub fn with_line_limit(mut self, line_limit: usize) -> Self {
        self.line_limit = line_limit;
        self
    }

    /// Prefix each line with the UTC time as `HH:MM:SS`.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Renders a message the way it would be written, without the trailing
    /// newline.
    #[must_use]
    pub fn render(&self, message: &LogMessage) -> String {
        let color: &dyn Colorize = if self.context.is_human() {
            &AnsiColor
        } else {
            &PlainColor
        };
        let options = FormatOptions::new(color).with_line_limit(self.line_limit);
        let line = format_message(message, &options);
        match self.timestamp() {
            Some(ts) => format!("{} {line}", color.paint(&ts, &ColorName::Gray.into())),
            None => line,
        }
    }

    fn timestamp(&self) -> Option<String> {
        if !self.timestamps {
            return None;
        }
        let now = OffsetDateTime::now_utc();
        let fmt = format_description::parse("[hour]:[minute]:[second]").ok()?;
        now.format(&fmt).ok()
    }
}

impl ConsoleSink {
    /// Renders and writes one message to the stream its level's role selects.
    pub fn write_message(&self, message: &LogMessage) -> InspectResult<()> {
        let mut line = self.render(message);
        line.push('\n');
        let writer = if message.level.role().is_stderr() {
            &self.err
        } else {
            &self.out
        };
        let mut writer = writer
            .lock()
            .map_err(|_| InspectError::io("console writer lock poisoned"))?;
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl MessageSink for ConsoleSink {
    fn send_message(&self, message: LogMessage) {
        if let Err(err) = self.write_message(&message) {
            debug!(target: targets::SINK, "dropping {} message: {err}", message.level);
        }
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("context", &self.context)
            .field("line_limit", &self.line_limit)
            .field("timestamps", &self.timestamps)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use crate::logger::Logger;
    use crate::template;
    use regex::Regex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sink(context: DisplayContext) -> (ConsoleSink, Shared, Shared) {
        let out = Shared::default();
        let err = Shared::default();
        (
            ConsoleSink::with_writers(context, out.clone(), err.clone()),
            out,
            err,
        )
    }

    #[test]
    fn routes_by_role() {
        let (sink, out, err) = sink(DisplayContext::Agent);
        let logger = Logger::new(sink);
        logger.info("hello");
        logger.warn("careful");
        logger.crit("down");

        assert_eq!(out.text(), "[INFO] hello\n");
        assert_eq!(err.text(), "[WARN] careful\n[crit] down\n");
    }

    #[test]
    fn human_context_is_colored() {
        let (sink, out, _) = sink(DisplayContext::Human);
        Logger::new(sink).info(template!("n = {}", 5));
        assert_eq!(
            out.text(),
            "[\u{1b}[96mINFO\u{1b}[0m] n = \u{1b}[93m5\u{1b}[0m\n"
        );
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_reported_not_raised() {
        let out = Shared::default();
        let sink = ConsoleSink::with_writers(DisplayContext::Agent, out.clone(), Closed);

        let err = sink
            .write_message(&LogMessage::new(LogLevel::Error, Vec::new()))
            .unwrap_err();
        assert_eq!(err.code, inspectlog_core::ErrorCode::Io);
        assert!(err.message.contains("closed"));

        let logger = Logger::new(sink);
        logger.error("lost");
        logger.info("kept");
        assert_eq!(out.text(), "[INFO] kept\n");
    }

    #[test]
    fn timestamps_prefix_the_line() {
        let (sink, _, _) = sink(DisplayContext::Agent);
        let sink = sink.with_timestamps(true);
        let line = sink.render(&LogMessage::new(LogLevel::Info, Vec::new()));
        let re = Regex::new(r"^\d{2}:\d{2}:\d{2} \[INFO\] $").unwrap();
        assert!(re.is_match(&line), "unexpected line {line:?}");
    }

    #[test]
    fn line_limit_is_applied() {
        let (sink, out, _) = sink(DisplayContext::Agent);
        let sink = sink.with_line_limit(4);
        Logger::new(sink).info(template!("{}", vec![10, 20, 30]));
        assert_eq!(out.text(), "[INFO] [\n  10\n  20\n  30\n]\n");
    }
}
