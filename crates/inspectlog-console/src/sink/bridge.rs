//! Relaying messages across a process or thread boundary as JSON lines.
//!
//! [`BridgeSink`] encodes each message as one line of JSON on any writer.
//! [`BridgeReceiver`] decodes those lines on the other side, stamps them with
//! an origin tag and forwards them. Because descriptions are plain data, the
//! relayed message renders exactly as it would have locally.

use std::fmt;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

use inspectlog_core::logging::targets;
use inspectlog_core::{InspectError, InspectResult};
use log::{debug, trace, warn};

use crate::logger::MessageSink;
use crate::message::{LogMessage, Tag};

/// Writes each message as a single JSON line.
pub struct BridgeSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> BridgeSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Encodes and writes one message.
    pub fn write_message(&self, message: &LogMessage) -> InspectResult<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| InspectError::io("bridge writer lock poisoned"))?;
        writer.write_all(&line)?;
        writer.flush()?;
        trace!(target: targets::BRIDGE, "relayed {} message ({} bytes)", message.level, line.len());
        Ok(())
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> MessageSink for BridgeSink<W> {
    fn send_message(&self, message: LogMessage) {
        if let Err(err) = self.write_message(&message) {
            debug!(target: targets::BRIDGE, "dropping message: {err}");
        }
    }
}

impl<W: Write + Send> fmt::Debug for BridgeSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSink").finish_non_exhaustive()
    }
}

/// Decodes relayed messages and forwards them to a local sink.
#[derive(Clone)]
pub struct BridgeReceiver {
    target: Arc<dyn MessageSink>,
    origin: Option<Tag>,
}

impl BridgeReceiver {
    /// A receiver forwarding to `target`, usually a [`Logger`](crate::Logger).
    #[must_use]
    pub fn new(target: impl MessageSink + 'static) -> Self {
        Self {
            target: Arc::new(target),
            origin: None,
        }
    }

    /// Append `tag` to the origin of every received message.
    #[must_use]
    pub fn with_origin(mut self, tag: Tag) -> Self {
        self.origin = Some(tag);
        self
    }

    /// Forwards an already decoded message.
    pub fn receive(&self, mut message: LogMessage) {
        if let Some(origin) = &self.origin {
            message.origin.push(origin.clone());
        }
        self.target.send_message(message);
    }

    /// Decodes and forwards one JSON line. Blank lines are ignored.
    pub fn receive_line(&self, line: &str) -> InspectResult<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let message: LogMessage = serde_json::from_str(line)?;
        self.receive(message);
        Ok(())
    }

    /// Forwards every line of `reader`.
    ///
    /// Lines that fail to decode are logged and skipped so one bad message
    /// does not cut off the rest of the stream. Only a failing reader ends
    /// the loop early.
    pub fn receive_all<R: BufRead>(&self, reader: R) -> InspectResult<ReceiveSummary> {
        let mut summary = ReceiveSummary::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match self.receive_line(&line) {
                Ok(()) => summary.received += 1,
                Err(err) => {
                    warn!(target: targets::BRIDGE, "skipping relayed line {}: {err}", index + 1);
                    summary.rejected += 1;
                }
            }
        }
        debug!(
            target: targets::BRIDGE,
            "received {} relayed messages, rejected {}",
            summary.received,
            summary.rejected
        );
        Ok(summary)
    }
}

/// Outcome of [`BridgeReceiver::receive_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveSummary {
    /// Messages decoded and forwarded.
    pub received: usize,
    /// Non-blank lines that could not be decoded.
    pub rejected: usize,
}

impl MessageSink for BridgeReceiver {
    fn send_message(&self, message: LogMessage) {
        self.receive(message);
    }
}

impl fmt::Debug for BridgeReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeReceiver")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Logger;
    use crate::message::Content;
    use crate::testing::CaptureSink;
    use crate::{LogLevel, template};
    use inspectlog_core::{ColorName, ErrorCode, ObjectRef};

    #[test]
    fn writes_one_json_line_per_message() {
        let sink = BridgeSink::new(Vec::new());
        sink.write_message(&LogMessage::new(LogLevel::Info, vec![Content::Text("a".into())]))
            .unwrap();
        sink.write_message(&LogMessage::new(LogLevel::Warn, vec![Content::Text("b".into())]))
            .unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"level":"info","content":["a"],"prefix":[],"origin":[]}"#
        );
    }

    #[test]
    fn relay_preserves_descriptions_and_adds_origin() {
        let cyclic = ObjectRef::plain();
        cyclic.set("me", cyclic.to_value());

        let wire = Arc::new(BridgeSink::new(Vec::new()));
        let remote = Logger::from_shared(wire.clone()).prefix(Tag::new("job", ColorName::Green));
        remote.info(template!("state {}", cyclic.to_value()));
        drop(remote);

        let wire = Arc::try_unwrap(wire).ok().unwrap().into_inner();
        let capture = CaptureSink::new();
        let local = Logger::new(capture.clone()).prefix(Tag::new("main", ColorName::Blue));
        let receiver =
            BridgeReceiver::new(local).with_origin(Tag::new("worker", ColorName::Magenta));
        assert_eq!(receiver.receive_all(wire.as_slice()).unwrap().received, 1);

        let messages = capture.messages();
        assert_eq!(messages[0].origin, vec![Tag::new("worker", ColorName::Magenta)]);
        assert_eq!(messages[0].prefix, vec![Tag::new("job", ColorName::Green)]);
        capture.assert_contains("[worker][INFO][job] state { me: [circular] }");
    }

    #[test]
    fn bad_lines_are_skipped_and_counted() {
        let good = |text: &str| {
            serde_json::to_string(&LogMessage::new(
                LogLevel::Info,
                vec![Content::Text(text.into())],
            ))
            .unwrap()
        };
        let stream = format!("{}\n{{\"level\":\"loud\"}}\n\n{}\n", good("first"), good("second"));

        let capture = CaptureSink::new();
        let receiver = BridgeReceiver::new(capture.clone());
        let summary = receiver.receive_all(stream.as_bytes()).unwrap();

        assert_eq!(
            summary,
            ReceiveSummary {
                received: 2,
                rejected: 1
            }
        );
        assert_eq!(capture.output(), vec!["[INFO] first", "[INFO] second"]);
    }

    #[test]
    fn non_finite_numbers_relay_intact() {
        let wire = Arc::new(BridgeSink::new(Vec::new()));
        let remote = Logger::from_shared(wire.clone());
        remote.info(template!("ratio {}", f64::NAN));
        remote.warn(template!("bounds {} {}", f64::INFINITY, f64::NEG_INFINITY));
        remote.info(template!("after {}", 1));
        drop(remote);

        let wire = Arc::try_unwrap(wire).ok().unwrap().into_inner();
        let capture = CaptureSink::new();
        let summary = BridgeReceiver::new(capture.clone())
            .receive_all(wire.as_slice())
            .unwrap();

        assert_eq!(summary.received, 3);
        assert_eq!(summary.rejected, 0);
        assert_eq!(
            capture.output(),
            vec![
                "[INFO] ratio NaN",
                "[WARN] bounds Infinity -Infinity",
                "[INFO] after 1",
            ]
        );
    }

    #[test]
    fn malformed_lines_are_decode_errors() {
        let receiver = BridgeReceiver::new(CaptureSink::new());
        let err = receiver.receive_line("{not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::Decode);
        assert!(receiver.receive_line("   ").is_ok());
    }
}
