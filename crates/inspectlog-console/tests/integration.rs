//! End-to-end tests of the message pipeline: templates through loggers,
//! relays, and console output.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use inspectlog_console::testing::CaptureSink;
use inspectlog_console::{
    BridgeReceiver, BridgeSink, ColorName, IntoValue, ConsoleConfig, ConsoleSink, Content, DisplayContext,
    LogLevel, Logger, Tag, Value, template,
};
use inspectlog_core::{Description, ObjectRef};

/// A writer whose bytes can be read back after the sink consumed it.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn cyclic() -> Value {
    let node = ObjectRef::plain();
    node.set("name", "root".into_value());
    node.set("self", node.to_value());
    node.to_value()
}

#[test]
fn test_template_values_are_described_once() {
    let capture = CaptureSink::new();
    let logger = Logger::new(capture.clone());

    logger.info(template!("loaded {} rows from {}", 3, "users"));

    let messages = capture.messages();
    assert_eq!(messages.len(), 1);
    let content = &messages[0].content;
    assert_eq!(content.len(), 5);
    assert_eq!(content[0], Content::Text("loaded ".to_string()));
    assert_eq!(content[1], Content::Description(Description::number(3.0)));
    assert_eq!(capture.output(), vec!["[INFO] loaded 3 rows from \"users\""]);
}

#[test]
fn test_nested_prefixes_keep_order() {
    let capture = CaptureSink::new();
    let logger = Logger::new(capture.clone());
    let worker = logger
        .prefix(Tag::new("pool", ColorName::Cyan))
        .prefix(Tag::new("w1", ColorName::Yellow));

    worker.warn("stalled");

    assert_eq!(capture.output(), vec!["[WARN][pool][w1] stalled"]);
}

#[test]
fn test_threshold_change_reaches_children() {
    let capture = CaptureSink::new();
    let logger = Logger::new(capture.clone());
    let child = logger.prefix(Tag::new("child", ColorName::Green));

    child.debug("first");
    logger.threshold().set_level(LogLevel::Error);
    child.debug("second");
    child.crit("third");

    assert_eq!(
        capture.output(),
        vec!["[@DBG][child] first", "[crit][child] third"]
    );
}

#[test]
fn test_cyclic_value_is_logged() {
    let capture = CaptureSink::new();
    let logger = Logger::new(capture.clone());

    logger.info(template!("node {}", cyclic()));

    assert_eq!(
        capture.output(),
        vec!["[INFO] node { name: \"root\", self: [circular] }"]
    );
}

#[test]
fn test_relay_through_bridge() {
    let buffer = SharedBuf::default();
    let remote = Logger::new(BridgeSink::new(buffer.clone())).prefix(Tag::new("job", ColorName::Blue));
    remote.info(template!("tree {}", cyclic()));
    remote.error("failed");

    let capture = CaptureSink::new();
    let local = Logger::new(capture.clone()).prefix(Tag::new("local", ColorName::Gray));
    let receiver = BridgeReceiver::new(local).with_origin(Tag::new("worker", ColorName::Magenta));
    let summary = receiver.receive_all(buffer.text().as_bytes()).unwrap();

    assert_eq!(summary.received, 2);
    assert_eq!(summary.rejected, 0);
    assert_eq!(
        capture.output(),
        vec![
            "[worker][INFO][job] tree { name: \"root\", self: [circular] }",
            "[worker][ERR!][job] failed",
        ]
    );
}

#[test]
fn test_relay_rejects_garbage() {
    let receiver = BridgeReceiver::new(CaptureSink::new());
    let err = receiver.receive_line("{not json").unwrap_err();
    assert!(err.message.contains("JSON"));
}

#[test]
fn test_console_sink_routes_by_role() {
    let out = SharedBuf::default();
    let err = SharedBuf::default();
    let logger = Logger::new(ConsoleSink::with_writers(
        DisplayContext::Agent,
        out.clone(),
        err.clone(),
    ));

    logger.info(template!("ready on port {}", 8080));
    logger.conn("client joined");
    logger.warn("slow");
    logger.crit("down");

    assert_eq!(
        out.text(),
        "[INFO] ready on port 8080\n[CONN] client joined\n"
    );
    assert_eq!(err.text(), "[WARN] slow\n[crit] down\n");
}

#[test]
fn test_human_console_is_colored() {
    let out = SharedBuf::default();
    let logger = Logger::new(ConsoleSink::with_writers(
        DisplayContext::Human,
        out.clone(),
        io::sink(),
    ));

    logger.info(template!("{}", "hi"));

    let text = out.text();
    assert!(text.contains("\u{1b}["));
    let plain = String::from_utf8(strip_ansi_escapes::strip(text.as_bytes())).unwrap();
    assert_eq!(plain, "[INFO] \"hi\"\n");
}

#[test]
fn test_config_drives_logger() {
    let config = ConsoleConfig::from_toml_str(
        r#"
        force_plain = true
        line_limit = 100
        threshold = "warn"
        max_elements = 4
        head = 2
        tail = 1
        "#,
    )
    .unwrap();

    let capture = CaptureSink::new().with_line_limit(config.line_limit);
    let logger = Logger::new(capture.clone())
        .with_threshold(config.threshold_handle())
        .with_describe_options(config.describe_options());

    logger.info("ignored");
    logger.warn(template!("ids {}", (0..10).collect::<Vec<i32>>()));

    assert_eq!(capture.messages().len(), 1);
    let line = capture.output_string();
    assert!(line.starts_with("[WARN] ids [ 0, 1, "));
    assert!(line.contains("7 elements skipped"));
    assert!(line.ends_with(", 9 ]"));
    assert_eq!(config.resolve_context(), DisplayContext::Agent);
}

#[test]
fn test_config_rejects_unknown_keys() {
    let err = ConsoleConfig::from_toml_str("colour = true").unwrap_err();
    assert!(err.message.contains("TOML"));
}
