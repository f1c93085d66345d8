//! Log messages and their rendering.

use inspectlog_core::{ColorName, ColorSpec, Description, FormatOptions, format};
use serde::{Deserialize, Serialize};

use crate::level::LogLevel;

/// Colored bracketed label attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
    pub color: ColorName,
}

impl Tag {
    #[must_use]
    pub fn new(label: impl Into<String>, color: ColorName) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// One piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Literal template text, rendered verbatim.
    Text(String),
    /// A described value.
    Description(Description),
}

/// A structured log message.
///
/// Messages hold only owned, textual data and can be relayed across thread
/// or process boundaries. On the wire a message is
/// `{level, content, prefix, origin}` with content items being either
/// strings or descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub level: LogLevel,
    pub content: Vec<Content>,
    /// Tags added by prefixed loggers, outermost first.
    #[serde(default)]
    pub prefix: Vec<Tag>,
    /// Tags added when the message crossed a boundary.
    #[serde(default)]
    pub origin: Vec<Tag>,
}

impl LogMessage {
    /// A message with the given content and no tags.
    #[must_use]
    pub fn new(level: LogLevel, content: Vec<Content>) -> Self {
        Self {
            level,
            content,
            prefix: Vec::new(),
            origin: Vec::new(),
        }
    }

    /// Whether the message arrived over a bridge.
    #[must_use]
    pub fn is_relayed(&self) -> bool {
        !self.origin.is_empty()
    }
}

/// Renders a message as `[origin]…[LEVEL][prefix]… content`.
///
/// Text content is copied verbatim; descriptions go through the formatter
/// with `options`.
#[must_use]
pub fn format_message(message: &LogMessage, options: &FormatOptions<'_>) -> String {
    let mut output = String::new();
    let mut push_tag = |label: &str, color: ColorName| {
        output.push('[');
        output.push_str(&options.color.paint(label, &ColorSpec::Named(color)));
        output.push(']');
    };

    for tag in &message.origin {
        push_tag(&tag.label, tag.color);
    }
    push_tag(message.level.label(), message.level.color());
    for tag in &message.prefix {
        push_tag(&tag.label, tag.color);
    }

    output.push(' ');
    for item in &message.content {
        match item {
            Content::Text(text) => output.push_str(text),
            Content::Description(description) => output.push_str(&format(description, options)),
        }
    }
    output
}
