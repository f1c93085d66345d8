//! The custom marker protocol.
//!
//! An object can opt out of generic classification by carrying one of two
//! reserved markers:
//!
//! - a **raw** marker supplies pre-built styled segments that the descriptor
//!   returns verbatim as a `raw` description;
//! - a **custom** marker supplies a hook that is called with the traversal
//!   context and may return a replacement value to describe instead.
//!
//! The helpers here build marker-carrying values, including splitting text
//! that already contains ANSI color escapes into styled segments.

use log::debug;

use crate::color::{DEFAULT_COLOR_CODES, lookup_code};
use crate::describe::DescribeContext;
use crate::description::{ColorName, ColorSpec, Segment, TextSegment};
use crate::error::{InspectError, InspectResult};
use crate::logging::targets;
use crate::value::{Marker, ObjectRef, Value};

/// Reserved key identifying pre-built raw content.
pub const RAW_MARKER_KEY: &str = "Logger.ObjectDescription.RawObject";

/// Reserved key identifying a custom description hook.
pub const CUSTOM_MARKER_KEY: &str = "Logger.ObjectDescription.Custom";

/// Maximum number of escape sequences [`ansi_segments`] will parse.
pub const ANSI_ITERATION_LIMIT: usize = 1000;

const ESCAPE_START: &str = "\u{1b}[";

impl Marker {
    /// Reserved key this marker is registered under.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Raw(_) => RAW_MARKER_KEY,
            Self::Custom(_) => CUSTOM_MARKER_KEY,
        }
    }
}

/// A value that describes as the given raw segments.
#[must_use]
pub fn raw(segments: Vec<Segment>) -> Value {
    let object = ObjectRef::plain();
    object.set_marker(Marker::Raw(segments));
    object.to_value()
}

/// A value whose description is produced by `hook`.
pub fn custom<F>(hook: F) -> Value
where
    F: Fn(&ObjectRef, &DescribeContext<'_>) -> Value + 'static,
{
    let object = ObjectRef::plain();
    object.set_custom_hook(hook);
    object.to_value()
}

/// One styled text segment.
pub fn text_segment(text: impl Into<String>, color: impl Into<ColorSpec>, indent: bool) -> Vec<Segment> {
    vec![Segment::Text(TextSegment {
        text: text.into(),
        color: color.into(),
        indent,
    })]
}

/// A value that describes as `text` in one color.
pub fn raw_text(text: impl Into<String>, color: impl Into<ColorSpec>) -> Value {
    raw(text_segment(text, color, false))
}

/// A value that describes as `text`, keeping the colors of its ANSI escapes.
pub fn ansi_text(text: &str) -> InspectResult<Value> {
    Ok(raw(ansi_segments(text, false)?))
}

/// Splits text containing ANSI SGR escapes into custom-colored segments.
///
/// Each segment keeps the SGR code in effect for it and the matching hex
/// color, so both terminal and HTML backends can reproduce it. Text before
/// the first escape is white.
///
/// Fails with [`ErrorCode::AnsiParseLimit`](crate::ErrorCode::AnsiParseLimit)
/// when the input holds more than [`ANSI_ITERATION_LIMIT`] escapes.
pub fn ansi_segments(text: &str, indent: bool) -> InspectResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut style = style_for_code("37");
    let mut rest = text;
    let mut iterations = 0;

    while let Some(start) = rest.find(ESCAPE_START) {
        iterations += 1;
        if iterations > ANSI_ITERATION_LIMIT {
            debug!(target: targets::DESCRIBE, "aborting ANSI parse after {ANSI_ITERATION_LIMIT} escapes");
            return Err(InspectError::ansi_parse_limit(ANSI_ITERATION_LIMIT));
        }

        push_text(&mut segments, &rest[..start], &style, indent);

        let params = &rest[start + ESCAPE_START.len()..];
        match params.find('m') {
            Some(end) => {
                style = style_for_code(&params[..end]);
                rest = &params[end + 1..];
            }
            // Unterminated escape: drop it and everything after.
            None => {
                rest = "";
                break;
            }
        }
    }

    push_text(&mut segments, rest, &style, indent);
    Ok(segments)
}

fn push_text(segments: &mut Vec<Segment>, text: &str, color: &ColorSpec, indent: bool) {
    if text.is_empty() {
        return;
    }
    segments.push(Segment::Text(TextSegment {
        text: text.to_string(),
        color: color.clone(),
        indent,
    }));
}

fn style_for_code(code: &str) -> ColorSpec {
    let name = match code {
        "30" => "black",
        "31" => "red",
        "32" => "green",
        "33" => "yellow",
        "34" => "blue",
        "35" => "magenta",
        "36" => "cyan",
        "37" => "white",
        "90" => "gray",
        "91" => "brightRed",
        "92" => "brightGreen",
        "93" => "brightYellow",
        "94" => "brightBlue",
        "95" => "brightMagenta",
        "96" => "brightCyan",
        "97" => "brightWhite",
        _ => ColorName::White.as_str(),
    };
    let hex = lookup_code(DEFAULT_COLOR_CODES, name)
        .or_else(|| lookup_code(DEFAULT_COLOR_CODES, "grey"))
        .unwrap_or("#aaaaaa");
    ColorSpec::Custom {
        code: hex.to_string(),
        ansi_code: code.parse().ok(),
    }
}
