//! The formatter: renders a [`Description`] as styled text.
//!
//! Layout is decided bottom-up. Each node reports its rendered text, its
//! visible width (measured before coloring, so every color backend gets the
//! same layout) and whether it spans several lines. A collection packs onto
//! one line when `widest child × child count` is strictly below the line
//! limit and no child is multi-line; otherwise it puts one child per line.

use std::sync::OnceLock;

use log::trace;
use regex::Regex;

use crate::color::{Colorize, PlainColor};
use crate::description::{
    ColorName, ColorSpec, Description, FunctionKind, Primitive, RecordItem, Segment,
};
use crate::logging::targets;

const INDENT: &str = "  ";

/// Semantic class of a rendered token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    String,
    Primitive,
    Function,
    Symbol,
    Circular,
    Date,
    RegExp,
    Shallow,
    /// Type names in collection prefixes.
    Type,
    /// Anything without a dedicated class (`null`, `undefined`, `unknown`).
    Other,
}

/// Color assigned to each semantic class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    pub string: ColorSpec,
    pub primitive: ColorSpec,
    pub function: ColorSpec,
    pub symbol: ColorSpec,
    pub circular: ColorSpec,
    pub date: ColorSpec,
    pub regexp: ColorSpec,
    pub shallow: ColorSpec,
    pub type_name: ColorSpec,
    pub other: ColorSpec,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            string: ColorName::Green.into(),
            primitive: ColorName::Yellow.into(),
            function: ColorName::Cyan.into(),
            symbol: ColorName::Green.into(),
            circular: ColorName::Blue.into(),
            date: ColorName::Magenta.into(),
            regexp: ColorName::Red.into(),
            shallow: ColorName::White.into(),
            type_name: ColorName::Bold.into(),
            other: ColorName::Gray.into(),
        }
    }
}

impl ColorMap {
    /// Color for a semantic class.
    #[must_use]
    pub fn get(&self, color_type: ColorType) -> &ColorSpec {
        match color_type {
            ColorType::String => &self.string,
            ColorType::Primitive => &self.primitive,
            ColorType::Function => &self.function,
            ColorType::Symbol => &self.symbol,
            ColorType::Circular => &self.circular,
            ColorType::Date => &self.date,
            ColorType::RegExp => &self.regexp,
            ColorType::Shallow => &self.shallow,
            ColorType::Type => &self.type_name,
            ColorType::Other => &self.other,
        }
    }
}

/// Options for [`format`].
#[derive(Clone)]
pub struct FormatOptions<'a> {
    /// Color backend.
    pub color: &'a dyn Colorize,
    /// Packing cost at or above which collections wrap.
    pub line_limit: usize,
    /// Color of each semantic class.
    pub color_map: ColorMap,
}

impl Default for FormatOptions<'_> {
    fn default() -> Self {
        Self::new(&PlainColor)
    }
}

impl<'a> FormatOptions<'a> {
    /// Default layout with the given color backend.
    #[must_use]
    pub fn new(color: &'a dyn Colorize) -> Self {
        Self {
            color,
            line_limit: 50,
            color_map: ColorMap::default(),
        }
    }

    /// Set the line limit.
    #[must_use]
    pub fn with_line_limit(mut self, line_limit: usize) -> Self {
        self.line_limit = line_limit;
        self
    }

    /// Set the color map.
    #[must_use]
    pub fn with_color_map(mut self, color_map: ColorMap) -> Self {
        self.color_map = color_map;
        self
    }
}

/// Renders a description as text.
#[must_use]
pub fn format(description: &Description, options: &FormatOptions<'_>) -> String {
    Formatter { options }.visit(description, 0).text
}

struct Rendered {
    text: String,
    width: usize,
    multiline: bool,
}

struct Formatter<'o, 'a> {
    options: &'o FormatOptions<'a>,
}

impl Formatter<'_, '_> {
    fn paint(&self, text: &str, color_type: ColorType) -> String {
        self.options
            .color
            .paint(text, self.options.color_map.get(color_type))
    }

    fn token(&self, text: &str, color_type: ColorType) -> Rendered {
        Rendered {
            text: self.paint(text, color_type),
            width: text.chars().count(),
            multiline: false,
        }
    }

    fn visit(&self, target: &Description, indent: usize) -> Rendered {
        match target {
            Description::Primitive { value } => match value {
                Primitive::String(s) => self.token(&quote(s), ColorType::String),
                Primitive::Number(n) => self.token(&format_number(*n), ColorType::Primitive),
                Primitive::Bool(b) => self.token(&b.to_string(), ColorType::Primitive),
            },
            Description::BigInt { value } => self.token(&format!("{value}n"), ColorType::Primitive),
            Description::Function { subtype, name } => {
                let kind = match subtype {
                    FunctionKind::Class => "class",
                    FunctionKind::Function => "function",
                };
                self.token(&format!("[{kind} {name}]"), ColorType::Function)
            }
            Description::List { name, elements, .. } => {
                self.visit_list(name.as_deref(), elements, indent)
            }
            Description::Record { name, items, .. } => {
                self.visit_record(name.as_deref(), items, indent)
            }
            Description::Symbol { name } => self.token(name, ColorType::Symbol),
            Description::Circular { .. } => self.token("[circular]", ColorType::Circular),
            Description::Date { date } => self.token(date, ColorType::Date),
            Description::RegExp { source } => self.token(source, ColorType::RegExp),
            Description::Shallow { name } => self.token(name, ColorType::Shallow),
            Description::Raw { segments } => self.visit_raw(segments, indent),
            Description::Null | Description::Undefined | Description::Unknown => {
                self.token(target.type_name(), ColorType::Other)
            }
        }
    }

    fn visit_key(&self, key: &Description, indent: usize) -> Rendered {
        if let Description::Primitive {
            value: Primitive::String(s),
        } = key
        {
            if is_bare_key(s) {
                return Rendered {
                    text: s.clone(),
                    width: s.chars().count(),
                    multiline: false,
                };
            }
        }
        self.visit(key, indent)
    }

    fn visit_list(&self, name: Option<&str>, elements: &[Description], indent: usize) -> Rendered {
        let items: Vec<Rendered> = elements.iter().map(|e| self.visit(e, indent + 1)).collect();
        let (prefix, prefix_width) = match name {
            Some(name) => {
                let counted = format!("({}) [", items.len());
                (
                    format!("{}{counted}", self.paint(name, ColorType::Type)),
                    name.chars().count() + counted.chars().count(),
                )
            }
            None => ("[".to_string(), 1),
        };

        let widths: Vec<Option<usize>> = items
            .iter()
            .map(|i| (!i.multiline).then_some(i.width))
            .collect();
        let entries: Vec<(String, usize)> = items.into_iter().map(|i| (i.text, i.width)).collect();
        self.layout(&prefix, prefix_width, "]", &widths, entries, indent)
    }

    fn visit_record(&self, name: Option<&str>, items: &[RecordItem], indent: usize) -> Rendered {
        let (prefix, prefix_width) = match name {
            Some(name) => (
                format!("{} {{", self.paint(name, ColorType::Type)),
                name.chars().count() + 2,
            ),
            None => ("{".to_string(), 1),
        };

        let mut widths = Vec::with_capacity(items.len());
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let key = self.visit_key(&item.key, indent + 1);
            let value = self.visit(&item.value, indent + 1);
            let multiline = key.multiline || value.multiline;
            widths.push((!multiline).then_some(key.width + value.width));
            entries.push((
                format!("{}: {}", key.text, value.text),
                key.width + value.width + 2,
            ));
        }
        self.layout(&prefix, prefix_width, "}", &widths, entries, indent)
    }

    /// Chooses inline or wrapped layout. `widths` holds each child's packing
    /// width, `None` for multi-line children.
    fn layout(
        &self,
        prefix: &str,
        prefix_width: usize,
        close: &str,
        widths: &[Option<usize>],
        entries: Vec<(String, usize)>,
        indent: usize,
    ) -> Rendered {
        if entries.is_empty() {
            return Rendered {
                text: format!("{prefix}{close}"),
                width: prefix_width + close.len(),
                multiline: false,
            };
        }

        let cost = widths
            .iter()
            .try_fold(0usize, |widest, &w| w.map(|w| widest.max(w)))
            .map(|widest| widest.saturating_mul(entries.len()));

        match cost {
            Some(cost) if cost < self.options.line_limit => {
                let width = prefix_width
                    + 2
                    + close.len()
                    + entries.iter().map(|(_, w)| w).sum::<usize>()
                    + 2 * (entries.len() - 1);
                let joined: Vec<String> = entries.into_iter().map(|(text, _)| text).collect();
                Rendered {
                    text: format!("{prefix} {} {close}", joined.join(", ")),
                    width,
                    multiline: false,
                }
            }
            _ => {
                trace!(
                    target: targets::FORMAT,
                    "wrapping {} entries (cost {cost:?}, limit {})",
                    entries.len(),
                    self.options.line_limit
                );
                let child_indent = INDENT.repeat(indent + 1);
                let mut text = String::from(prefix);
                for (entry, _) in entries {
                    text.push('\n');
                    text.push_str(&child_indent);
                    text.push_str(&entry);
                }
                text.push('\n');
                text.push_str(&INDENT.repeat(indent));
                text.push_str(close);
                Rendered {
                    text,
                    width: prefix_width,
                    multiline: true,
                }
            }
        }
    }

    fn visit_raw(&self, segments: &[Segment], indent: usize) -> Rendered {
        let mut text = String::new();
        let mut width = 0;
        for segment in segments {
            match segment {
                Segment::Text(segment) => {
                    let painted = self.options.color.paint(&segment.text, &segment.color);
                    if segment.indent {
                        let break_with_indent = format!("\n{}", INDENT.repeat(indent));
                        text.push_str(&painted.replace('\n', &break_with_indent));
                    } else {
                        text.push_str(&painted);
                    }
                    width += segment.text.chars().count();
                }
                Segment::Description(desc) => {
                    let nested = self.visit(desc, indent);
                    text.push_str(&nested.text);
                    width += nested.width;
                }
            }
        }
        let multiline = text.contains('\n');
        Rendered {
            text,
            width,
            multiline,
        }
    }
}

/// Whether a string key can be printed without quotes.
fn is_bare_key(key: &str) -> bool {
    static BARE_KEY: OnceLock<Regex> = OnceLock::new();
    BARE_KEY
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_$]*$").expect("valid key pattern"))
        .is_match(key)
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}

/// Number text in the shortest round-trip form, using exponent notation
/// outside `[1e-6, 1e21)`.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }
    let exponent_form = format!("{n:e}");
    match exponent_form.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => exponent_form,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::AnsiColor;
    use crate::description::{ListKind, RecordKind, TextSegment};

    fn plain(desc: &Description) -> String {
        format(desc, &FormatOptions::default())
    }

    fn list(name: Option<&str>, elements: Vec<Description>) -> Description {
        Description::List {
            subtype: ListKind::Array,
            name: name.map(str::to_string),
            elements,
        }
    }

    fn record(name: Option<&str>, items: Vec<(Description, Description)>) -> Description {
        Description::Record {
            subtype: RecordKind::Object,
            name: name.map(str::to_string),
            items: items
                .into_iter()
                .map(|(key, value)| RecordItem { key, value })
                .collect(),
        }
    }

    #[test]
    fn scalars() {
        assert_eq!(plain(&Description::string("escaped")), r#""escaped""#);
        assert_eq!(plain(&Description::number(5.0)), "5");
        assert_eq!(plain(&Description::number(1.5)), "1.5");
        assert_eq!(plain(&Description::boolean(false)), "false");
        assert_eq!(
            plain(&Description::BigInt {
                value: "42".into()
            }),
            "42n"
        );
        assert_eq!(
            plain(&Description::Function {
                subtype: FunctionKind::Class,
                name: "Logger".into()
            }),
            "[class Logger]"
        );
        assert_eq!(
            plain(&Description::Circular { path: vec![] }),
            "[circular]"
        );
        assert_eq!(plain(&Description::Null), "null");
        assert_eq!(plain(&Description::Undefined), "undefined");
        assert_eq!(plain(&Description::Unknown), "unknown");
    }

    #[test]
    fn numbers_follow_shortest_form() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(123_456.0), "123456");
    }

    #[test]
    fn strings_are_json_quoted() {
        assert_eq!(plain(&Description::string("a\"b\n")), r#""a\"b\n""#);
    }

    #[test]
    fn empty_collections() {
        assert_eq!(plain(&record(None, vec![])), "{}");
        assert_eq!(plain(&list(None, vec![])), "[]");
        assert_eq!(plain(&list(Some("Set"), vec![])), "Set(0) []");
        assert_eq!(plain(&record(Some("Map"), vec![])), "Map {}");
    }

    #[test]
    fn short_list_packs_inline() {
        let desc = list(
            None,
            vec![
                Description::number(6.0),
                Description::number(8.0),
                Description::number(1.0),
            ],
        );
        assert_eq!(plain(&desc), "[ 6, 8, 1 ]");
    }

    #[test]
    fn named_list_has_count_prefix() {
        let desc = list(Some("Set"), vec![Description::number(6.0), Description::number(8.0)]);
        assert_eq!(plain(&desc), "Set(2) [ 6, 8 ]");
    }

    #[test]
    fn cost_equal_to_limit_wraps() {
        // Five elements of width two: cost 10.
        let elements: Vec<Description> = (10..15).map(|n| Description::number(f64::from(n))).collect();
        let desc = list(None, elements);

        let below = FormatOptions::default().with_line_limit(11);
        assert_eq!(format(&desc, &below), "[ 10, 11, 12, 13, 14 ]");

        let equal = FormatOptions::default().with_line_limit(10);
        assert_eq!(
            format(&desc, &equal),
            "[\n  10\n  11\n  12\n  13\n  14\n]"
        );
    }

    #[test]
    fn multiline_child_forces_wrap_with_nested_indent() {
        let inner = list(
            None,
            (0..30).map(|n| Description::number(f64::from(n))).collect(),
        );
        let outer = record(None, vec![(Description::string("xs"), inner)]);
        let text = plain(&outer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "{");
        assert_eq!(lines[1], "  xs: [");
        assert_eq!(lines[2], "    0");
        assert_eq!(lines[31], "    29");
        assert_eq!(lines[32], "  ]");
        assert_eq!(lines[33], "}");
    }

    #[test]
    fn bare_and_quoted_keys() {
        let simple = record(None, vec![(Description::string("a"), Description::number(1.0))]);
        assert_eq!(plain(&simple), "{ a: 1 }");

        let spaced = record(None, vec![(Description::string("a b"), Description::number(1.0))]);
        assert_eq!(plain(&spaced), r#"{ "a b": 1 }"#);

        let dollar = record(None, vec![(Description::string("$id_2"), Description::number(1.0))]);
        assert_eq!(plain(&dollar), "{ $id_2: 1 }");

        let numeric = record(None, vec![(Description::number(3.0), Description::Null)]);
        assert_eq!(plain(&numeric), "{ 3: null }");
    }

    #[test]
    fn map_record_renders_with_name() {
        let desc = Description::Record {
            subtype: RecordKind::Map,
            name: Some("Map".into()),
            items: vec![RecordItem {
                key: Description::string("x"),
                value: Description::number(1.0),
            }],
        };
        assert_eq!(plain(&desc), "Map { x: 1 }");
    }

    #[test]
    fn record_cost_uses_key_plus_value_width() {
        // Widest entry "abcd" + "\"xyz\"" = 9, two entries: cost 18.
        let desc = record(
            None,
            vec![
                (Description::string("abcd"), Description::string("xyz")),
                (Description::string("b"), Description::number(2.0)),
            ],
        );
        let fits = FormatOptions::default().with_line_limit(19);
        assert_eq!(format(&desc, &fits), r#"{ abcd: "xyz", b: 2 }"#);

        let wraps = FormatOptions::default().with_line_limit(18);
        assert_eq!(format(&desc, &wraps), "{\n  abcd: \"xyz\"\n  b: 2\n}");
    }

    #[test]
    fn raw_segments_reindent_when_flagged() {
        let raw = Description::Raw {
            segments: vec![
                Segment::Text(TextSegment {
                    text: "line1\nline2".into(),
                    color: ColorName::White.into(),
                    indent: true,
                }),
                Segment::Description(Description::number(7.0)),
            ],
        };
        let outer = list(None, vec![raw]);
        assert_eq!(plain(&outer), "[\n  line1\n  line27\n]");
    }

    #[test]
    fn raw_without_indent_keeps_breaks() {
        let raw = Description::raw_text("a\nb", ColorName::White);
        assert_eq!(plain(&raw), "a\nb");
    }

    #[test]
    fn layout_ignores_color_codes() {
        let desc = list(
            None,
            (0..9).map(|n| Description::number(f64::from(n))).collect(),
        );
        let ansi = AnsiColor;
        let colored = format(&desc, &FormatOptions::new(&ansi));
        assert!(!colored.contains('\n'));
        assert!(colored.contains("\u{1b}[93m0\u{1b}[0m"));
    }

    #[test]
    fn type_names_use_the_type_color() {
        let desc = list(Some("Set"), vec![Description::number(1.0)]);
        let ansi = AnsiColor;
        let colored = format(&desc, &FormatOptions::new(&ansi));
        assert!(colored.starts_with("\u{1b}[1mSet\u{1b}[0m(1) ["));
    }

    #[test]
    fn formatting_is_deterministic() {
        let desc = record(
            Some("Point"),
            vec![
                (Description::string("y"), Description::number(2.0)),
                (Description::string("x"), Description::number(1.0)),
            ],
        );
        let first = plain(&desc);
        let second = plain(&desc);
        assert_eq!(first, second);
        assert_eq!(first, "Point { y: 2, x: 1 }");
    }
}
