//! Structural description of an inspected value.
//!
//! A [`Description`] is built once per inspection call and is plain owned
//! data afterwards: it holds no references to the value it came from, so it
//! can be cloned, sent across threads, or serialized for relay.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorName {
    Blue,
    Cyan,
    Yellow,
    Red,
    Green,
    Magenta,
    White,
    Gray,
    Black,
    Bold,
}

impl ColorName {
    /// Every palette entry.
    pub const ALL: [ColorName; 10] = [
        Self::Blue,
        Self::Cyan,
        Self::Yellow,
        Self::Red,
        Self::Green,
        Self::Magenta,
        Self::White,
        Self::Gray,
        Self::Black,
        Self::Bold,
    ];

    /// Lowercase palette name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Cyan => "cyan",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Green => "green",
            Self::Magenta => "magenta",
            Self::White => "white",
            Self::Gray => "gray",
            Self::Black => "black",
            Self::Bold => "bold",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower == "grey" {
            return Ok(Self::Gray);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("unknown color: {s}"))
    }
}

/// Color of a styled text run: a palette entry or an explicit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Palette entry, resolved by the color backend.
    Named(ColorName),
    /// Explicit color, e.g. `#cd3131`, with the ANSI SGR code it came from.
    Custom {
        code: String,
        #[serde(rename = "ansiCode", default, skip_serializing_if = "Option::is_none")]
        ansi_code: Option<u8>,
    },
}

impl From<ColorName> for ColorSpec {
    fn from(name: ColorName) -> Self {
        Self::Named(name)
    }
}

/// Literal styled text inside a raw description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSegment {
    pub text: String,
    pub color: ColorSpec,
    /// Re-indent embedded line breaks to the depth the segment renders at.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indent: bool,
}

/// One piece of a raw description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Text(TextSegment),
    Description(Description),
}

impl Segment {
    /// Unindented styled text.
    pub fn text(text: impl Into<String>, color: impl Into<ColorSpec>) -> Self {
        Self::Text(TextSegment {
            text: text.into(),
            color: color.into(),
            indent: false,
        })
    }
}

/// Scalar held by a `primitive` description.
///
/// Finite numbers travel as JSON numbers. `NaN` and the infinities have no
/// JSON number form and travel as `{"number": "NaN" | "Infinity" | "-Infinity"}`,
/// which keeps them apart from string primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Number(#[serde(with = "wire_number")] f64),
    String(String),
}

mod wire_number {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    enum NonFinite {
        NaN,
        Infinity,
        #[serde(rename = "-Infinity")]
        NegInfinity,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum WireNumber {
        Finite(f64),
        NonFinite { number: NonFinite },
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = if n.is_nan() {
            WireNumber::NonFinite {
                number: NonFinite::NaN,
            }
        } else if n.is_infinite() {
            WireNumber::NonFinite {
                number: if *n > 0.0 {
                    NonFinite::Infinity
                } else {
                    NonFinite::NegInfinity
                },
            }
        } else {
            WireNumber::Finite(*n)
        };
        wire.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match WireNumber::deserialize(deserializer)? {
            WireNumber::Finite(n) => n,
            WireNumber::NonFinite { number } => match number {
                NonFinite::NaN => f64::NAN,
                NonFinite::Infinity => f64::INFINITY,
                NonFinite::NegInfinity => f64::NEG_INFINITY,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Class,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Array,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Object,
    Map,
}

/// Key/value pair of a `record`. Keys are full descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordItem {
    pub key: Description,
    pub value: Description,
}

/// Immutable, cycle-free structural description of a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Description {
    Primitive {
        value: Primitive,
    },
    Null,
    Undefined,
    Symbol {
        name: String,
    },
    BigInt {
        value: String,
    },
    Function {
        subtype: FunctionKind,
        name: String,
    },
    List {
        subtype: ListKind,
        name: Option<String>,
        elements: Vec<Description>,
    },
    Record {
        subtype: RecordKind,
        name: Option<String>,
        items: Vec<RecordItem>,
    },
    Date {
        date: String,
    },
    RegExp {
        source: String,
    },
    /// Container that is named but not introspected.
    Shallow {
        name: String,
    },
    /// Repeated occurrence of a value; `path` leads to its first occurrence.
    Circular {
        path: Vec<String>,
    },
    Raw {
        segments: Vec<Segment>,
    },
    Unknown,
}

impl Description {
    /// `primitive` holding a string.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Primitive {
            value: Primitive::String(value.into()),
        }
    }

    /// `primitive` holding a number.
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Primitive {
            value: Primitive::Number(value),
        }
    }

    /// `primitive` holding a boolean.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Primitive {
            value: Primitive::Bool(value),
        }
    }

    /// `raw` with a single styled text segment.
    pub fn raw_text(text: impl Into<String>, color: impl Into<ColorSpec>) -> Self {
        Self::Raw {
            segments: vec![Segment::text(text, color)],
        }
    }

    /// Variant tag, as used on the wire.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Primitive { .. } => "primitive",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Symbol { .. } => "symbol",
            Self::BigInt { .. } => "bigint",
            Self::Function { .. } => "function",
            Self::List { .. } => "list",
            Self::Record { .. } => "record",
            Self::Date { .. } => "date",
            Self::RegExp { .. } => "regexp",
            Self::Shallow { .. } => "shallow",
            Self::Circular { .. } => "circular",
            Self::Raw { .. } => "raw",
            Self::Unknown => "unknown",
        }
    }

    /// Walks a path of `elements`/`items` steps from this node, as recorded
    /// in `circular` descriptions.
    #[must_use]
    pub fn resolve_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Description> {
        let mut node = self;
        let mut steps = path.iter().map(AsRef::as_ref);
        while let Some(step) = steps.next() {
            let index: usize = steps.next()?.parse().ok()?;
            node = match (step, node) {
                ("elements", Self::List { elements, .. }) => elements.get(index)?,
                ("items", Self::Record { items, .. }) => {
                    let item = items.get(index)?;
                    match steps.next()? {
                        "key" => &item.key,
                        "value" => &item.value,
                        _ => return None,
                    }
                }
                _ => return None,
            };
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let desc = Description::List {
            subtype: ListKind::Set,
            name: Some("Set".into()),
            elements: vec![Description::number(1.0), Description::Null],
        };
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "list",
                "subtype": "set",
                "name": "Set",
                "elements": [
                    { "type": "primitive", "value": 1.0 },
                    { "type": "null" }
                ]
            })
        );
    }

    #[test]
    fn non_finite_numbers_survive_the_wire() {
        let desc = Description::List {
            subtype: ListKind::Array,
            name: None,
            elements: vec![
                Description::number(f64::NAN),
                Description::number(f64::INFINITY),
                Description::number(f64::NEG_INFINITY),
                Description::string("NaN"),
                Description::number(2.5),
            ],
        };
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(
            json["elements"],
            serde_json::json!([
                { "type": "primitive", "value": { "number": "NaN" } },
                { "type": "primitive", "value": { "number": "Infinity" } },
                { "type": "primitive", "value": { "number": "-Infinity" } },
                { "type": "primitive", "value": "NaN" },
                { "type": "primitive", "value": 2.5 }
            ])
        );

        let back: Description = serde_json::from_value(json).unwrap();
        let Description::List { elements, .. } = back else {
            panic!("expected list");
        };
        assert!(matches!(
            elements[0],
            Description::Primitive { value: Primitive::Number(n) } if n.is_nan()
        ));
        assert_eq!(elements[1], Description::number(f64::INFINITY));
        assert_eq!(elements[2], Description::number(f64::NEG_INFINITY));
        assert_eq!(elements[3], Description::string("NaN"));
        assert_eq!(elements[4], Description::number(2.5));
    }

    #[test]
    fn raw_segments_keep_their_shape_on_the_wire() {
        let desc = Description::Raw {
            segments: vec![
                Segment::text("a", ColorName::Red),
                Segment::Text(TextSegment {
                    text: "b".into(),
                    color: ColorSpec::Custom {
                        code: "#cd3131".into(),
                        ansi_code: Some(31),
                    },
                    indent: true,
                }),
                Segment::Description(Description::string("c")),
            ],
        };
        let json = serde_json::to_string(&desc).unwrap();
        assert!(json.contains(r#""color":"red""#));
        assert!(json.contains(r#""ansiCode":31"#));
        let back: Description = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn resolve_path_walks_lists_and_records() {
        let inner = Description::string("deep");
        let desc = Description::Record {
            subtype: RecordKind::Object,
            name: None,
            items: vec![RecordItem {
                key: Description::string("list"),
                value: Description::List {
                    subtype: ListKind::Array,
                    name: None,
                    elements: vec![Description::Null, inner.clone()],
                },
            }],
        };

        assert_eq!(
            desc.resolve_path(&["items", "0", "value", "elements", "1"]),
            Some(&inner)
        );
        assert_eq!(desc.resolve_path::<&str>(&[]), Some(&desc));
        assert_eq!(desc.resolve_path(&["items", "3", "value"]), None);
        assert_eq!(desc.resolve_path(&["elements", "0"]), None);
    }

    #[test]
    fn color_name_parses_aliases() {
        assert_eq!("grey".parse::<ColorName>(), Ok(ColorName::Gray));
        assert_eq!("Cyan".parse::<ColorName>(), Ok(ColorName::Cyan));
        assert!("teal".parse::<ColorName>().is_err());
    }
}
