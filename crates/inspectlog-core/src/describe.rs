//! The descriptor: classifies a [`Value`] into a [`Description`].
//!
//! Every call to [`describe`] owns its own traversal state. Within a call each
//! heap object is visited once; later encounters become `circular` nodes
//! pointing at the path of the first occurrence. Two calls never share state.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::SecondsFormat;
use log::trace;
use regex::Regex;

use crate::description::{
    ColorName, Description, FunctionKind, ListKind, RecordItem, RecordKind, Segment,
};
use crate::logging::targets;
use crate::value::{Function, Marker, ObjectKind, ObjectRef, PropertyKey, Value};

/// Nameless functions with a compacted source shorter than this use the
/// source as their display name.
const INLINE_SOURCE_LIMIT: usize = 50;

const ANONYMOUS: &str = "(anonymous)";

/// Tuning for large collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescribeOptions {
    /// Arrays longer than this are truncated.
    pub max_elements: usize,
    /// Elements kept from the start of a truncated array.
    pub head: usize,
    /// Elements kept from the end of a truncated array.
    pub tail: usize,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self {
            max_elements: 100,
            head: 50,
            tail: 50,
        }
    }
}

impl DescribeOptions {
    /// Options with the default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the length above which arrays are truncated.
    #[must_use]
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = max;
        self
    }

    /// Set how many leading and trailing elements survive truncation.
    #[must_use]
    pub fn with_split(mut self, head: usize, tail: usize) -> Self {
        self.head = head;
        self.tail = tail;
        self
    }
}

/// Traversal state handed to custom description hooks.
#[derive(Debug)]
pub struct DescribeContext<'a> {
    path: &'a [String],
    options: &'a DescribeOptions,
}

impl DescribeContext<'_> {
    /// Path from the root of the current call to the object being described.
    #[must_use]
    pub fn path(&self) -> &[String] {
        self.path
    }

    /// Options of the current call.
    #[must_use]
    pub fn options(&self) -> &DescribeOptions {
        self.options
    }

    /// Describes `value` on its own, outside the current traversal.
    #[must_use]
    pub fn describe(&self, value: &Value) -> Description {
        describe_with(value, self.options)
    }
}

/// Describes a value with the default options.
#[must_use]
pub fn describe(value: &Value) -> Description {
    describe_with(value, &DescribeOptions::default())
}

/// Describes a value.
#[must_use]
pub fn describe_with(value: &Value, options: &DescribeOptions) -> Description {
    let mut descriptor = Descriptor {
        options,
        seen: HashMap::new(),
        retained: Vec::new(),
    };
    let mut path = Vec::new();
    descriptor.visit(value, &mut path)
}

struct Descriptor<'o> {
    options: &'o DescribeOptions,
    /// Object identity to the path of its first occurrence.
    seen: HashMap<usize, Vec<String>>,
    /// Values produced by custom hooks, kept alive so their identities are
    /// not reused by later allocations during this call.
    retained: Vec<Value>,
}

impl Descriptor<'_> {
    fn visit(&mut self, value: &Value, path: &mut Vec<String>) -> Description {
        match value {
            Value::Bool(b) => Description::boolean(*b),
            Value::Number(n) => Description::number(*n),
            Value::String(s) => Description::string(s.clone()),
            Value::Function(function) => describe_function(function),
            Value::Symbol(symbol) => Description::Symbol {
                name: symbol.to_string(),
            },
            Value::BigInt(n) => Description::BigInt {
                value: n.to_string(),
            },
            Value::Undefined => Description::Undefined,
            Value::Null => Description::Null,
            Value::Object(object) => self.visit_object(object, path),
        }
    }

    fn visit_at(&mut self, value: &Value, path: &mut Vec<String>, steps: &[&str]) -> Description {
        let depth = path.len();
        path.extend(steps.iter().map(|s| (*s).to_string()));
        let desc = self.visit(value, path);
        path.truncate(depth);
        desc
    }

    fn visit_object(&mut self, object: &ObjectRef, path: &mut Vec<String>) -> Description {
        if let Some(first) = self.seen.get(&object.id()) {
            return Description::Circular {
                path: first.clone(),
            };
        }
        self.seen.insert(object.id(), path.clone());

        // Only reachable when the caller describes an object while holding
        // a mutable borrow of it.
        let Some(data) = object.snapshot() else {
            trace!(target: targets::DESCRIBE, "object {object:?} is mutably borrowed, describing as unknown");
            return Description::Unknown;
        };

        match data.marker {
            Some(Marker::Raw(segments)) => return Description::Raw { segments },
            Some(Marker::Custom(hook)) => {
                let context = DescribeContext {
                    path: path.as_slice(),
                    options: self.options,
                };
                let replacement = hook(object, &context);
                let same = matches!(&replacement, Value::Object(o) if o.ptr_eq(object));
                if !same {
                    self.retained.push(replacement.clone());
                    return self.visit(&replacement, path);
                }
            }
            None => {}
        }

        let class_name = data.class_name;
        match data.kind {
            ObjectKind::Array(elements) => Description::List {
                subtype: ListKind::Array,
                name: class_name.filter(|n| n != "Array"),
                elements: self.visit_elements(&elements, true, path),
            },
            ObjectKind::TypedArray { kind, elements } => {
                let elements: Vec<Value> = elements.into_iter().map(Value::Number).collect();
                Description::List {
                    subtype: ListKind::Array,
                    name: Some(class_name.unwrap_or_else(|| kind.name().to_string())),
                    elements: self.visit_elements(&elements, true, path),
                }
            }
            ObjectKind::Set(elements) => Description::List {
                subtype: ListKind::Set,
                name: Some(class_name.unwrap_or_else(|| "Set".to_string())),
                elements: self.visit_elements(&elements, false, path),
            },
            ObjectKind::Map(entries) => Description::Record {
                subtype: RecordKind::Map,
                name: Some(class_name.unwrap_or_else(|| "Map".to_string())),
                items: self.visit_entries(&entries, path),
            },
            ObjectKind::RegExp { source, flags } => Description::RegExp {
                source: format!("/{source}/{flags}"),
            },
            ObjectKind::Date(at) => Description::Date {
                date: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            ObjectKind::Opaque(kind) => Description::Shallow {
                name: class_name.unwrap_or_else(|| kind.name().to_string()),
            },
            ObjectKind::Error {
                name,
                message,
                stack,
            } => {
                let text = stack.unwrap_or_else(|| {
                    if message.is_empty() {
                        name
                    } else {
                        format!("{name}: {message}")
                    }
                });
                Description::Raw {
                    segments: vec![Segment::text(text, ColorName::White)],
                }
            }
            ObjectKind::ByteView { name, .. } => Description::Record {
                subtype: RecordKind::Object,
                name: Some(class_name.unwrap_or(name)),
                items: Vec::new(),
            },
            ObjectKind::Plain(properties) => {
                let strings = properties
                    .iter()
                    .filter(|p| p.enumerable && matches!(p.key, PropertyKey::String(_)));
                let symbols = properties
                    .iter()
                    .filter(|p| p.enumerable && matches!(p.key, PropertyKey::Symbol(_)));
                let entries: Vec<(Value, Value)> = strings
                    .chain(symbols)
                    .map(|p| (Value::from(p.key.clone()), p.value.clone()))
                    .collect();
                Description::Record {
                    subtype: RecordKind::Object,
                    name: class_name.filter(|n| n != "Object"),
                    items: self.visit_entries(&entries, path),
                }
            }
        }
    }

    fn visit_elements(
        &mut self,
        elements: &[Value],
        truncate: bool,
        path: &mut Vec<String>,
    ) -> Vec<Description> {
        let DescribeOptions {
            max_elements,
            head,
            tail,
        } = *self.options;

        let kept_total = head.saturating_add(tail);
        let mut kept: Vec<Option<&Value>> =
            Vec::with_capacity(elements.len().min(kept_total.saturating_add(1)));
        let mut skipped = 0;
        if truncate && elements.len() > max_elements && elements.len() > kept_total {
            skipped = elements.len() - head - tail;
            kept.extend(elements[..head].iter().map(Some));
            kept.push(None);
            kept.extend(elements[elements.len() - tail..].iter().map(Some));
        } else {
            kept.extend(elements.iter().map(Some));
        }

        kept.into_iter()
            .enumerate()
            .map(|(i, element)| match element {
                Some(value) => {
                    let index = i.to_string();
                    self.visit_at(value, path, &["elements", &index])
                }
                None => Description::raw_text(
                    format!("... {skipped} elements skipped"),
                    ColorName::Gray,
                ),
            })
            .collect()
    }

    fn visit_entries(&mut self, entries: &[(Value, Value)], path: &mut Vec<String>) -> Vec<RecordItem> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (key, value))| {
                let index = i.to_string();
                RecordItem {
                    key: self.visit_at(key, path, &["items", &index, "key"]),
                    value: self.visit_at(value, path, &["items", &index, "value"]),
                }
            })
            .collect()
    }
}

fn describe_function(function: &Function) -> Description {
    let subtype = if function.is_class() {
        FunctionKind::Class
    } else {
        FunctionKind::Function
    };
    let name = match function.name() {
        Some(name) => name.to_string(),
        None => {
            let compact = compact_source(function.source());
            if compact.chars().count() < INLINE_SOURCE_LIMIT {
                compact
            } else {
                ANONYMOUS.to_string()
            }
        }
    };
    Description::Function { subtype, name }
}

/// Collapses a multi-line source onto one line, marking each break with `↲`.
fn compact_source(source: &str) -> String {
    static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
    let re = LINE_BREAK.get_or_init(|| Regex::new(r"\n\s*").expect("valid line break pattern"));
    re.replace_all(source, "↲").into_owned()
}
