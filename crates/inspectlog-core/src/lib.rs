//! Value description and formatting engines for inspectlog.
//!
//! This crate provides the two engines behind inspectlog:
//! - the **descriptor** ([`describe`]), which classifies any [`Value`] into a
//!   finite, cycle-free [`Description`] tree
//! - the **formatter** ([`format`]), which renders a description as styled,
//!   optionally multi-line text through a pluggable [`Colorize`] backend
//!
//! plus the [`markers`] protocol that lets objects supply their own
//! description, and [`IntoValue`] adapters for ordinary Rust data.
//!
//! # Example
//!
//! ```
//! use inspectlog_core::{IntoValue, InspectOptions, inspect};
//!
//! let value = vec![1, 2, 3].into_value();
//! assert_eq!(inspect(&value, &InspectOptions::default()), "[ 1, 2, 3 ]");
//! ```

#![forbid(unsafe_code)]

pub mod color;
mod convert;
pub mod describe;
pub mod description;
mod error;
pub mod formatter;
mod inspect;
pub mod logging;
pub mod markers;
pub mod value;

pub use color::{AnsiColor, Colorize, HtmlColor, PlainColor};
pub use convert::IntoValue;
pub use describe::{DescribeContext, DescribeOptions, describe, describe_with};
pub use description::{
    ColorName, ColorSpec, Description, FunctionKind, ListKind, Primitive, RecordItem, RecordKind,
    Segment, TextSegment,
};
pub use error::{ErrorCode, InspectError, InspectResult};
pub use formatter::{ColorMap, ColorType, FormatOptions, format};
pub use inspect::{ColorMode, InspectOptions, inspect};
pub use value::{
    Function, Marker, ObjectData, ObjectKind, ObjectRef, OpaqueKind, Property, PropertyKey,
    Symbol, TypedArrayKind, Value,
};
