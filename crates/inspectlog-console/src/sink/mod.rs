//! Message sinks.
//!
//! - [`ConsoleSink`] - Renders to stdout/stderr
//! - [`BridgeSink`] / [`BridgeReceiver`] - JSON-lines relay across boundaries
//!
//! The capture sink used in tests lives in [`crate::testing`].

mod bridge;
mod console;

pub use bridge::{BridgeReceiver, BridgeSink, ReceiveSummary};
pub use console::ConsoleSink;
