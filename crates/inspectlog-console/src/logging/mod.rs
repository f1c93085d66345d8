//! Bridges from the `log` and `tracing` ecosystems.
//!
//! - [`LogBridge`] - a `log::Log` implementation forwarding records
//! - [`InspectLayer`] - a `tracing_subscriber` layer forwarding events
//!
//! Both keep inspectlog's own diagnostics out of the pipeline they feed.

mod bridge;
mod layer;

pub use bridge::{LogBridge, LogBridgeBuilder};
pub use layer::{InspectLayer, InspectSubscriberBuilder};
