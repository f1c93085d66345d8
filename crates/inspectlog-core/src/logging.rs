//! Internal diagnostics for inspectlog.
//!
//! inspectlog reports its own behavior through the standard [`log`] facade
//! and does not install a logger. The log macros and level types are
//! re-exported for the other inspectlog crates.
//!
//! # Log Targets
//!
//! - `inspectlog`: root target
//! - `inspectlog::describe`: value classification
//! - `inspectlog::format`: layout decisions
//! - `inspectlog::bridge`: message relay
//! - `inspectlog::config`: configuration loading
//!
//! Example filter: `RUST_LOG=inspectlog::bridge=debug`

pub use log::{Level, LevelFilter, debug, error, info, trace, warn};

/// Log targets used by inspectlog components.
pub mod targets {
    /// Root target for all inspectlog logs.
    pub const INSPECTLOG: &str = "inspectlog";

    /// Value classification.
    pub const DESCRIBE: &str = "inspectlog::describe";

    /// Layout decisions in the formatter.
    pub const FORMAT: &str = "inspectlog::format";

    /// Cross-boundary message relay.
    pub const BRIDGE: &str = "inspectlog::bridge";

    /// Configuration loading.
    pub const CONFIG: &str = "inspectlog::config";

    /// Console output.
    pub const SINK: &str = "inspectlog::sink";
}

/// Returns whether logging is enabled at the given level for the given target.
#[inline]
#[must_use]
pub fn is_enabled(level: Level, target: &str) -> bool {
    log::log_enabled!(target: target, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_targets_are_hierarchical() {
        assert!(targets::DESCRIBE.starts_with(targets::INSPECTLOG));
        assert!(targets::FORMAT.starts_with(targets::INSPECTLOG));
        assert!(targets::BRIDGE.starts_with(targets::INSPECTLOG));
        assert!(targets::CONFIG.starts_with(targets::INSPECTLOG));
        assert!(targets::SINK.starts_with(targets::INSPECTLOG));
    }
}
