//! Test utilities for code that logs through inspectlog.

mod capture;

pub use capture::CaptureSink;
