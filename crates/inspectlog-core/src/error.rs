//! Error types for inspectlog.
//!
//! `describe` and `format` never fail. Errors only surface from the
//! helpers around them: parsing ANSI text into raw segments, loading
//! configuration, reading input documents, and relaying messages.

use std::fmt;

/// Broad category of an [`InspectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The ANSI escape parser exceeded its iteration cap.
    AnsiParseLimit,
    /// A configuration value could not be understood.
    InvalidConfig,
    /// Reading or writing a stream failed.
    Io,
    /// An input document or relayed message could not be decoded.
    Decode,
}

impl ErrorCode {
    /// Short machine-readable name of the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnsiParseLimit => "ansi_parse_limit",
            Self::InvalidConfig => "invalid_config",
            Self::Io => "io",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by the fallible parts of inspectlog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectError {
    /// Category of the failure.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
}

/// Result alias used across the inspectlog crates.
pub type InspectResult<T> = Result<T, InspectError>;

impl InspectError {
    /// Creates an error with an explicit code.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The ANSI parser saw more escape sequences than it is allowed to.
    #[must_use]
    pub fn ansi_parse_limit(limit: usize) -> Self {
        Self::new(
            ErrorCode::AnsiParseLimit,
            format!("ANSI escape parsing exceeded {limit} sequences, input is malformed"),
        )
    }

    /// A configuration value was rejected.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, message)
    }

    /// A stream operation failed.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Io, message)
    }

    /// A document or message could not be decoded.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Decode, message)
    }
}

impl fmt::Display for InspectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for InspectError {}

impl From<std::io::Error> for InspectError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for InspectError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(format!("JSON error: {err}"))
    }
}
