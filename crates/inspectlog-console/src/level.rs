//! Severity levels.

use std::fmt;
use std::str::FromStr;

use inspectlog_core::{ColorName, InspectError};
use serde::{Deserialize, Serialize};

/// Output stream a level is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Regular output (stdout).
    Log,
    /// Warnings (stderr).
    Warn,
    /// Errors (stderr).
    Error,
}

impl Role {
    /// Whether messages with this role go to the error stream.
    #[must_use]
    pub fn is_stderr(&self) -> bool {
        !matches!(self, Self::Log)
    }
}

/// Message severity.
///
/// | Level | Importance | Label  | Color   | Role  |
/// |-------|------------|--------|---------|-------|
/// | debug | 0          | `@DBG` | magenta | log   |
/// | conn  | 1          | `CONN` | green   | log   |
/// | info  | 3          | `INFO` | cyan    | log   |
/// | warn  | 4          | `WARN` | yellow  | warn  |
/// | error | 4          | `ERR!` | red     | error |
/// | crit  | 5          | `crit` | red     | error |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Conn,
    Info,
    Warn,
    Error,
    Crit,
}

impl LogLevel {
    /// All levels, least important first.
    pub const ALL: [LogLevel; 6] = [
        Self::Debug,
        Self::Conn,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Crit,
    ];

    /// Wire name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Conn => "conn",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Crit => "crit",
        }
    }

    /// Four-character label shown in rendered messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Debug => "@DBG",
            Self::Conn => "CONN",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERR!",
            Self::Crit => "crit",
        }
    }

    #[must_use]
    pub fn color(&self) -> ColorName {
        match self {
            Self::Debug => ColorName::Magenta,
            Self::Conn => ColorName::Green,
            Self::Info => ColorName::Cyan,
            Self::Warn => ColorName::Yellow,
            Self::Error | Self::Crit => ColorName::Red,
        }
    }

    /// Rank compared against the logger threshold.
    #[must_use]
    pub fn importance(&self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Conn => 1,
            Self::Info => 3,
            Self::Warn | Self::Error => 4,
            Self::Crit => 5,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Debug | Self::Conn | Self::Info => Role::Log,
            Self::Warn => Role::Warn,
            Self::Error | Self::Crit => Role::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "trace" => Ok(Self::Debug),
            "conn" => Ok(Self::Conn),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "crit" | "critical" => Ok(Self::Crit),
            other => Err(InspectError::invalid_config(format!(
                "unknown log level '{other}'"
            ))),
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug | log::Level::Trace => Self::Debug,
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}
