//! Centralized configuration for inspectlog console output.
//!
//! `ConsoleConfig` gathers display, threshold, and layout settings. It can be
//! built programmatically, read from a TOML file, and overridden from
//! environment variables.
//!
//! ```toml
//! context = "human"
//! threshold = "info"
//! line_limit = 60
//! max_elements = 200
//! timestamps = true
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use inspectlog_core::logging::targets;
use inspectlog_core::{DescribeOptions, InspectError, InspectResult};
use log::debug;
use serde::Deserialize;

use crate::detection::DisplayContext;
use crate::level::LogLevel;
use crate::logger::Threshold;

/// Comprehensive configuration for inspectlog console output
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    // Display mode
    /// Override display context (None = auto-detect)
    pub context: Option<DisplayContext>,
    /// Force color output even in non-TTY
    pub force_color: Option<bool>,
    /// Force plain text mode (no styling)
    pub force_plain: bool,

    // Logging
    /// Minimum level that is dispatched (None = everything)
    pub threshold: Option<LogLevel>,
    /// Show `HH:MM:SS` timestamps
    pub timestamps: bool,
    /// Show `log`/`tracing` targets as prefix tags
    pub show_targets: bool,

    // Layout
    /// Packing width below which collections stay on one line
    pub line_limit: usize,
    /// Arrays longer than this are truncated
    pub max_elements: usize,
    /// Elements kept from the start of a truncated array
    pub head: usize,
    /// Elements kept from the end of a truncated array
    pub tail: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let describe = DescribeOptions::default();
        Self {
            context: None,
            force_color: None,
            force_plain: false,
            threshold: None,
            timestamps: false,
            show_targets: true,
            line_limit: 50,
            max_elements: describe.max_elements,
            head: describe.head,
            tail: describe.tail,
        }
    }
}

impl ConsoleConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    ///
    /// # Environment Variables
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `INSPECTLOG_FORCE_COLOR` | (set) | Force styled output |
    /// | `INSPECTLOG_PLAIN` | (set) | Force plain output |
    /// | `NO_COLOR` | (set) | Disable colors (standard) |
    /// | `INSPECTLOG_LEVEL` | debug/conn/info/warn/error/crit | Threshold |
    /// | `INSPECTLOG_LINE_LIMIT` | integer | Packing width |
    /// | `INSPECTLOG_TIMESTAMPS` | 0/1 | Show timestamps |
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Overlay environment variables on this config
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_lookup(|key| env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup on this config
    #[must_use]
    pub fn apply_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Display mode
        if lookup("INSPECTLOG_FORCE_COLOR").is_some() {
            self.force_color = Some(true);
        }
        if lookup("INSPECTLOG_PLAIN").is_some() || lookup("NO_COLOR").is_some() {
            self.force_plain = true;
        }

        // Logging
        if let Some(level) = lookup("INSPECTLOG_LEVEL") {
            match level.parse() {
                Ok(level) => self.threshold = Some(level),
                Err(err) => debug!(target: targets::CONFIG, "ignoring INSPECTLOG_LEVEL: {err}"),
            }
        }
        if let Some(value) = lookup("INSPECTLOG_TIMESTAMPS") {
            self.timestamps = !matches!(value.to_lowercase().as_str(), "0" | "false" | "");
        }

        // Layout
        if let Some(value) = lookup("INSPECTLOG_LINE_LIMIT") {
            match value.parse::<usize>() {
                Ok(limit) if limit > 0 => self.line_limit = limit,
                _ => debug!(target: targets::CONFIG, "ignoring INSPECTLOG_LINE_LIMIT={value:?}"),
            }
        }

        self
    }

    /// Parse config from TOML text
    pub fn from_toml_str(text: &str) -> InspectResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|err| InspectError::invalid_config(format!("TOML error: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read config from a TOML file
    pub fn load(path: &Path) -> InspectResult<Self> {
        debug!(target: targets::CONFIG, "loading config from {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Default config file location: `<config dir>/inspectlog/config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("inspectlog").join("config.toml"))
    }

    /// Read the default config file if it exists, then apply environment
    /// overrides
    pub fn load_default() -> InspectResult<Self> {
        let base = match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path)?,
            _ => Self::default(),
        };
        Ok(base.apply_env())
    }

    /// Check that the layout settings are usable
    pub fn validate(&self) -> InspectResult<()> {
        if self.line_limit == 0 {
            return Err(InspectError::invalid_config("line_limit must be positive"));
        }
        if self.head + self.tail > self.max_elements {
            return Err(InspectError::invalid_config(format!(
                "head ({}) + tail ({}) exceeds max_elements ({})",
                self.head, self.tail, self.max_elements
            )));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────

    /// Force color output
    #[must_use]
    pub fn force_color(mut self, force: bool) -> Self {
        self.force_color = Some(force);
        self
    }

    /// Enable plain text mode (no styling)
    #[must_use]
    pub fn plain_mode(mut self) -> Self {
        self.force_plain = true;
        self
    }

    /// Set display context explicitly
    #[must_use]
    pub fn with_context(mut self, context: DisplayContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the threshold level
    #[must_use]
    pub fn with_threshold(mut self, level: LogLevel) -> Self {
        self.threshold = Some(level);
        self
    }

    /// Show timestamps
    #[must_use]
    pub fn with_timestamps(mut self, show: bool) -> Self {
        self.timestamps = show;
        self
    }

    /// Set the packing width
    #[must_use]
    pub fn with_line_limit(mut self, line_limit: usize) -> Self {
        self.line_limit = line_limit;
        self
    }

    /// Set the array truncation limit
    #[must_use]
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = max;
        self
    }

    // ─────────────────────────────────────────────────
    // Resolution Methods
    // ─────────────────────────────────────────────────

    /// Resolve the display context based on config and environment
    #[must_use]
    pub fn resolve_context(&self) -> DisplayContext {
        if self.force_plain {
            return DisplayContext::new_agent();
        }
        if let Some(true) = self.force_color {
            return DisplayContext::new_human();
        }
        self.context.unwrap_or_else(DisplayContext::detect)
    }

    /// Check if styled output should be used based on resolved context
    #[must_use]
    pub fn should_use_styling(&self) -> bool {
        self.resolve_context().is_human()
    }

    /// Truncation settings for the descriptor
    #[must_use]
    pub fn describe_options(&self) -> DescribeOptions {
        DescribeOptions::new()
            .with_max_elements(self.max_elements)
            .with_split(self.head, self.tail)
    }

    /// A fresh threshold handle at the configured level
    #[must_use]
    pub fn threshold_handle(&self) -> Threshold {
        self.threshold.map_or_else(Threshold::default, Threshold::at)
    }
}
