//! Agent/human context detection
//!
//! Decides whether output should be styled based on the environment and on
//! whether a person is watching the terminal.

use serde::{Deserialize, Serialize};

/// Display context representing the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayContext {
    /// Agent context - plain output for machine parsing
    Agent,
    /// Human context - ANSI styled output
    #[default]
    Human,
}

impl DisplayContext {
    /// Create an agent (plain output) context
    #[must_use]
    pub fn new_agent() -> Self {
        Self::Agent
    }

    /// Create a human (styled output) context
    #[must_use]
    pub fn new_human() -> Self {
        Self::Human
    }

    /// Auto-detect the display context from the environment and terminal
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_from(|key| std::env::var(key).ok(), console::user_attended())
    }

    /// Detect the context from an environment lookup and whether stdout is
    /// attended by a terminal
    #[must_use]
    pub fn detect_from(lookup: impl Fn(&str) -> Option<String>, attended: bool) -> Self {
        if should_enable_styling(&lookup, attended) {
            Self::Human
        } else {
            Self::Agent
        }
    }

    /// Check if this is a human context (styled output enabled)
    #[must_use]
    pub fn is_human(&self) -> bool {
        matches!(self, Self::Human)
    }

    /// Check if this is an agent context (plain output)
    #[must_use]
    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent)
    }
}

/// Variables whose presence marks a non-interactive or agent environment
const AGENT_VARS: &[&str] = &[
    "CI",
    "AGENT_MODE",
    "INSPECTLOG_PLAIN",
    "NO_COLOR",
];

/// Determine if we're running in an agent context
#[must_use]
pub fn is_agent_context(lookup: impl Fn(&str) -> Option<String>) -> bool {
    AGENT_VARS.iter().any(|key| lookup(key).is_some())
}

/// Determine if styled output should be enabled
#[must_use]
pub fn should_enable_styling(lookup: impl Fn(&str) -> Option<String>, attended: bool) -> bool {
    // Explicit enable always wins
    if lookup("INSPECTLOG_FORCE_COLOR").is_some() {
        return true;
    }
    if is_agent_context(&lookup) {
        return false;
    }
    attended
}
