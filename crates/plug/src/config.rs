//! Session configuration

use serde::{Deserialize, Serialize};

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlugConfig {
    /// Placed between items passed to `print`
    pub separator: String,
    /// Appended after the last item passed to `print`
    pub terminator: String,
    /// Ignore whitespace-only lines on the inbound stream
    pub skip_blank_lines: bool,
}

impl Default for PlugConfig {
    fn default() -> Self {
        Self {
            separator: " ".to_string(),
            terminator: "\n".to_string(),
            skip_blank_lines: true,
        }
    }
}
