use crate::formatting::ClearFormattingPolicy;
use crate::undo_stack::DEFAULT_HISTORY_DEPTH;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Editor-side settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// States kept by undo/redo
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// How long transient notices stay visible
    #[serde(default = "default_notice_duration_ms")]
    pub notice_duration_ms: u64,

    #[serde(default)]
    pub clear_formatting: ClearFormattingPolicy,
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

fn default_notice_duration_ms() -> u64 {
    3000
}

impl EditorConfig {
    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: default_history_depth(),
            notice_duration_ms: default_notice_duration_ms(),
            clear_formatting: ClearFormattingPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"clearFormatting":"strict"}"#).unwrap();
        assert_eq!(config.clear_formatting, ClearFormattingPolicy::Strict);
        assert_eq!(config.history_depth, 100);
        assert_eq!(config.notice_duration(), Duration::from_secs(3));
    }
}
