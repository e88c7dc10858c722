//! Editor tuning knobs.

use dg_core::Point;
use serde::Deserialize;
use std::time::Duration;

/// Configuration for the command stack, animations, and hover popups.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undo steps kept; the oldest is evicted. Default: **100**.
    pub undo_history_depth: usize,

    /// Duration of move / undo / redo animations. Default: **250 ms**.
    pub animation_duration_ms: u64,

    /// How long the pointer must rest on an element before its popup is
    /// requested. Default: **700 ms**.
    pub popup_delay_ms: u64,

    /// Offset from the pointer to the popup's top-left corner. Default: **(-20, 20)**.
    pub popup_offset: Point,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_history_depth: 100,
            animation_duration_ms: 250,
            popup_delay_ms: 700,
            popup_offset: Point::new(-20.0, 20.0),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn popup_delay(&self) -> Duration {
        Duration::from_millis(self.popup_delay_ms)
    }
}
