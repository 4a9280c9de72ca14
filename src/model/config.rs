use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from trackline.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Header geometry used by layout, hit testing and the drag tie-break.
/// Units are whatever the host draws in: pixels for a GUI, cells for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Height of a track header (H)
    pub header_height: f32,
    /// Gap between consecutive headers, also the upward shift of the
    /// "above" drop zone
    pub node_offset: f32,
    /// Half-height of the above/below drop zones (M)
    pub drag_margin: f32,
    /// Extra x offset per nesting level
    pub indent: f32,
    /// Side of the square expand arrow
    pub arrow_size: f32,
    /// Gap between the indentation and the arrow
    pub arrow_padding: f32,
    /// Vertical inset of media inside the header row
    pub media_inset: f32,
    /// Horizontal units per second of timeline at zoom 1
    pub units_per_second: f32,
    /// Pointer travel needed before a press turns into a drag
    pub drag_start_distance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            header_height: 22.0,
            node_offset: 1.0,
            drag_margin: 2.0,
            indent: 12.0,
            arrow_size: 12.0,
            arrow_padding: 4.0,
            media_inset: 2.0,
            units_per_second: 100.0,
            drag_start_distance: 10.0,
        }
    }
}

impl LayoutConfig {
    /// Cell-based metrics for the terminal UI: every header spans three rows
    /// (above zone, title, below zone).
    pub fn cells() -> Self {
        LayoutConfig {
            header_height: 3.0,
            node_offset: 0.0,
            drag_margin: 1.0,
            indent: 2.0,
            arrow_size: 2.0,
            arrow_padding: 1.0,
            media_inset: 1.0,
            units_per_second: 4.0,
            drag_start_distance: 1.0,
        }
    }

    /// Vertical distance between the tops of consecutive visible headers
    pub fn row_pitch(&self) -> f32 {
        self.header_height + self.node_offset
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Frame rate for new timelines
    #[serde(default = "default_fps")]
    pub fps: f32,
    /// File opened when no path is given
    #[serde(default = "default_file")]
    pub default_file: String,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        TimelineConfig {
            fps: default_fps(),
            default_file: default_file(),
        }
    }
}

fn default_fps() -> f32 {
    30.0
}

fn default_file() -> String {
    "timeline.tln".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Capture the mouse for click/drag editing
    #[serde(default = "default_true")]
    pub mouse: bool,
    /// Hex color overrides keyed by theme slot (e.g. `highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            mouse: true,
            colors: HashMap::new(),
        }
    }
}
