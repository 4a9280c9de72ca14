use serde::{Deserialize, Serialize};

use crate::model::config::LayoutConfig;
use crate::util::geometry::{Point, Rect};

/// Where a drop lands relative to the hovered track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPosition {
    #[default]
    None,
    /// Sibling before the track
    Above,
    /// Sibling after the track
    Below,
    /// Last child of the track
    At,
}

/// One track header in its own local space: origin at the header's top-left
/// corner, `height` tall and `width` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub node_offset: f32,
}

impl HeaderGeometry {
    pub fn new(metrics: &LayoutConfig, width: f32) -> Self {
        HeaderGeometry {
            width,
            height: metrics.header_height,
            margin: metrics.drag_margin,
            node_offset: metrics.node_offset,
        }
    }

    pub fn header(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Straddles the top edge, shifted up by the gap to the previous header
    pub fn above_zone(&self) -> Rect {
        Rect::new(
            0.0,
            -self.margin - self.node_offset,
            self.width,
            self.margin * 2.0,
        )
    }

    pub fn below_zone(&self) -> Rect {
        Rect::new(
            0.0,
            self.height - self.margin,
            self.width,
            self.margin * 2.0,
        )
    }

    pub fn hits_header(&self, local: Point) -> bool {
        self.header().contains(local)
    }

    /// Classify a pointer position. The below zone only exists while the
    /// track is collapsed; an expanded track gives that strip to its first
    /// child's above zone.
    pub fn tie_break(&self, local: Point, collapsed: bool) -> DragPosition {
        if self.above_zone().contains(local) {
            DragPosition::Above
        } else if collapsed && self.below_zone().contains(local) {
            DragPosition::Below
        } else {
            DragPosition::At
        }
    }
}
