use serde::{Deserialize, Serialize};

use super::track::TrackId;
use crate::util::geometry::Rect;

/// Arena key of a media segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MediaId(pub u32);

/// A time-bounded segment owned by exactly one track at a time
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub id: MediaId,
    /// First frame covered
    pub start_frame: u32,
    /// Length in frames (at least 1)
    pub duration_frames: u32,
    pub(crate) owner: Option<TrackId>,
    /// Mirrors the owning track's visibility after each layout pass
    pub visible: bool,
    /// Placement computed by the owning track's layout pass
    pub bounds: Rect,
}

impl Media {
    pub fn new(id: MediaId, start_frame: u32, duration_frames: u32) -> Self {
        Media {
            id,
            start_frame,
            duration_frames: duration_frames.max(1),
            owner: None,
            visible: false,
            bounds: Rect::default(),
        }
    }

    pub fn owner(&self) -> Option<TrackId> {
        self.owner
    }

    /// Exclusive end frame
    pub fn end_frame(&self) -> u32 {
        self.start_frame.saturating_add(self.duration_frames)
    }

    pub fn contains_frame(&self, frame: u32) -> bool {
        frame >= self.start_frame && frame < self.end_frame()
    }

    /// Bind to a new owner; `None` detaches and hides the segment
    pub fn on_timeline_changed(&mut self, owner: Option<TrackId>) {
        self.owner = owner;
        if owner.is_none() {
            self.visible = false;
        }
    }

    /// Recompute horizontal placement for a new zoom level
    pub fn on_timeline_zoom_changed(&mut self, zoom: f32, units_per_second: f32, fps: f32) {
        if fps <= 0.0 {
            return;
        }
        let scale = units_per_second * zoom / fps;
        self.bounds.x = self.start_frame as f32 * scale;
        self.bounds.width = self.duration_frames as f32 * scale;
    }

    /// Rescale frame positions so the segment keeps its place in time
    pub fn on_timeline_fps_changed(&mut self, before: f32, after: f32) {
        if before <= 0.0 || after <= 0.0 || before == after {
            return;
        }
        let ratio = after / before;
        self.start_frame = (self.start_frame as f32 * ratio).round() as u32;
        self.duration_frames = ((self.duration_frames as f32 * ratio).round() as u32).max(1);
    }

    pub fn on_deleted(&mut self) {
        self.on_timeline_changed(None);
    }
}
