use serde::{Deserialize, Serialize};

use super::archetype::TrackArchetype;
use super::media::MediaId;

/// Arena key of a track. Ids are never reused within one timeline, so a
/// stale id simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackId(pub u32);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the last layout pass put a track
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackLayout {
    /// Indentation of the header content
    pub x_offset: f32,
    /// Top of the header (meaningless while hidden)
    pub y: f32,
    /// Whether the header is shown at all (every ancestor expanded)
    pub visible: bool,
}

/// A node in the timeline's track tree.
///
/// Structural fields (parent, children, media, expanded) are only changed
/// through `ops::track_ops` so the timeline's root list, events and layout
/// stay in step.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    /// Unique within the owning timeline
    pub name: String,
    /// Shown instead of the name when set
    pub title: Option<String>,
    pub archetype: TrackArchetype,
    pub muted: bool,
    pub looped: bool,
    pub(crate) expanded: bool,
    pub(crate) parent: Option<TrackId>,
    pub(crate) children: Vec<TrackId>,
    pub(crate) media: Vec<MediaId>,
    pub(crate) layout: TrackLayout,
}

impl Track {
    pub fn new(id: TrackId, name: String, archetype: TrackArchetype) -> Self {
        Track {
            id,
            name,
            title: None,
            archetype,
            muted: false,
            looped: false,
            expanded: false,
            parent: None,
            children: Vec::new(),
            media: Vec::new(),
            layout: TrackLayout::default(),
        }
    }

    pub fn parent(&self) -> Option<TrackId> {
        self.parent
    }

    pub fn children(&self) -> &[TrackId] {
        &self.children
    }

    pub fn media(&self) -> &[MediaId] {
        &self.media
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_collapsed(&self) -> bool {
        !self.expanded
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Only tracks with children show an expand arrow
    pub fn can_expand(&self) -> bool {
        self.has_children()
    }

    pub fn layout(&self) -> TrackLayout {
        self.layout
    }

    /// Title override, falling back to the name
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}
