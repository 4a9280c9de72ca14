use indexmap::{IndexMap, IndexSet};

use super::archetype::TrackArchetype;
use super::config::LayoutConfig;
use super::event::TimelineEvent;
use super::media::{Media, MediaId};
use super::track::{Track, TrackId, TrackLayout};
use crate::ops::layout;
use crate::ops::names::NameRegistry;

/// Owns every track and media segment of one edited timeline.
///
/// Tracks reference each other by id only: the parent link is a plain back
/// reference, the `children` list and the root list are the ownership edges.
/// The timeline is the source of truth for root-level ordering.
#[derive(Debug, Clone)]
pub struct Timeline {
    tracks: IndexMap<TrackId, Track>,
    media: IndexMap<MediaId, Media>,
    roots: Vec<TrackId>,
    selection: IndexSet<TrackId>,
    next_track_id: u32,
    next_media_id: u32,
    fps: f32,
    zoom: f32,
    current_frame: u32,
    edited: bool,
    layout_config: LayoutConfig,
    layout_lock: u32,
    layout_pending: bool,
    layout_passes: u64,
    content_height: f32,
    events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new(fps: f32, layout_config: LayoutConfig) -> Self {
        Timeline {
            tracks: IndexMap::new(),
            media: IndexMap::new(),
            roots: Vec::new(),
            selection: IndexSet::new(),
            next_track_id: 0,
            next_media_id: 0,
            fps: if fps > 0.0 { fps } else { 30.0 },
            zoom: 1.0,
            current_frame: 0,
            edited: false,
            layout_config,
            layout_lock: 0,
            layout_pending: false,
            layout_passes: 0,
            content_height: 0.0,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Arena access
    // -----------------------------------------------------------------------

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub(crate) fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&id)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.contains_key(&id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn media(&self, id: MediaId) -> Option<&Media> {
        self.media.get(&id)
    }

    pub(crate) fn media_mut(&mut self, id: MediaId) -> Option<&mut Media> {
        self.media.get_mut(&id)
    }

    pub fn all_media(&self) -> impl Iterator<Item = &Media> {
        self.media.values()
    }

    pub fn roots(&self) -> &[TrackId] {
        &self.roots
    }

    pub fn find_by_name(&self, name: &str) -> Option<TrackId> {
        self.tracks
            .values()
            .find(|t| t.name == name)
            .map(|t| t.id)
    }

    pub fn parent_of(&self, id: TrackId) -> Option<TrackId> {
        self.track(id).and_then(|t| t.parent)
    }

    pub fn archetype_of(&self, id: TrackId) -> Option<TrackArchetype> {
        self.track(id).map(|t| t.archetype)
    }

    /// Create a detached track record; callers attach it with `track_ops`
    pub(crate) fn alloc_track(&mut self, name: String, archetype: TrackArchetype) -> TrackId {
        let id = TrackId(self.next_track_id);
        self.next_track_id += 1;
        self.tracks.insert(id, Track::new(id, name, archetype));
        id
    }

    pub(crate) fn alloc_media(&mut self, start_frame: u32, duration_frames: u32) -> MediaId {
        let id = MediaId(self.next_media_id);
        self.next_media_id += 1;
        let mut media = Media::new(id, start_frame, duration_frames);
        media.on_timeline_zoom_changed(self.zoom, self.layout_config.units_per_second, self.fps);
        self.media.insert(id, media);
        id
    }

    pub(crate) fn remove_media_record(&mut self, id: MediaId) -> Option<Media> {
        self.media.shift_remove(&id)
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    /// The list a track is ordered in: its parent's children, or the roots
    pub fn siblings(&self, id: TrackId) -> &[TrackId] {
        match self.parent_of(id).and_then(|p| self.track(p)) {
            Some(parent) => &parent.children,
            None => &self.roots,
        }
    }

    /// Position of a track within its sibling list
    pub fn track_index(&self, id: TrackId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.siblings(id).iter().position(|&t| t == id)
    }

    fn siblings_mut(&mut self, id: TrackId) -> Option<&mut Vec<TrackId>> {
        match self.parent_of(id) {
            Some(parent) => self.tracks.get_mut(&parent).map(|p| &mut p.children),
            None if self.contains(id) => Some(&mut self.roots),
            None => None,
        }
    }

    /// Move a track within its sibling list. Out-of-range indices clamp to
    /// the end. Returns whether the order changed.
    pub fn change_track_index(&mut self, id: TrackId, new_index: usize) -> bool {
        let Some(list) = self.siblings_mut(id) else {
            return false;
        };
        let Some(current) = list.iter().position(|&t| t == id) else {
            return false;
        };
        list.remove(current);
        let target = new_index.min(list.len());
        list.insert(target, id);
        if target == current {
            return false;
        }
        self.arrange_tracks();
        true
    }

    /// Remove a track from whichever list holds it and clear its parent.
    /// Returns the previous parent.
    pub(crate) fn unlink(&mut self, id: TrackId) -> Option<TrackId> {
        let parent = self.parent_of(id);
        match parent {
            Some(p) => {
                if let Some(pt) = self.tracks.get_mut(&p) {
                    pt.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
        if let Some(t) = self.tracks.get_mut(&id) {
            t.parent = None;
        }
        parent
    }

    pub(crate) fn push_root(&mut self, id: TrackId) {
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }

    /// All tracks in display order (pre-order over the roots)
    pub fn document_order(&self) -> Vec<TrackId> {
        let mut out = Vec::with_capacity(self.tracks.len());
        let mut stack: Vec<TrackId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(t) = self.track(id) {
                stack.extend(t.children.iter().rev().copied());
            }
        }
        out
    }

    /// `id` and every descendant, children before parents
    pub fn subtree_post_order(&self, id: TrackId) -> Vec<TrackId> {
        let mut pre = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(t) = self.track(cur) {
                pre.push(cur);
                stack.extend(t.children.iter().copied());
            }
        }
        pre.reverse();
        pre
    }

    pub fn depth_of(&self, id: TrackId) -> usize {
        let mut depth = 0;
        let mut cur = self.parent_of(id);
        while let Some(p) = cur {
            depth += 1;
            cur = self.parent_of(p);
        }
        depth
    }

    pub fn on_tracks_order_changed(&mut self) {
        self.events.push(TimelineEvent::OrderChanged);
        self.arrange_tracks();
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout_config
    }

    /// Request a layout pass. While layout is suspended this only records
    /// that a pass is owed.
    pub fn arrange_tracks(&mut self) {
        if self.layout_lock > 0 {
            self.layout_pending = true;
            return;
        }
        self.perform_layout();
    }

    /// Run `f` with layout suspended. Leaving the outermost scope runs
    /// exactly one layout pass.
    pub fn with_layout_suspended<R>(&mut self, f: impl FnOnce(&mut Timeline) -> R) -> R {
        self.layout_lock += 1;
        let result = f(self);
        self.layout_lock -= 1;
        if self.layout_lock == 0 {
            self.layout_pending = false;
            self.perform_layout();
        }
        result
    }

    pub fn is_layout_suspended(&self) -> bool {
        self.layout_lock > 0
    }

    pub fn layout_pending(&self) -> bool {
        self.layout_pending
    }

    /// Number of layout passes run so far
    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }

    /// Total height of the visible headers after the last pass
    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    fn perform_layout(&mut self) {
        let placed: Vec<(TrackId, TrackLayout)> = layout::compute(self);
        let metrics = self.layout_config;
        let mut bottom = 0.0f32;
        for (id, placement) in placed {
            let media_ids = match self.tracks.get_mut(&id) {
                Some(t) => {
                    t.layout = placement;
                    t.media.clone()
                }
                None => continue,
            };
            if placement.visible {
                bottom = bottom.max(placement.y + metrics.row_pitch());
            }
            for m in media_ids {
                if let Some(media) = self.media.get_mut(&m) {
                    media.visible = placement.visible;
                    media.bounds.y = placement.y + metrics.media_inset;
                    media.bounds.height = (metrics.header_height - metrics.media_inset * 2.0).max(0.0);
                }
            }
        }
        self.content_height = bottom;
        self.layout_passes += 1;
        self.events.push(TimelineEvent::Arranged);
    }

    // -----------------------------------------------------------------------
    // Edited flag
    // -----------------------------------------------------------------------

    pub fn mark_as_edited(&mut self) {
        self.edited = true;
        self.events.push(TimelineEvent::Edited);
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn clear_edited(&mut self) {
        self.edited = false;
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select a track. Non-additive selection replaces the current set.
    pub fn select(&mut self, id: TrackId, additive: bool) {
        if !self.contains(id) {
            return;
        }
        if !additive {
            self.selection.clear();
        }
        self.selection.insert(id);
        self.events.push(TimelineEvent::SelectionChanged);
    }

    pub fn deselect(&mut self, id: TrackId) {
        if self.selection.shift_remove(&id) {
            self.events.push(TimelineEvent::SelectionChanged);
        }
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.events.push(TimelineEvent::SelectionChanged);
        }
    }

    pub fn selected_tracks(&self) -> &IndexSet<TrackId> {
        &self.selection
    }

    pub fn is_selected(&self, id: TrackId) -> bool {
        self.selection.contains(&id)
    }

    // -----------------------------------------------------------------------
    // Names
    // -----------------------------------------------------------------------

    pub fn is_track_name_valid(&self, name: &str) -> bool {
        NameRegistry::new(self).is_valid_name(name)
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    /// Delete a track with its media and every descendant. The parent
    /// survives. Returns false for an unknown id.
    pub fn delete(&mut self, id: TrackId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.unlink(id) {
            self.events.push(TimelineEvent::SubTracksChanged(parent));
        }
        let doomed = self.subtree_post_order(id);
        for t in &doomed {
            let Some(track) = self.tracks.shift_remove(t) else {
                continue;
            };
            for m in &track.media {
                if let Some(media) = self.media.get_mut(m) {
                    media.on_deleted();
                }
                self.media.shift_remove(m);
            }
            if self.selection.shift_remove(t) {
                self.events.push(TimelineEvent::SelectionChanged);
            }
            self.events.push(TimelineEvent::TrackDeleted(*t));
        }
        tracing::debug!(track = %id, removed = doomed.len(), "deleted track subtree");
        self.mark_as_edited();
        self.arrange_tracks();
        true
    }

    /// Delete every selected track. Returns how many selected tracks were
    /// removed (descendants of a selected track are not counted twice).
    pub fn delete_selection(&mut self) -> usize {
        let selected: Vec<TrackId> = self.selection.iter().copied().collect();
        if selected.is_empty() {
            return 0;
        }
        self.with_layout_suspended(|tl| {
            selected
                .into_iter()
                .filter(|&id| tl.delete(id))
                .count()
        })
    }

    // -----------------------------------------------------------------------
    // Time context
    // -----------------------------------------------------------------------

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: f32) {
        if fps <= 0.0 || fps == self.fps {
            return;
        }
        let before = self.fps;
        self.fps = fps;
        let (zoom, ups) = (self.zoom, self.layout_config.units_per_second);
        for media in self.media.values_mut() {
            media.on_timeline_fps_changed(before, fps);
            media.on_timeline_zoom_changed(zoom, ups, fps);
        }
        self.current_frame = (self.current_frame as f32 * fps / before).round() as u32;
        self.mark_as_edited();
        self.arrange_tracks();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        let zoom = zoom.clamp(0.01, 100.0);
        if zoom == self.zoom {
            return;
        }
        self.zoom = zoom;
        let (fps, ups) = (self.fps, self.layout_config.units_per_second);
        for media in self.media.values_mut() {
            media.on_timeline_zoom_changed(zoom, ups, fps);
        }
        self.arrange_tracks();
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn set_current_frame(&mut self, frame: u32) {
        self.current_frame = frame;
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub(crate) fn push_event(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    /// Take every queued notification, oldest first
    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::track_ops::{add_child, spawn_track};

    fn timeline() -> Timeline {
        Timeline::new(30.0, LayoutConfig::default())
    }

    #[test]
    fn change_track_index_clamps() {
        let mut tl = timeline();
        let a = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let b = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let c = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();

        assert!(tl.change_track_index(a, 99));
        assert_eq!(tl.roots(), &[b, c, a]);
        assert!(!tl.change_track_index(a, 2));
        assert!(tl.change_track_index(a, 0));
        assert_eq!(tl.roots(), &[a, b, c]);
    }

    #[test]
    fn document_order_is_preorder() {
        let mut tl = timeline();
        let a = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let b = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let a1 = spawn_track(&mut tl, TrackArchetype::Folder, Some(a)).unwrap();
        let a1x = spawn_track(&mut tl, TrackArchetype::Audio, Some(a1)).unwrap();
        assert_eq!(tl.document_order(), vec![a, a1, a1x, b]);
        assert_eq!(tl.subtree_post_order(a), vec![a1x, a1, a]);
        assert_eq!(tl.depth_of(a1x), 2);
    }

    #[test]
    fn delete_cascades_to_children_and_media_but_not_parent() {
        let mut tl = timeline();
        let root = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let child = spawn_track(&mut tl, TrackArchetype::Folder, Some(root)).unwrap();
        let leaf = spawn_track(&mut tl, TrackArchetype::Audio, Some(child)).unwrap();
        let media = tl.track(leaf).unwrap().media()[0];
        tl.select(leaf, false);

        assert!(tl.delete(child));
        assert!(tl.contains(root));
        assert!(!tl.contains(child));
        assert!(!tl.contains(leaf));
        assert!(tl.media(media).is_none());
        assert!(tl.track(root).unwrap().children().is_empty());
        assert!(tl.selected_tracks().is_empty());
        assert!(tl.is_edited());

        let events = tl.drain_events();
        assert!(events.contains(&TimelineEvent::TrackDeleted(leaf)));
        assert!(events.contains(&TimelineEvent::SubTracksChanged(root)));
    }

    #[test]
    fn delete_selection_handles_nested_selection() {
        let mut tl = timeline();
        let a = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let a1 = spawn_track(&mut tl, TrackArchetype::Folder, Some(a)).unwrap();
        let b = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        tl.select(a, false);
        tl.select(a1, true);

        assert_eq!(tl.delete_selection(), 1);
        assert_eq!(tl.roots(), &[b]);
        assert_eq!(tl.track_count(), 1);
    }

    #[test]
    fn nested_suspension_flushes_once() {
        let mut tl = timeline();
        let a = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let before = tl.layout_passes();
        tl.with_layout_suspended(|tl| {
            tl.arrange_tracks();
            tl.with_layout_suspended(|tl| tl.arrange_tracks());
            assert!(tl.layout_pending());
            tl.arrange_tracks();
        });
        assert_eq!(tl.layout_passes(), before + 1);
        assert!(!tl.layout_pending());
        assert!(tl.track(a).unwrap().layout().visible);
    }

    #[test]
    fn select_replaces_unless_additive() {
        let mut tl = timeline();
        let a = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        let b = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        tl.select(a, false);
        tl.select(b, true);
        assert_eq!(tl.selected_tracks().len(), 2);
        tl.select(a, false);
        assert_eq!(tl.selected_tracks().iter().copied().collect::<Vec<_>>(), vec![a]);
        tl.deselect(a);
        assert!(tl.selected_tracks().is_empty());
    }

    #[test]
    fn set_fps_rescales_media_and_marks_edited() {
        let mut tl = timeline();
        let a = spawn_track(&mut tl, TrackArchetype::Audio, None).unwrap();
        let m = tl.track(a).unwrap().media()[0];
        tl.clear_edited();
        tl.set_fps(60.0);
        assert_eq!(tl.media(m).unwrap().duration_frames, 60);
        assert!(tl.is_edited());
    }

    #[test]
    fn unknown_ids_are_inert() {
        let mut tl = timeline();
        let ghost = TrackId(42);
        assert!(!tl.delete(ghost));
        assert!(!tl.change_track_index(ghost, 0));
        assert_eq!(tl.track_index(ghost), None);
        tl.select(ghost, false);
        assert!(tl.selected_tracks().is_empty());
        let a = spawn_track(&mut tl, TrackArchetype::Folder, None).unwrap();
        assert!(!add_child(&mut tl, a, ghost).unwrap_or(false));
    }
}
