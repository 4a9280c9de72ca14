use crate::model::archetype::TrackArchetype;
use crate::model::event::TimelineEvent;
use crate::model::media::MediaId;
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::names::{self, NameRegistry};

/// Error type for track operations.
///
/// Only stale or unknown ids are errors. Structurally refused edits (cycles,
/// moves onto the current position) come back as `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("track not found: {0}")]
    NotFound(TrackId),
    #[error("media not found: {0:?}")]
    MediaNotFound(MediaId),
    #[error("{parent} tracks can't hold {child} tracks")]
    NotAccepted {
        parent: TrackArchetype,
        child: TrackArchetype,
    },
}

fn require(tl: &Timeline, id: TrackId) -> Result<(), TrackError> {
    if tl.contains(id) {
        Ok(())
    } else {
        Err(TrackError::NotFound(id))
    }
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// Whether `other` is a strict descendant of `track`. A track never
/// contains itself.
pub fn contains_track(tl: &Timeline, track: TrackId, other: TrackId) -> bool {
    let Some(start) = tl.track(track) else {
        return false;
    };
    let mut stack: Vec<TrackId> = start.children().to_vec();
    while let Some(id) = stack.pop() {
        if id == other {
            return true;
        }
        if let Some(t) = tl.track(id) {
            stack.extend_from_slice(t.children());
        }
    }
    false
}

/// Append `child` to `parent`'s children, detaching it from wherever it was.
/// Refuses to nest a track inside itself or one of its descendants.
pub fn add_child(tl: &mut Timeline, parent: TrackId, child: TrackId) -> Result<bool, TrackError> {
    require(tl, parent)?;
    require(tl, child)?;
    if parent == child || contains_track(tl, child, parent) {
        tracing::debug!(%parent, %child, "rejected add_child: would create a cycle");
        return Ok(false);
    }
    if tl.parent_of(child) == Some(parent) {
        return Ok(false);
    }

    if let Some(old) = tl.unlink(child) {
        tl.push_event(TimelineEvent::SubTracksChanged(old));
    }
    if let Some(p) = tl.track_mut(parent) {
        p.children.push(child);
    }
    if let Some(c) = tl.track_mut(child) {
        c.parent = Some(parent);
    }
    tl.push_event(TimelineEvent::SubTracksChanged(parent));
    tl.arrange_tracks();
    Ok(true)
}

/// Detach `child` from `parent`. The child becomes a root at the end of the
/// root list, since a parentless track always lives there.
pub fn remove_child(
    tl: &mut Timeline,
    parent: TrackId,
    child: TrackId,
) -> Result<bool, TrackError> {
    require(tl, parent)?;
    require(tl, child)?;
    if tl.parent_of(child) != Some(parent) {
        return Ok(false);
    }
    tl.unlink(child);
    tl.push_root(child);
    tl.push_event(TimelineEvent::SubTracksChanged(parent));
    tl.arrange_tracks();
    Ok(true)
}

/// Move `track` under `new_parent`, or to the root list for `None`.
///
/// Returns `Ok(false)` without touching the tree when the destination is the
/// track itself, one of its descendants, or its current parent.
pub fn set_parent(
    tl: &mut Timeline,
    track: TrackId,
    new_parent: Option<TrackId>,
) -> Result<bool, TrackError> {
    require(tl, track)?;
    if let Some(p) = new_parent {
        require(tl, p)?;
        if p == track || contains_track(tl, track, p) {
            tracing::debug!(%track, parent = %p, "rejected set_parent: would create a cycle");
            return Ok(false);
        }
    }
    let old_parent = tl.parent_of(track);
    if old_parent == new_parent {
        return Ok(false);
    }

    tl.with_layout_suspended(|tl| {
        if let Some(old) = old_parent {
            remove_child(tl, old, track)?;
        }
        match new_parent {
            Some(p) => add_child(tl, p, track),
            None => Ok(true),
        }
    })?;
    tracing::debug!(%track, from = ?old_parent, to = ?new_parent, "reparented track");
    Ok(true)
}

/// Position of a track within its parent's children or the root list
pub fn index_of(tl: &Timeline, track: TrackId) -> Option<usize> {
    tl.track_index(track)
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Create a media segment and attach it to `track`
pub fn add_media(
    tl: &mut Timeline,
    track: TrackId,
    start_frame: u32,
    duration_frames: u32,
) -> Result<MediaId, TrackError> {
    require(tl, track)?;
    let media = tl.alloc_media(start_frame, duration_frames);
    attach_media(tl, track, media)?;
    Ok(media)
}

/// Give `media` to `track`. A segment owned elsewhere is detached from its
/// old owner first, so it is never held twice.
pub fn attach_media(tl: &mut Timeline, track: TrackId, media: MediaId) -> Result<bool, TrackError> {
    require(tl, track)?;
    let owner = tl
        .media(media)
        .ok_or(TrackError::MediaNotFound(media))?
        .owner();
    if owner == Some(track) {
        return Ok(false);
    }
    if let Some(old) = owner {
        remove_media(tl, old, media)?;
    }
    if let Some(t) = tl.track_mut(track) {
        t.media.push(media);
    }
    if let Some(m) = tl.media_mut(media) {
        m.on_timeline_changed(Some(track));
    }
    tl.push_event(TimelineEvent::MediaChanged(track));
    tl.arrange_tracks();
    Ok(true)
}

/// Detach `media` from `track`. The segment stays in the timeline,
/// ownerless, until it is attached elsewhere or deleted.
pub fn remove_media(tl: &mut Timeline, track: TrackId, media: MediaId) -> Result<bool, TrackError> {
    require(tl, track)?;
    if tl.media(media).is_none() {
        return Err(TrackError::MediaNotFound(media));
    }
    let held = tl.track(track).is_some_and(|t| t.media().contains(&media));
    if !held {
        return Ok(false);
    }
    if let Some(m) = tl.media_mut(media) {
        m.on_timeline_changed(None);
    }
    if let Some(t) = tl.track_mut(track) {
        t.media.retain(|&m| m != media);
    }
    tl.push_event(TimelineEvent::MediaChanged(track));
    Ok(true)
}

/// Detach and destroy a media segment
pub fn delete_media(tl: &mut Timeline, media: MediaId) -> Result<(), TrackError> {
    let owner = tl
        .media(media)
        .ok_or(TrackError::MediaNotFound(media))?
        .owner();
    if let Some(track) = owner {
        remove_media(tl, track, media)?;
    }
    if let Some(m) = tl.media_mut(media) {
        m.on_deleted();
    }
    tl.remove_media_record(media);
    tl.mark_as_edited();
    Ok(())
}

// ---------------------------------------------------------------------------
// Expand / collapse
// ---------------------------------------------------------------------------

fn set_expanded_flag(tl: &mut Timeline, id: TrackId, expanded: bool) -> bool {
    let changed = match tl.track_mut(id) {
        Some(t) if t.expanded != expanded => {
            t.expanded = expanded;
            true
        }
        _ => false,
    };
    if changed {
        tl.push_event(TimelineEvent::ExpandedChanged {
            track: id,
            expanded,
        });
    }
    changed
}

fn ancestors_root_first(tl: &Timeline, id: TrackId) -> Vec<TrackId> {
    let mut chain = Vec::new();
    let mut cur = tl.parent_of(id);
    while let Some(p) = cur {
        chain.push(p);
        cur = tl.parent_of(p);
    }
    chain.reverse();
    chain
}

/// Expand every ancestor, then the track itself
pub fn expand(tl: &mut Timeline, id: TrackId) -> Result<bool, TrackError> {
    require(tl, id)?;
    let mut changed = false;
    for a in ancestors_root_first(tl, id) {
        changed |= set_expanded_flag(tl, a, true);
    }
    changed |= set_expanded_flag(tl, id, true);
    if changed {
        tl.arrange_tracks();
    }
    Ok(changed)
}

/// Collapse only this track. Descendants keep their own flags.
pub fn collapse(tl: &mut Timeline, id: TrackId) -> Result<bool, TrackError> {
    require(tl, id)?;
    let changed = set_expanded_flag(tl, id, false);
    if changed {
        tl.arrange_tracks();
    }
    Ok(changed)
}

/// Expand the track, its ancestors and all descendants in one layout pass
pub fn expand_all(tl: &mut Timeline, id: TrackId) -> Result<(), TrackError> {
    require(tl, id)?;
    let mut subtree = tl.subtree_post_order(id);
    subtree.reverse();
    tl.with_layout_suspended(|tl| {
        for t in subtree {
            expand(tl, t)?;
        }
        Ok(())
    })
}

/// Collapse the track and all descendants in one layout pass
pub fn collapse_all(tl: &mut Timeline, id: TrackId) -> Result<(), TrackError> {
    require(tl, id)?;
    let subtree = tl.subtree_post_order(id);
    tl.with_layout_suspended(|tl| {
        for t in subtree {
            collapse(tl, t)?;
        }
        Ok(())
    })
}

/// The track and every ancestor are either expanded or have nothing to
/// expand
pub fn is_expanded_all(tl: &Timeline, id: TrackId) -> bool {
    let mut cur = Some(id);
    while let Some(c) = cur {
        let Some(t) = tl.track(c) else {
            return false;
        };
        if t.can_expand() && !t.is_expanded() {
            return false;
        }
        cur = t.parent();
    }
    true
}

/// Whether the whole ancestor chain is expanded, i.e. the header is shown
pub fn is_fully_visible(tl: &Timeline, id: TrackId) -> bool {
    match tl.track(id) {
        Some(t) => match t.parent() {
            None => true,
            Some(p) => is_expanded_all(tl, p),
        },
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Naming and flags
// ---------------------------------------------------------------------------

/// Rename to `base`, suffixing until the name is unique. Marks the timeline
/// edited when the name actually changes.
pub fn rename(tl: &mut Timeline, id: TrackId, base: &str) -> Result<bool, TrackError> {
    let archetype = tl.archetype_of(id).ok_or(TrackError::NotFound(id))?;
    let clean = names::sanitize(base, archetype);
    let unique = NameRegistry::excluding(tl, id).make_unique(&clean);
    let old = match tl.track_mut(id) {
        Some(t) if t.name != unique => std::mem::replace(&mut t.name, unique.clone()),
        _ => return Ok(false),
    };
    tracing::info!(track = %id, %old, new = %unique, "renamed track");
    tl.push_event(TimelineEvent::Renamed {
        track: id,
        old,
        new: unique,
    });
    tl.mark_as_edited();
    Ok(true)
}

pub fn set_title(tl: &mut Timeline, id: TrackId, title: Option<String>) -> Result<bool, TrackError> {
    let track = tl.track_mut(id).ok_or(TrackError::NotFound(id))?;
    let title = title.filter(|t| !t.trim().is_empty());
    if track.title == title {
        return Ok(false);
    }
    track.title = title;
    tl.mark_as_edited();
    Ok(true)
}

pub fn set_muted(tl: &mut Timeline, id: TrackId, muted: bool) -> Result<bool, TrackError> {
    let track = tl.track_mut(id).ok_or(TrackError::NotFound(id))?;
    if track.muted == muted {
        return Ok(false);
    }
    track.muted = muted;
    tl.mark_as_edited();
    Ok(true)
}

pub fn set_looped(tl: &mut Timeline, id: TrackId, looped: bool) -> Result<bool, TrackError> {
    let track = tl.track_mut(id).ok_or(TrackError::NotFound(id))?;
    if track.looped == looped {
        return Ok(false);
    }
    track.looped = looped;
    tl.mark_as_edited();
    Ok(true)
}

/// Muted directly or through any ancestor
pub fn is_effectively_muted(tl: &Timeline, id: TrackId) -> bool {
    let mut cur = Some(id);
    while let Some(c) = cur {
        match tl.track(c) {
            Some(t) if t.muted => return true,
            Some(t) => cur = t.parent(),
            None => return false,
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Delete a track, its media and its descendants
pub fn delete(tl: &mut Timeline, id: TrackId) -> Result<(), TrackError> {
    require(tl, id)?;
    tl.delete(id);
    Ok(())
}

/// Spawn a track named after its archetype
pub fn spawn_track(
    tl: &mut Timeline,
    archetype: TrackArchetype,
    parent: Option<TrackId>,
) -> Result<TrackId, TrackError> {
    spawn_named(tl, archetype, parent, archetype.default_name())
}

/// Spawn a track under `parent` (or as the last root), run the archetype's
/// spawn hook and mark the timeline edited. The name is made unique.
pub fn spawn_named(
    tl: &mut Timeline,
    archetype: TrackArchetype,
    parent: Option<TrackId>,
    base: &str,
) -> Result<TrackId, TrackError> {
    if let Some(p) = parent {
        let parent_kind = tl.archetype_of(p).ok_or(TrackError::NotFound(p))?;
        if !parent_kind.can_add_child_track(archetype) {
            return Err(TrackError::NotAccepted {
                parent: parent_kind,
                child: archetype,
            });
        }
    }
    let name = NameRegistry::new(tl).make_unique(&names::sanitize(base, archetype));
    let id = tl.with_layout_suspended(|tl| {
        let id = tl.alloc_track(name, archetype);
        match parent {
            Some(p) => {
                add_child(tl, p, id)?;
                expand(tl, p)?;
            }
            None => tl.push_root(id),
        }
        on_spawned(tl, id)?;
        Ok::<_, TrackError>(id)
    })?;
    tracing::info!(track = %id, %archetype, "spawned track");
    tl.mark_as_edited();
    Ok(id)
}

fn on_spawned(tl: &mut Timeline, id: TrackId) -> Result<(), TrackError> {
    let archetype = tl.archetype_of(id).ok_or(TrackError::NotFound(id))?;
    if archetype.spawns_expanded()
        && let Some(t) = tl.track_mut(id)
    {
        t.expanded = true;
    }
    if archetype.holds_media() {
        let start = tl.current_frame();
        let one_second = tl.fps().round().max(1.0) as u32;
        add_media(tl, id, start, one_second)?;
    }
    Ok(())
}

/// A track as read back from storage, before it is linked into the tree
#[derive(Debug, Clone)]
pub struct LoadedTrack {
    pub archetype: TrackArchetype,
    pub name: String,
    pub title: Option<String>,
    pub muted: bool,
    pub looped: bool,
    pub expanded: bool,
    pub parent: Option<TrackId>,
    /// (start frame, duration) per segment
    pub media: Vec<(u32, u32)>,
}

/// Link a loaded track into the tree without touching the edited flag.
/// The name is taken as-is; callers reject duplicates beforehand.
pub fn insert_loaded_track(tl: &mut Timeline, loaded: LoadedTrack) -> Result<TrackId, TrackError> {
    if let Some(p) = loaded.parent {
        require(tl, p)?;
    }
    let id = tl.alloc_track(loaded.name, loaded.archetype);
    if let Some(t) = tl.track_mut(id) {
        t.title = loaded.title;
        t.muted = loaded.muted;
        t.looped = loaded.looped;
        t.expanded = loaded.expanded;
    }
    match loaded.parent {
        Some(p) => {
            add_child(tl, p, id)?;
        }
        None => tl.push_root(id),
    }
    for (start, duration) in loaded.media {
        let media = tl.alloc_media(start, duration);
        if let Some(t) = tl.track_mut(id) {
            t.media.push(media);
        }
    }
    on_loaded(tl, id);
    Ok(id)
}

/// Re-bind every media segment's owner back-reference to this track
pub fn on_loaded(tl: &mut Timeline, id: TrackId) {
    let media = tl.track(id).map(|t| t.media().to_vec()).unwrap_or_default();
    for m in media {
        if let Some(seg) = tl.media_mut(m) {
            seg.on_timeline_changed(Some(id));
        }
    }
}

// ---------------------------------------------------------------------------
// Keyframes
// ---------------------------------------------------------------------------

fn keyframes(tl: &Timeline, id: TrackId) -> Vec<u32> {
    let Some(track) = tl.track(id).filter(|t| t.archetype.has_keyframes()) else {
        return Vec::new();
    };
    let mut frames: Vec<u32> = track
        .media()
        .iter()
        .filter_map(|m| tl.media(*m))
        .map(|m| m.start_frame)
        .collect();
    frames.sort_unstable();
    frames.dedup();
    frames
}

/// First keyframe strictly after `frame`
pub fn next_keyframe(tl: &Timeline, id: TrackId, frame: u32) -> Option<u32> {
    keyframes(tl, id).into_iter().find(|&k| k > frame)
}

/// Last keyframe strictly before `frame`
pub fn prev_keyframe(tl: &Timeline, id: TrackId, frame: u32) -> Option<u32> {
    keyframes(tl, id).into_iter().rev().find(|&k| k < frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::LayoutConfig;
    use pretty_assertions::assert_eq;

    fn timeline() -> Timeline {
        Timeline::new(30.0, LayoutConfig::default())
    }

    fn folder(tl: &mut Timeline, name: &str, parent: Option<TrackId>) -> TrackId {
        spawn_named(tl, TrackArchetype::Folder, parent, name).unwrap()
    }

    #[test]
    fn track_never_contains_itself() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        let a1 = folder(&mut tl, "A1", Some(a));
        assert!(!contains_track(&tl, a, a));
        assert!(contains_track(&tl, a, a1));
        assert!(!contains_track(&tl, a1, a));
    }

    #[test]
    fn reparent_under_self_or_descendant_is_rejected() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        let a1 = folder(&mut tl, "A1", Some(a));
        let a2 = folder(&mut tl, "A2", Some(a1));
        let before = tl.document_order();

        assert!(!set_parent(&mut tl, a, Some(a)).unwrap());
        assert!(!set_parent(&mut tl, a, Some(a1)).unwrap());
        assert!(!set_parent(&mut tl, a, Some(a2)).unwrap());
        assert!(!add_child(&mut tl, a2, a).unwrap());

        assert_eq!(tl.document_order(), before);
        assert_eq!(tl.parent_of(a), None);
        assert_eq!(tl.roots(), &[a]);
    }

    #[test]
    fn set_parent_moves_between_levels() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        let b = folder(&mut tl, "B", None);

        assert!(set_parent(&mut tl, b, Some(a)).unwrap());
        assert_eq!(tl.roots(), &[a]);
        assert_eq!(tl.track(a).unwrap().children(), &[b]);
        assert_eq!(tl.parent_of(b), Some(a));

        assert!(set_parent(&mut tl, b, None).unwrap());
        assert_eq!(tl.roots(), &[a, b]);
        assert!(tl.track(a).unwrap().children().is_empty());
    }

    #[test]
    fn remove_child_promotes_to_root() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        let a1 = folder(&mut tl, "A1", Some(a));
        assert!(remove_child(&mut tl, a, a1).unwrap());
        assert!(!remove_child(&mut tl, a, a1).unwrap());
        assert_eq!(tl.roots(), &[a, a1]);
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        assert!(matches!(
            set_parent(&mut tl, TrackId(99), Some(a)),
            Err(TrackError::NotFound(TrackId(99)))
        ));
        assert!(rename(&mut tl, TrackId(99), "x").is_err());
    }

    #[test]
    fn spawn_respects_archetype_policy() {
        let mut tl = timeline();
        let actor = spawn_track(&mut tl, TrackArchetype::Actor, None).unwrap();
        assert!(spawn_track(&mut tl, TrackArchetype::Property, Some(actor)).is_ok());
        assert!(matches!(
            spawn_track(&mut tl, TrackArchetype::Audio, Some(actor)),
            Err(TrackError::NotAccepted { .. })
        ));
    }

    #[test]
    fn spawned_media_tracks_get_one_second_at_current_frame() {
        let mut tl = timeline();
        tl.set_current_frame(12);
        let audio = spawn_track(&mut tl, TrackArchetype::Audio, None).unwrap();
        let m = tl.track(audio).unwrap().media()[0];
        let seg = tl.media(m).unwrap();
        assert_eq!((seg.start_frame, seg.duration_frames), (12, 30));
        assert_eq!(seg.owner(), Some(audio));
    }

    #[test]
    fn media_transfer_is_atomic() {
        let mut tl = timeline();
        let a = spawn_named(&mut tl, TrackArchetype::Audio, None, "A").unwrap();
        let b = spawn_named(&mut tl, TrackArchetype::Audio, None, "B").unwrap();
        let m = tl.track(a).unwrap().media()[0];

        assert!(attach_media(&mut tl, b, m).unwrap());
        assert!(!tl.track(a).unwrap().media().contains(&m));
        assert!(tl.track(b).unwrap().media().contains(&m));
        assert_eq!(tl.media(m).unwrap().owner(), Some(b));

        assert!(remove_media(&mut tl, b, m).unwrap());
        assert_eq!(tl.media(m).unwrap().owner(), None);
        assert!(tl.media(m).is_some());

        delete_media(&mut tl, m).unwrap();
        assert!(tl.media(m).is_none());
    }

    #[test]
    fn collapse_hides_descendants_and_expand_restores() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        let b = folder(&mut tl, "B", Some(a));
        let c = folder(&mut tl, "C", Some(b));
        let d = folder(&mut tl, "D", Some(c));
        collapse(&mut tl, c).unwrap();

        let visibility = |tl: &Timeline| {
            [a, b, c, d]
                .iter()
                .map(|&t| is_fully_visible(tl, t))
                .collect::<Vec<_>>()
        };
        let before = visibility(&tl);
        assert_eq!(before, vec![true, true, true, false]);

        collapse(&mut tl, a).unwrap();
        assert_eq!(visibility(&tl), vec![true, false, false, false]);
        assert!(tl.track(b).unwrap().is_expanded());

        expand(&mut tl, a).unwrap();
        assert_eq!(visibility(&tl), before);
    }

    #[test]
    fn expand_opens_ancestors() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        let b = folder(&mut tl, "B", Some(a));
        let c = folder(&mut tl, "C", Some(b));
        collapse_all(&mut tl, a).unwrap();
        assert!(!is_fully_visible(&tl, c));

        expand(&mut tl, c).unwrap();
        assert!(is_fully_visible(&tl, c));
        assert!(tl.track(a).unwrap().is_expanded());
        assert!(tl.track(b).unwrap().is_expanded());
    }

    #[test]
    fn expand_all_runs_one_layout_pass() {
        let mut tl = timeline();
        let root = folder(&mut tl, "Root", None);
        let mut parent = root;
        for i in 0..6 {
            let child = folder(&mut tl, &format!("N{i}"), Some(parent));
            folder(&mut tl, &format!("Leaf{i}"), Some(parent));
            parent = child;
        }
        collapse_all(&mut tl, root).unwrap();

        let before = tl.layout_passes();
        expand_all(&mut tl, root).unwrap();
        assert_eq!(tl.layout_passes(), before + 1);
        assert!(tl.document_order().iter().all(|&t| is_fully_visible(&tl, t)));

        let before = tl.layout_passes();
        collapse_all(&mut tl, root).unwrap();
        assert_eq!(tl.layout_passes(), before + 1);
    }

    #[test]
    fn rename_marks_edited_and_reports() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        tl.clear_edited();
        tl.drain_events();

        assert!(rename(&mut tl, a, "Intro").unwrap());
        assert!(tl.is_edited());
        assert!(!rename(&mut tl, a, "Intro").unwrap());
        let events = tl.drain_events();
        assert!(events.contains(&TimelineEvent::Renamed {
            track: a,
            old: "A".into(),
            new: "Intro".into(),
        }));
    }

    #[test]
    fn mute_propagates_to_descendants() {
        let mut tl = timeline();
        let a = folder(&mut tl, "A", None);
        let b = folder(&mut tl, "B", Some(a));
        assert!(!is_effectively_muted(&tl, b));
        set_muted(&mut tl, a, true).unwrap();
        assert!(is_effectively_muted(&tl, b));
    }

    #[test]
    fn keyframes_are_media_starts() {
        let mut tl = timeline();
        let actor = spawn_track(&mut tl, TrackArchetype::Actor, None).unwrap();
        let prop = spawn_track(&mut tl, TrackArchetype::Property, Some(actor)).unwrap();
        add_media(&mut tl, prop, 40, 5).unwrap();
        add_media(&mut tl, prop, 10, 5).unwrap();

        assert_eq!(next_keyframe(&tl, prop, 0), Some(10));
        assert_eq!(next_keyframe(&tl, prop, 10), Some(40));
        assert_eq!(next_keyframe(&tl, prop, 40), None);
        assert_eq!(prev_keyframe(&tl, prop, 40), Some(10));
        assert_eq!(prev_keyframe(&tl, prop, 0), None);
        assert_eq!(next_keyframe(&tl, actor, 0), None);
    }

    #[test]
    fn loaded_tracks_bind_media_owners_without_editing() {
        let mut tl = timeline();
        let root = insert_loaded_track(
            &mut tl,
            LoadedTrack {
                archetype: TrackArchetype::Folder,
                name: "Root".into(),
                title: None,
                muted: false,
                looped: false,
                expanded: true,
                parent: None,
                media: vec![],
            },
        )
        .unwrap();
        let audio = insert_loaded_track(
            &mut tl,
            LoadedTrack {
                archetype: TrackArchetype::Audio,
                name: "Music".into(),
                title: Some("Theme".into()),
                muted: true,
                looped: true,
                expanded: false,
                parent: Some(root),
                media: vec![(0, 90)],
            },
        )
        .unwrap();

        assert!(!tl.is_edited());
        let m = tl.track(audio).unwrap().media()[0];
        assert_eq!(tl.media(m).unwrap().owner(), Some(audio));
        assert_eq!(tl.track(audio).unwrap().display_title(), "Theme");
    }
}
