use crate::model::timeline::Timeline;
use crate::model::track::TrackId;

/// Marks a drag payload as a track reorder
pub const TRACK_PAYLOAD_PREFIX: &str = "TRACK!?";
const SEPARATOR: char = ';';

/// Build a payload from track names. Names never contain the separator
/// because they are sanitized on spawn and rename.
pub fn encode<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = names.into_iter().collect();
    format!("{}{}", TRACK_PAYLOAD_PREFIX, joined.join(";"))
}

/// Payload naming the given tracks; unknown ids are left out
pub fn encode_tracks(tl: &Timeline, ids: &[TrackId]) -> String {
    encode(
        ids.iter()
            .filter_map(|&id| tl.track(id))
            .map(|t| t.name.as_str()),
    )
}

/// Split a payload into names. `None` when the payload belongs to some
/// other kind of drag.
pub fn decode(payload: &str) -> Option<Vec<&str>> {
    let body = payload.strip_prefix(TRACK_PAYLOAD_PREFIX)?;
    Some(body.split(SEPARATOR).filter(|n| !n.is_empty()).collect())
}

/// Resolve payload names against the live timeline, in payload order.
/// Names that no longer resolve are skipped, repeats are dropped.
pub fn resolve(tl: &Timeline, payload: &str) -> Vec<TrackId> {
    let Some(names) = decode(payload) else {
        return Vec::new();
    };
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        if let Some(id) = tl.find_by_name(name)
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }
    ids
}

/// Payload for a drag starting on `pressed`: the draggable part of the
/// selection when the pressed track is selected, else the pressed track.
/// `None` when nothing draggable is left.
pub fn payload_for_press(tl: &Timeline, pressed: TrackId) -> Option<String> {
    let draggable = |id: &TrackId| tl.track(*id).is_some_and(|t| t.archetype.can_drag());
    let ids: Vec<TrackId> = if tl.is_selected(pressed) {
        tl.selected_tracks().iter().copied().filter(draggable).collect()
    } else {
        Some(pressed).into_iter().filter(draggable).collect()
    };
    if ids.is_empty() {
        return None;
    }
    Some(encode_tracks(tl, &ids))
}
