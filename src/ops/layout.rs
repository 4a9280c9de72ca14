use crate::model::timeline::Timeline;
use crate::model::track::{TrackId, TrackLayout};
use crate::util::geometry::{Point, Rect};

/// Place every track: pre-order over the roots, children indented one level
/// and shown only while their parent is shown and expanded. Visible headers
/// take consecutive slots of one row pitch each.
pub fn compute(tl: &Timeline) -> Vec<(TrackId, TrackLayout)> {
    let metrics = tl.layout_config();
    let mut out = Vec::with_capacity(tl.track_count());
    let mut y = 0.0f32;
    let mut stack: Vec<(TrackId, f32, bool)> = tl
        .roots()
        .iter()
        .rev()
        .map(|&id| (id, 0.0, true))
        .collect();

    while let Some((id, x_offset, visible)) = stack.pop() {
        let Some(track) = tl.track(id) else {
            continue;
        };
        let slot_y = if visible {
            let top = y;
            y += metrics.row_pitch();
            top
        } else {
            0.0
        };
        out.push((
            id,
            TrackLayout {
                x_offset,
                y: slot_y,
                visible,
            },
        ));
        let children_visible = visible && track.is_expanded();
        for &child in track.children().iter().rev() {
            stack.push((child, x_offset + metrics.indent, children_visible));
        }
    }
    out
}

/// Visible tracks, top to bottom
pub fn visible_tracks(tl: &Timeline) -> Vec<TrackId> {
    tl.document_order()
        .into_iter()
        .filter(|&id| tl.track(id).is_some_and(|t| t.layout().visible))
        .collect()
}

/// Header rectangle of a visible track in timeline space
pub fn header_rect(tl: &Timeline, id: TrackId, width: f32) -> Option<Rect> {
    let track = tl.track(id)?;
    let layout = track.layout();
    if !layout.visible {
        return None;
    }
    Some(Rect::new(
        0.0,
        layout.y,
        width,
        tl.layout_config().header_height,
    ))
}

/// Expand-arrow rectangle in header-local space
pub fn arrow_rect(tl: &Timeline, id: TrackId) -> Option<Rect> {
    let track = tl.track(id)?;
    let metrics = tl.layout_config();
    let size = metrics.arrow_size;
    Some(Rect::new(
        track.layout().x_offset + metrics.arrow_padding,
        ((metrics.header_height - size) / 2.0).max(0.0),
        size,
        size.min(metrics.header_height),
    ))
}

/// The visible track whose header contains `point`, with the point
/// translated into that header's local space.
///
/// The half-open band `[y, y + pitch)` is used for lookup so that a point on
/// the boundary between two headers resolves to the lower one.
pub fn track_at(tl: &Timeline, point: Point, width: f32) -> Option<(TrackId, Point)> {
    if point.x < 0.0 || point.x > width || point.y < 0.0 {
        return None;
    }
    let metrics = tl.layout_config();
    let pitch = metrics.row_pitch();
    visible_tracks(tl).into_iter().find_map(|id| {
        let y = tl.track(id)?.layout().y;
        let inside = point.y >= y && point.y < y + pitch.max(metrics.header_height);
        inside.then(|| (id, Point::new(point.x, point.y - y)))
    })
}
