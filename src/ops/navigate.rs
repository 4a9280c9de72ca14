use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::track_ops::{self, TrackError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
}

/// What an arrow key did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Selection moved to this track
    Moved(TrackId),
    Expanded(TrackId),
    Collapsed(TrackId),
    Unchanged,
}

/// Tracks whose ancestor chain is fully expanded, in document order
pub fn visible_order(tl: &Timeline) -> Vec<TrackId> {
    tl.document_order()
        .into_iter()
        .filter(|&id| track_ops::is_fully_visible(tl, id))
        .collect()
}

/// Apply an arrow key to the tree around `current`.
///
/// Left collapses an expanded parent, otherwise selects the parent. Right
/// expands a collapsed parent, otherwise steps into the first child. Up and
/// Down walk the visible tree and stop at either end.
pub fn navigate(tl: &mut Timeline, current: TrackId, key: NavKey) -> Result<NavOutcome, TrackError> {
    let track = tl.track(current).ok_or(TrackError::NotFound(current))?;
    let can_expand = track.can_expand();
    let expanded = track.is_expanded();
    let parent = track.parent();
    let first_child = track.children().first().copied();

    let outcome = match key {
        NavKey::Left if can_expand && expanded => {
            track_ops::collapse(tl, current)?;
            NavOutcome::Collapsed(current)
        }
        NavKey::Left => match parent {
            Some(p) => NavOutcome::Moved(p),
            None => NavOutcome::Unchanged,
        },
        NavKey::Right if can_expand && !expanded => {
            track_ops::expand(tl, current)?;
            NavOutcome::Expanded(current)
        }
        NavKey::Right => match first_child {
            Some(c) if expanded => NavOutcome::Moved(c),
            _ => NavOutcome::Unchanged,
        },
        NavKey::Up | NavKey::Down => {
            let order = visible_order(tl);
            let step = order.iter().position(|&id| id == current).and_then(|i| {
                if key == NavKey::Up {
                    i.checked_sub(1)
                } else {
                    Some(i + 1).filter(|&n| n < order.len())
                }
            });
            match step {
                Some(i) => NavOutcome::Moved(order[i]),
                None => NavOutcome::Unchanged,
            }
        }
    };

    if let NavOutcome::Moved(target) = outcome {
        tl.select(target, false);
    }
    Ok(outcome)
}
