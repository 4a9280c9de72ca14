use serde::Serialize;

use super::geometry::{DragPosition, HeaderGeometry};
use super::payload;
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::layout;
use crate::ops::track_ops::{self, TrackError};
use crate::util::geometry::Point;

/// Error type for drag gestures
#[derive(Debug, thiserror::Error)]
pub enum DragError {
    /// The caller broke the gesture contract (empty payload, unknown target)
    #[error("invalid drag usage: {0}")]
    InvalidUsage(String),
    #[error(transparent)]
    Track(#[from] TrackError),
}

/// What the pointer would do if released now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragEffect {
    #[default]
    None,
    Move,
}

/// Observable state of the gesture.
///
/// ```text
/// Idle -> CandidateEntered -> (Above | Below | At) -> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Idle,
    CandidateEntered,
    Above,
    Below,
    At,
}

/// Decides whether `candidate` may be dropped on `target` at all
pub type DragPredicate = Box<dyn Fn(&Timeline, TrackId, TrackId) -> bool>;

/// The candidate exists, is not the target and is not one of its ancestors
pub fn default_predicate(tl: &Timeline, target: TrackId, candidate: TrackId) -> bool {
    tl.contains(candidate)
        && candidate != target
        && !track_ops::contains_track(tl, candidate, target)
}

/// Result of releasing the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DropOutcome {
    pub effect: DragEffect,
    pub position: DragPosition,
    /// Candidates whose parent or index actually changed
    pub moved: usize,
}

impl DropOutcome {
    fn rejected() -> Self {
        DropOutcome {
            effect: DragEffect::None,
            position: DragPosition::None,
            moved: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct Gesture {
    target: TrackId,
    payload: String,
    candidates: Vec<TrackId>,
    position: Option<DragPosition>,
    effect: DragEffect,
}

/// Turns a track drag over one header into a drop intent.
///
/// The controller is scoped to a single top-level drag. Every `leave`,
/// `drop` or retarget clears the transient state, so the next `enter`
/// starts clean.
pub struct DragController {
    predicate: DragPredicate,
    gesture: Option<Gesture>,
}

impl std::fmt::Debug for DragController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragController")
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

impl Default for DragController {
    fn default() -> Self {
        DragController::new(default_predicate)
    }
}

impl DragController {
    pub fn new(predicate: impl Fn(&Timeline, TrackId, TrackId) -> bool + 'static) -> Self {
        DragController {
            predicate: Box::new(predicate),
            gesture: None,
        }
    }

    pub fn phase(&self) -> DragPhase {
        match &self.gesture {
            None => DragPhase::Idle,
            Some(g) => match g.position {
                None | Some(DragPosition::None) => DragPhase::CandidateEntered,
                Some(DragPosition::Above) => DragPhase::Above,
                Some(DragPosition::Below) => DragPhase::Below,
                Some(DragPosition::At) => DragPhase::At,
            },
        }
    }

    pub fn target(&self) -> Option<TrackId> {
        self.gesture.as_ref().map(|g| g.target)
    }

    /// Live drop position, `None` while idle or when the effect is None
    pub fn position(&self) -> DragPosition {
        match &self.gesture {
            Some(g) if g.effect == DragEffect::Move => g.position.unwrap_or_default(),
            _ => DragPosition::None,
        }
    }

    pub fn effect(&self) -> DragEffect {
        self.gesture.as_ref().map(|g| g.effect).unwrap_or_default()
    }

    pub fn candidates(&self) -> &[TrackId] {
        self.gesture
            .as_ref()
            .map(|g| g.candidates.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_live(&self) -> bool {
        !self.candidates().is_empty()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Start a gesture over `target`'s header. The effect is Move when at
    /// least one payload entry survives the predicate.
    pub fn enter(
        &mut self,
        tl: &Timeline,
        target: TrackId,
        payload: &str,
    ) -> Result<DragEffect, DragError> {
        self.gesture = None;
        if payload.is_empty() {
            return Err(DragError::InvalidUsage("empty drag payload".into()));
        }
        if !tl.contains(target) {
            return Err(DragError::InvalidUsage(format!(
                "drag target {} is not in the timeline",
                target
            )));
        }
        let candidates = live_candidates(tl, target, payload, &self.predicate);
        let effect = if candidates.is_empty() {
            DragEffect::None
        } else {
            DragEffect::Move
        };
        tracing::debug!(%target, candidates = candidates.len(), ?effect, "drag entered");
        self.gesture = Some(Gesture {
            target,
            payload: payload.to_string(),
            candidates,
            position: None,
            effect,
        });
        Ok(effect)
    }

    /// Pointer moved over the entered header. `local` is header-local.
    ///
    /// Recomputes the tie-break and validates the candidates against the
    /// resulting destination. Hovering the expand arrow of a track with
    /// children expands it. Leaving the header ends the gesture.
    pub fn over(&mut self, tl: &mut Timeline, local: Point, width: f32) -> DragEffect {
        let Some(target) = self.target() else {
            return DragEffect::None;
        };
        let Some(track) = tl.track(target) else {
            self.leave();
            return DragEffect::None;
        };
        let collapsed = track.is_collapsed();
        let has_children = track.has_children();
        let geometry = HeaderGeometry::new(tl.layout_config(), width);
        if !geometry.hits_header(local) {
            self.leave();
            return DragEffect::None;
        }

        let position = geometry.tie_break(local, collapsed);
        if has_children
            && collapsed
            && layout::arrow_rect(tl, target).is_some_and(|r| r.contains(local))
        {
            if let Err(e) = track_ops::expand(tl, target) {
                tracing::warn!(error = %e, %target, "expand under drag failed");
            }
        }

        let Some(gesture) = self.gesture.as_mut() else {
            return DragEffect::None;
        };
        let valid = !gesture.candidates.is_empty()
            && validate_drop(tl, target, position, &gesture.candidates);
        gesture.effect = if valid {
            DragEffect::Move
        } else {
            DragEffect::None
        };
        gesture.position = Some(if valid { position } else { DragPosition::None });
        gesture.effect
    }

    /// Convenience for hosts that only know the pointer in timeline space:
    /// finds the header under it, retargets (leave + enter) when that header
    /// changes and then updates the position.
    pub fn hover(
        &mut self,
        tl: &mut Timeline,
        point: Point,
        width: f32,
        payload: &str,
    ) -> Result<DragEffect, DragError> {
        let Some((id, local)) = layout::track_at(tl, point, width) else {
            self.leave();
            return Ok(DragEffect::None);
        };
        if self.target() != Some(id) {
            self.leave();
            self.enter(tl, id, payload)?;
        }
        Ok(self.over(tl, local, width))
    }

    /// Release over the entered header. Clears the gesture whatever
    /// happens.
    pub fn drop(
        &mut self,
        tl: &mut Timeline,
        local: Point,
        width: f32,
    ) -> Result<DropOutcome, DragError> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(DropOutcome::rejected());
        };
        let target = gesture.target;
        let Some(track) = tl.track(target) else {
            return Ok(DropOutcome::rejected());
        };
        let geometry = HeaderGeometry::new(tl.layout_config(), width);
        if !geometry.hits_header(local) {
            return Ok(DropOutcome::rejected());
        }
        let position = geometry.tie_break(local, track.is_collapsed());

        // Names are resolved again: the timeline may have changed mid-drag
        let candidates = live_candidates(tl, target, &gesture.payload, &self.predicate);
        if candidates.is_empty() || !validate_drop(tl, target, position, &candidates) {
            tracing::debug!(%target, ?position, "drop rejected");
            return Ok(DropOutcome::rejected());
        }

        let moved = apply_drop(tl, target, position, &candidates)?;
        tracing::info!(%target, ?position, moved, "tracks dropped");
        Ok(DropOutcome {
            effect: DragEffect::Move,
            position,
            moved,
        })
    }

    /// Pointer left the header or the host lost the drag
    pub fn leave(&mut self) {
        if let Some(g) = self.gesture.take() {
            tracing::trace!(target = %g.target, "drag left");
        }
    }

    /// Abort when the hovered track is torn down mid-gesture
    pub fn on_track_deleted(&mut self, id: TrackId) {
        if self.target() == Some(id) {
            self.leave();
        }
    }
}

// ---------------------------------------------------------------------------
// Drop rules, shared with the CLI `mv` command
// ---------------------------------------------------------------------------

/// Payload entries that resolve in the live timeline and pass `predicate`
pub fn live_candidates(
    tl: &Timeline,
    target: TrackId,
    payload: &str,
    predicate: &dyn Fn(&Timeline, TrackId, TrackId) -> bool,
) -> Vec<TrackId> {
    payload::resolve(tl, payload)
        .into_iter()
        .filter(|&c| predicate(tl, target, c))
        .collect()
}

/// Parent and index a drop at `position` on `target` moves tracks to,
/// computed before anything moves
pub fn drop_destination(
    tl: &Timeline,
    target: TrackId,
    position: DragPosition,
) -> Option<(Option<TrackId>, usize)> {
    let track = tl.track(target)?;
    match position {
        DragPosition::None => None,
        DragPosition::Above => Some((track.parent(), tl.track_index(target)?)),
        DragPosition::Below => Some((track.parent(), tl.track_index(target)? + 1)),
        DragPosition::At => Some((Some(target), track.children().len())),
    }
}

/// All-or-nothing: every candidate must be accepted by the effective new
/// parent and must not end up inside itself. Root level accepts anything.
pub fn validate_drop(
    tl: &Timeline,
    target: TrackId,
    position: DragPosition,
    candidates: &[TrackId],
) -> bool {
    let Some((new_parent, _)) = drop_destination(tl, target, position) else {
        return false;
    };
    if candidates.is_empty() {
        return false;
    }
    let parent_kind = match new_parent {
        Some(p) => match tl.archetype_of(p) {
            Some(kind) => Some(kind),
            None => return false,
        },
        None => None,
    };
    candidates.iter().all(|&c| {
        let Some(kind) = tl.archetype_of(c) else {
            return false;
        };
        let accepted = parent_kind.is_none_or(|p| p.can_add_child_track(kind));
        let acyclic = new_parent
            .is_none_or(|p| p != c && !track_ops::contains_track(tl, c, p));
        accepted && acyclic
    })
}

/// Move `candidates` to the drop destination, keeping their relative order,
/// then report the reorder and expand the target if anything moved.
/// Returns how many candidates changed place.
pub fn apply_drop(
    tl: &mut Timeline,
    target: TrackId,
    position: DragPosition,
    candidates: &[TrackId],
) -> Result<usize, TrackError> {
    let Some((new_parent, new_index)) = drop_destination(tl, target, position) else {
        return Ok(0);
    };
    tl.with_layout_suspended(|tl| {
        let mut moved = 0;
        for (k, &c) in candidates.iter().enumerate() {
            let before = (tl.parent_of(c), tl.track_index(c));
            track_ops::set_parent(tl, c, new_parent)?;
            if tl.parent_of(c) != new_parent {
                continue;
            }
            tl.change_track_index(c, new_index + k);
            if (tl.parent_of(c), tl.track_index(c)) != before {
                moved += 1;
            }
        }
        tl.on_tracks_order_changed();
        tl.mark_as_edited();
        if moved > 0 {
            track_ops::expand(tl, target)?;
        }
        Ok(moved)
    })
}
