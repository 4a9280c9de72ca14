use crate::io::timeline_io;
use crate::model::timeline::Timeline;
use crate::ops::track_ops;

const UNDO_STACK_LIMIT: usize = 500;

/// An undoable edit. Tracks are named rather than referenced by id because
/// restoring a snapshot builds a fresh arena with new ids.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Rename {
        old: String,
        new: String,
    },
    Mute {
        track: String,
        muted: bool,
    },
    Loop {
        track: String,
        looped: bool,
    },
    /// Whole-tree snapshots around a structural edit (move, spawn, delete)
    Restore {
        label: &'static str,
        before: Vec<u8>,
        after: Vec<u8>,
        focus_before: Option<String>,
        focus_after: Option<String>,
    },
    /// The file was reloaded from disk; undo stops here
    SyncMarker,
}

impl Operation {
    pub fn label(&self) -> &str {
        match self {
            Operation::Rename { .. } => "rename",
            Operation::Mute { .. } => "mute",
            Operation::Loop { .. } => "loop",
            Operation::Restore { label, .. } => label,
            Operation::SyncMarker => "reload",
        }
    }
}

/// Encoded copy of the tree for a [`Operation::Restore`]
pub fn snapshot(tl: &Timeline) -> Option<Vec<u8>> {
    match timeline_io::encode_timeline(tl) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(error = %e, "could not snapshot timeline for undo");
            None
        }
    }
}

/// Result of an undo or redo, for the UI to refocus
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub label: String,
    /// Track to put the cursor on
    pub focus: Option<String>,
}

pub struct UndoStack {
    undo: Vec<Operation>,
    redo: Vec<Operation>,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        UndoStack {
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// Push a new operation. Clears the redo stack.
    pub fn push(&mut self, op: Operation) {
        self.undo.push(op);
        if self.undo.len() > UNDO_STACK_LIMIT {
            self.undo.drain(..self.undo.len() - UNDO_STACK_LIMIT);
        }
        self.redo.clear();
    }

    pub fn push_sync_marker(&mut self) {
        self.push(Operation::SyncMarker);
    }

    /// Apply the inverse of the last operation. Does not save.
    pub fn undo(&mut self, tl: &mut Timeline) -> Option<Applied> {
        let op = self.undo.pop()?;
        if matches!(op, Operation::SyncMarker) {
            self.undo.push(op);
            return None;
        }
        let applied = apply(&op, tl, true);
        self.redo.push(op);
        Some(applied)
    }

    pub fn redo(&mut self, tl: &mut Timeline) -> Option<Applied> {
        let op = self.redo.pop()?;
        let applied = apply(&op, tl, false);
        self.undo.push(op);
        Some(applied)
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

fn apply(op: &Operation, tl: &mut Timeline, undo: bool) -> Applied {
    let focus = match op {
        Operation::Rename { old, new } => {
            let (from, to) = if undo { (new, old) } else { (old, new) };
            let id = tl.find_by_name(from);
            if let Some(id) = id {
                if let Err(e) = track_ops::rename(tl, id, to) {
                    tracing::warn!(error = %e, track = %from, "undo rename failed");
                }
            }
            id.and_then(|id| tl.track(id)).map(|t| t.name.clone())
        }
        Operation::Mute { track, muted } => {
            if let Some(id) = tl.find_by_name(track) {
                if let Err(e) = track_ops::set_muted(tl, id, *muted != undo) {
                    tracing::warn!(error = %e, %track, "undo mute failed");
                }
            }
            Some(track.clone())
        }
        Operation::Loop { track, looped } => {
            if let Some(id) = tl.find_by_name(track) {
                if let Err(e) = track_ops::set_looped(tl, id, *looped != undo) {
                    tracing::warn!(error = %e, %track, "undo loop failed");
                }
            }
            Some(track.clone())
        }
        Operation::Restore {
            before,
            after,
            focus_before,
            focus_after,
            ..
        } => {
            let (bytes, focus) = if undo {
                (before, focus_before)
            } else {
                (after, focus_after)
            };
            match timeline_io::decode_timeline(bytes, *tl.layout_config()) {
                Ok(restored) => {
                    *tl = restored;
                    tl.mark_as_edited();
                }
                Err(e) => tracing::error!(error = %e, "undo snapshot did not decode"),
            }
            focus.clone()
        }
        Operation::SyncMarker => None,
    };
    Applied {
        label: op.label().to_string(),
        focus,
    }
}
