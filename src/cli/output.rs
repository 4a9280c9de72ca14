use serde::Serialize;

use crate::model::archetype::TrackArchetype;
use crate::model::media::Media;
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::check::{CheckError, CheckResult, CheckWarning};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TimelineJson {
    pub fps: f32,
    pub current_frame: u32,
    pub tracks: Vec<TrackJson>,
}

#[derive(Serialize)]
pub struct TrackJson {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub archetype: TrackArchetype,
    pub muted: bool,
    pub looped: bool,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TrackJson>,
}

#[derive(Serialize)]
pub struct MediaJson {
    pub index: usize,
    pub start: u32,
    pub duration: u32,
    pub end: u32,
}

pub fn timeline_to_json(tl: &Timeline) -> TimelineJson {
    TimelineJson {
        fps: tl.fps(),
        current_frame: tl.current_frame(),
        tracks: tl
            .roots()
            .iter()
            .filter_map(|&r| track_to_json(tl, r))
            .collect(),
    }
}

pub fn track_to_json(tl: &Timeline, id: TrackId) -> Option<TrackJson> {
    let track = tl.track(id)?;
    Some(TrackJson {
        name: track.name.clone(),
        title: track.title.clone(),
        archetype: track.archetype,
        muted: track.muted,
        looped: track.looped,
        expanded: track.is_expanded(),
        media: media_to_json(tl, id),
        children: track
            .children()
            .iter()
            .filter_map(|&c| track_to_json(tl, c))
            .collect(),
    })
}

pub fn media_to_json(tl: &Timeline, id: TrackId) -> Vec<MediaJson> {
    let Some(track) = tl.track(id) else {
        return Vec::new();
    };
    track
        .media()
        .iter()
        .filter_map(|&m| tl.media(m))
        .enumerate()
        .map(|(index, m)| MediaJson {
            index,
            start: m.start_frame,
            duration: m.duration_frames,
            end: m.end_frame(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// `camera-cut` for `Camera Cut`
pub fn kind_label(kind: TrackArchetype) -> String {
    kind.default_name().to_lowercase().replace(' ', "-")
}

/// One outline row: expand marker, title, kind and flags
pub fn format_track_line(tl: &Timeline, id: TrackId) -> String {
    let Some(track) = tl.track(id) else {
        return String::new();
    };
    let marker = match (track.can_expand(), track.is_expanded()) {
        (false, _) => ' ',
        (true, true) => '\u{25be}',
        (true, false) => '\u{25b8}',
    };
    let mut line = format!("{} {}", marker, track.display_title());
    if track.title.is_some() {
        line.push_str(&format!(" ({})", track.name));
    }
    line.push_str(&format!(" [{}]", kind_label(track.archetype)));
    if track.muted {
        line.push_str(" muted");
    }
    if track.looped {
        line.push_str(" loop");
    }
    if !track.media().is_empty() {
        line.push_str(&format!(" media:{}", track.media().len()));
    }
    line
}

/// The whole tree, two spaces per level, collapsed subtrees included
pub fn format_tree(tl: &Timeline) -> Vec<String> {
    tl.document_order()
        .into_iter()
        .map(|id| {
            format!(
                "{}{}",
                "  ".repeat(tl.depth_of(id)),
                format_track_line(tl, id)
            )
        })
        .collect()
}

pub fn format_media_line(index: usize, media: &Media, fps: f32) -> String {
    let seconds = if fps > 0.0 {
        media.duration_frames as f32 / fps
    } else {
        0.0
    };
    format!(
        "{}  {}..{}  ({}f, {:.2}s)",
        index,
        media.start_frame,
        media.end_frame(),
        media.duration_frames,
        seconds
    )
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            lines.push(format!("  {}", describe_error(err)));
        }
    }
    if !result.warnings.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warn in &result.warnings {
            lines.push(format!("  {}", describe_warning(warn)));
        }
    }
    if lines.is_empty() {
        lines.push("ok".to_string());
    }
    lines
}

fn describe_error(err: &CheckError) -> String {
    match err {
        CheckError::Cycle { track } => format!("{} is its own ancestor", track),
        CheckError::BrokenParentLink { track, parent } => {
            format!("{} points at parent #{} which does not list it", track, parent)
        }
        CheckError::BrokenChildLink { parent, child } => {
            format!("{} lists child #{} whose parent differs", parent, child)
        }
        CheckError::RootMismatch { track } => format!("{} has a wrong root membership", track),
        CheckError::DuplicateMembership { track } => format!("{} is listed more than once", track),
        CheckError::DuplicateName { name, count } => {
            format!("name \"{}\" is used by {} tracks", name, count)
        }
        CheckError::InvalidName { name } => {
            format!("name {:?} contains ';' or control characters", name)
        }
        CheckError::MediaOwnerMismatch { media, track } => {
            format!("media #{} listed by {} has another owner", media, track)
        }
    }
}

fn describe_warning(warn: &CheckWarning) -> String {
    match warn {
        CheckWarning::ChildNotAccepted { parent, child } => {
            format!("{} would not accept {} as a child", parent, child)
        }
        CheckWarning::OrphanMedia { media } => format!("media #{} has no owner", media),
        CheckWarning::EmptyName { track } => format!("track #{} has an empty name", track),
    }
}
