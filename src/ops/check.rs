use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::names;

/// Structured result from `tl check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A broken tree invariant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// Following parent links from this track leads back to it
    #[serde(rename = "cycle")]
    Cycle { track: String },
    /// Parent link points at a missing track, or a parent that doesn't list
    /// this track as a child
    #[serde(rename = "broken_parent_link")]
    BrokenParentLink { track: String, parent: u32 },
    /// A child list entry whose parent link disagrees
    #[serde(rename = "broken_child_link")]
    BrokenChildLink { parent: String, child: u32 },
    /// Parentless track missing from the root list, or a root with a parent
    #[serde(rename = "root_mismatch")]
    RootMismatch { track: String },
    /// Track listed more than once across child lists and roots
    #[serde(rename = "duplicate_membership")]
    DuplicateMembership { track: String },
    #[serde(rename = "duplicate_name")]
    DuplicateName { name: String, count: usize },
    /// Name holding ';', control characters or edge whitespace
    #[serde(rename = "invalid_name")]
    InvalidName { name: String },
    /// Media listed by a track that isn't its recorded owner
    #[serde(rename = "media_owner_mismatch")]
    MediaOwnerMismatch { media: u32, track: String },
}

/// Something allowed but suspicious
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// The parent's archetype would not accept this child from a drop
    #[serde(rename = "child_not_accepted")]
    ChildNotAccepted { parent: String, child: String },
    /// Media with no owner still held by the timeline
    #[serde(rename = "orphan_media")]
    OrphanMedia { media: u32 },
    /// Track has an empty name
    #[serde(rename = "empty_name")]
    EmptyName { track: u32 },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate the whole track tree. Read-only.
///
/// Checks performed:
/// 1. Parent and child links agree, and the parent graph has no cycles
/// 2. Exactly the parentless tracks are in the root list, each listed once
/// 3. Names are unique and free of payload separators
/// 4. Media owners match the tracks listing them
/// 5. Warnings for archetype policy violations, orphan media, empty names
pub fn check_timeline(tl: &Timeline) -> CheckResult {
    let mut result = CheckResult::default();
    let name = |id: TrackId| {
        tl.track(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    check_links(tl, &name, &mut result);
    check_membership(tl, &name, &mut result);
    check_names(tl, &mut result);
    check_media(tl, &name, &mut result);

    result.valid = result.errors.is_empty();
    result
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn check_links(tl: &Timeline, name: &dyn Fn(TrackId) -> String, result: &mut CheckResult) {
    for track in tl.tracks() {
        if let Some(p) = track.parent() {
            match tl.track(p) {
                Some(parent) if parent.children().contains(&track.id) => {
                    if !parent.archetype.can_add_child_track(track.archetype) {
                        result.warnings.push(CheckWarning::ChildNotAccepted {
                            parent: parent.name.clone(),
                            child: track.name.clone(),
                        });
                    }
                }
                _ => result.errors.push(CheckError::BrokenParentLink {
                    track: track.name.clone(),
                    parent: p.0,
                }),
            }
        }
        for &child in track.children() {
            if tl.parent_of(child) != Some(track.id) {
                result.errors.push(CheckError::BrokenChildLink {
                    parent: track.name.clone(),
                    child: child.0,
                });
            }
        }
        if has_parent_cycle(tl, track.id) {
            result.errors.push(CheckError::Cycle {
                track: name(track.id),
            });
        }
    }
}

fn has_parent_cycle(tl: &Timeline, start: TrackId) -> bool {
    let mut seen = HashSet::new();
    let mut cur = Some(start);
    while let Some(id) = cur {
        if !seen.insert(id) {
            return true;
        }
        cur = tl.parent_of(id);
    }
    false
}

fn check_membership(tl: &Timeline, name: &dyn Fn(TrackId) -> String, result: &mut CheckResult) {
    let mut listed: HashMap<TrackId, usize> = HashMap::new();
    for &r in tl.roots() {
        *listed.entry(r).or_default() += 1;
        if tl.parent_of(r).is_some() {
            result.errors.push(CheckError::RootMismatch { track: name(r) });
        }
    }
    for track in tl.tracks() {
        for &c in track.children() {
            *listed.entry(c).or_default() += 1;
        }
        if track.parent().is_none() && !tl.roots().contains(&track.id) {
            result.errors.push(CheckError::RootMismatch {
                track: track.name.clone(),
            });
        }
        if track.name.trim().is_empty() {
            result
                .warnings
                .push(CheckWarning::EmptyName { track: track.id.0 });
        }
    }
    let mut dupes: Vec<TrackId> = listed
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id)
        .collect();
    dupes.sort();
    for id in dupes {
        result
            .errors
            .push(CheckError::DuplicateMembership { track: name(id) });
    }
}

fn check_names(tl: &Timeline, result: &mut CheckResult) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for track in tl.tracks() {
        *counts.entry(track.name.as_str()).or_default() += 1;
        // Empty names get their own warning
        if !track.name.trim().is_empty()
            && names::sanitize(&track.name, track.archetype) != track.name
        {
            result.errors.push(CheckError::InvalidName {
                name: track.name.clone(),
            });
        }
    }
    let mut dupes: Vec<(&str, usize)> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    dupes.sort();
    for (n, count) in dupes {
        result.errors.push(CheckError::DuplicateName {
            name: n.to_string(),
            count,
        });
    }
}

fn check_media(tl: &Timeline, name: &dyn Fn(TrackId) -> String, result: &mut CheckResult) {
    for track in tl.tracks() {
        for &m in track.media() {
            if tl.media(m).and_then(|seg| seg.owner()) != Some(track.id) {
                result.errors.push(CheckError::MediaOwnerMismatch {
                    media: m.0,
                    track: name(track.id),
                });
            }
        }
    }
    for media in tl.all_media() {
        if media.owner().is_none() {
            result
                .warnings
                .push(CheckWarning::OrphanMedia { media: media.id.0 });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::archetype::TrackArchetype;
    use crate::model::config::LayoutConfig;
    use crate::ops::track_ops::{self, LoadedTrack};
    use pretty_assertions::assert_eq;

    fn loaded(name: &str, archetype: TrackArchetype, parent: Option<TrackId>) -> LoadedTrack {
        LoadedTrack {
            archetype,
            name: name.into(),
            title: None,
            muted: false,
            looped: false,
            expanded: true,
            parent,
            media: vec![],
        }
    }

    #[test]
    fn edited_tree_stays_valid() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let a = track_ops::spawn_named(&mut tl, TrackArchetype::Folder, None, "A").unwrap();
        let b = track_ops::spawn_named(&mut tl, TrackArchetype::Audio, Some(a), "B").unwrap();
        track_ops::spawn_named(&mut tl, TrackArchetype::Folder, None, "C").unwrap();
        track_ops::set_parent(&mut tl, b, None).unwrap();
        track_ops::rename(&mut tl, b, "A").unwrap();

        let result = check_timeline(&tl);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn duplicate_names_are_errors() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        track_ops::insert_loaded_track(&mut tl, loaded("X", TrackArchetype::Folder, None)).unwrap();
        track_ops::insert_loaded_track(&mut tl, loaded("X", TrackArchetype::Folder, None)).unwrap();

        let result = check_timeline(&tl);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![CheckError::DuplicateName {
                name: "X".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn separator_in_name_is_an_error() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        track_ops::insert_loaded_track(&mut tl, loaded("A", TrackArchetype::Folder, None)).unwrap();
        track_ops::insert_loaded_track(&mut tl, loaded("A;B", TrackArchetype::Folder, None))
            .unwrap();

        let result = check_timeline(&tl);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![CheckError::InvalidName { name: "A;B".into() }]
        );
    }

    #[test]
    fn policy_violations_are_warnings() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let audio =
            track_ops::insert_loaded_track(&mut tl, loaded("Music", TrackArchetype::Audio, None))
                .unwrap();
        track_ops::insert_loaded_track(&mut tl, loaded("Inner", TrackArchetype::Folder, Some(audio)))
            .unwrap();

        let result = check_timeline(&tl);
        assert!(result.valid);
        assert_eq!(
            result.warnings,
            vec![CheckWarning::ChildNotAccepted {
                parent: "Music".into(),
                child: "Inner".into()
            }]
        );
    }

    #[test]
    fn detached_media_is_reported() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let a = track_ops::spawn_track(&mut tl, TrackArchetype::Audio, None).unwrap();
        let m = tl.track(a).unwrap().media()[0];
        track_ops::remove_media(&mut tl, a, m).unwrap();

        let result = check_timeline(&tl);
        assert_eq!(result.warnings, vec![CheckWarning::OrphanMedia { media: m.0 }]);
    }

    #[test]
    fn check_result_serializes_to_json() {
        let result = CheckResult {
            valid: false,
            errors: vec![CheckError::Cycle { track: "A".into() }],
            warnings: vec![],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""type":"cycle""#));
        assert!(json.contains(r#""valid":false"#));
    }
}
