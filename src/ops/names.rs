use crate::model::archetype::TrackArchetype;
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;

/// Read-only view answering name questions for one timeline.
///
/// A registry built with [`NameRegistry::excluding`] ignores the track being
/// renamed, so keeping a track's current name counts as valid.
pub struct NameRegistry<'a> {
    timeline: &'a Timeline,
    renaming: Option<TrackId>,
}

impl<'a> NameRegistry<'a> {
    pub fn new(timeline: &'a Timeline) -> Self {
        NameRegistry {
            timeline,
            renaming: None,
        }
    }

    pub fn excluding(timeline: &'a Timeline, renaming: TrackId) -> Self {
        NameRegistry {
            timeline,
            renaming: Some(renaming),
        }
    }

    /// True iff no other track already uses exactly `candidate`
    pub fn is_valid_name(&self, candidate: &str) -> bool {
        !self
            .timeline
            .tracks()
            .any(|t| Some(t.id) != self.renaming && t.name == candidate)
    }

    /// `base` if free, else the first free `"{base} {n}"` for n = 0, 1, ...
    pub fn make_unique(&self, base: &str) -> String {
        if self.is_valid_name(base) {
            return base.to_string();
        }
        (0u64..)
            .map(|n| format!("{} {}", base, n))
            .find(|name| self.is_valid_name(name))
            .unwrap_or_else(|| base.to_string())
    }
}

/// Strip characters the drag payload and the outline can't carry.
///
/// Separators (`;`) and control characters are dropped, surrounding
/// whitespace is trimmed, and an empty result falls back to the archetype's
/// default name.
pub fn sanitize(raw: &str, archetype: TrackArchetype) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ';' && !c.is_control())
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        archetype.default_name().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::LayoutConfig;
    use crate::ops::track_ops::{rename, spawn_named};

    fn timeline_with(names: &[&str]) -> (Timeline, Vec<TrackId>) {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let ids = names
            .iter()
            .map(|n| spawn_named(&mut tl, TrackArchetype::Folder, None, n).unwrap())
            .collect();
        (tl, ids)
    }

    #[test]
    fn free_name_is_valid() {
        let (tl, _) = timeline_with(&["A", "B"]);
        let reg = NameRegistry::new(&tl);
        assert!(reg.is_valid_name("C"));
        assert!(!reg.is_valid_name("A"));
        assert!(reg.is_valid_name("a"));
    }

    #[test]
    fn renaming_track_is_excluded() {
        let (tl, ids) = timeline_with(&["A", "B"]);
        assert!(NameRegistry::excluding(&tl, ids[0]).is_valid_name("A"));
        assert!(!NameRegistry::excluding(&tl, ids[0]).is_valid_name("B"));
    }

    #[test]
    fn make_unique_counts_from_zero() {
        let (tl, _) = timeline_with(&["X", "X 0", "X 1"]);
        let reg = NameRegistry::new(&tl);
        assert_eq!(reg.make_unique("X"), "X 2");
        assert_eq!(reg.make_unique("Y"), "Y");
    }

    #[test]
    fn rename_onto_taken_name_is_suffixed_deterministically() {
        let (mut tl, ids) = timeline_with(&["X", "B", "C"]);
        rename(&mut tl, ids[1], "X").unwrap();
        rename(&mut tl, ids[2], "X").unwrap();
        assert_eq!(tl.track(ids[1]).unwrap().name, "X 0");
        assert_eq!(tl.track(ids[2]).unwrap().name, "X 1");
    }

    #[test]
    fn sanitize_drops_separators_and_controls() {
        assert_eq!(sanitize("  a;b\tc ", TrackArchetype::Folder), "abc");
        assert_eq!(sanitize(" ;\n", TrackArchetype::Audio), "Audio");
    }
}
