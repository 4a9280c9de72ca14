use super::track::TrackId;

/// Notifications queued by the timeline and its tracks, drained by the host
/// after each input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    /// Media attached to or detached from a track
    MediaChanged(TrackId),
    /// A track gained or lost a child
    SubTracksChanged(TrackId),
    ExpandedChanged { track: TrackId, expanded: bool },
    /// A layout pass ran
    Arranged,
    /// Tracks were reordered or reparented by a drop
    OrderChanged,
    /// The timeline content changed and needs saving
    Edited,
    SelectionChanged,
    Renamed {
        track: TrackId,
        old: String,
        new: String,
    },
    TrackDeleted(TrackId),
}
