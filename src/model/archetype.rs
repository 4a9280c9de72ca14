use serde::{Deserialize, Serialize};

/// The kind of a track. Selects child-acceptance policy and the per-kind
/// hooks run when a track is spawned or loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackArchetype {
    Folder,
    Actor,
    Script,
    Property,
    Event,
    Audio,
    ScreenFade,
    CameraCut,
}

impl TrackArchetype {
    pub const ALL: [TrackArchetype; 8] = [
        TrackArchetype::Folder,
        TrackArchetype::Actor,
        TrackArchetype::Script,
        TrackArchetype::Property,
        TrackArchetype::Event,
        TrackArchetype::Audio,
        TrackArchetype::ScreenFade,
        TrackArchetype::CameraCut,
    ];

    /// Display name, also used as the base name for freshly spawned tracks
    pub fn default_name(self) -> &'static str {
        match self {
            TrackArchetype::Folder => "Folder",
            TrackArchetype::Actor => "Actor",
            TrackArchetype::Script => "Script",
            TrackArchetype::Property => "Property",
            TrackArchetype::Event => "Event",
            TrackArchetype::Audio => "Audio",
            TrackArchetype::ScreenFade => "Screen Fade",
            TrackArchetype::CameraCut => "Camera Cut",
        }
    }

    /// Whether a track of this kind accepts a child of kind `child`
    pub fn can_add_child_track(self, child: TrackArchetype) -> bool {
        match self {
            TrackArchetype::Folder => true,
            TrackArchetype::Actor => matches!(
                child,
                TrackArchetype::Script | TrackArchetype::Property | TrackArchetype::Event
            ),
            TrackArchetype::Script => {
                matches!(child, TrackArchetype::Property | TrackArchetype::Event)
            }
            _ => false,
        }
    }

    /// Script and member tracks are named after what they bind
    pub fn can_rename(self) -> bool {
        !matches!(
            self,
            TrackArchetype::Script | TrackArchetype::Property | TrackArchetype::Event
        )
    }

    pub fn can_drag(self) -> bool {
        !matches!(self, TrackArchetype::Property | TrackArchetype::Event)
    }

    pub fn holds_media(self) -> bool {
        matches!(
            self,
            TrackArchetype::Property
                | TrackArchetype::Event
                | TrackArchetype::Audio
                | TrackArchetype::ScreenFade
                | TrackArchetype::CameraCut
        )
    }

    /// Keyframes of these tracks are the start frames of their media
    pub fn has_keyframes(self) -> bool {
        matches!(self, TrackArchetype::Property | TrackArchetype::Event)
    }

    /// Whether a freshly spawned track starts out expanded
    pub fn spawns_expanded(self) -> bool {
        matches!(self, TrackArchetype::Folder | TrackArchetype::Actor)
    }

    /// Stable tag used by the binary timeline format
    pub fn tag(self) -> u8 {
        match self {
            TrackArchetype::Folder => 0,
            TrackArchetype::Actor => 1,
            TrackArchetype::Script => 2,
            TrackArchetype::Property => 3,
            TrackArchetype::Event => 4,
            TrackArchetype::Audio => 5,
            TrackArchetype::ScreenFade => 6,
            TrackArchetype::CameraCut => 7,
        }
    }

    pub fn from_tag(tag: u8) -> Option<TrackArchetype> {
        TrackArchetype::ALL.into_iter().find(|a| a.tag() == tag)
    }

    /// Parse a kebab-case or display name ("screen-fade", "Screen Fade")
    pub fn parse(s: &str) -> Option<TrackArchetype> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        TrackArchetype::ALL.into_iter().find(|a| {
            let name: String = a
                .default_name()
                .chars()
                .filter(|c| *c != ' ')
                .flat_map(char::to_lowercase)
                .collect();
            name == wanted
        })
    }
}

impl std::fmt::Display for TrackArchetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.default_name())
    }
}
