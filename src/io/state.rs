use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Persisted TUI state, kept next to the timeline as `.<file>.state.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UiState {
    /// Name of the track under the cursor
    #[serde(default)]
    pub focused_track: Option<String>,
    #[serde(default)]
    pub scroll_offset: usize,
    /// Last search pattern
    #[serde(default)]
    pub last_search: Option<String>,
    /// Search history (most recent first, max 50)
    #[serde(default)]
    pub search_history: Vec<String>,
}

pub const MAX_SEARCH_HISTORY: usize = 50;

impl UiState {
    /// Record a search pattern at the front of the history
    pub fn push_search(&mut self, pattern: &str) {
        self.search_history.retain(|p| p != pattern);
        self.search_history.insert(0, pattern.to_string());
        self.search_history.truncate(MAX_SEARCH_HISTORY);
        self.last_search = Some(pattern.to_string());
    }
}

/// `dir/.scene.tln.state.json` for `dir/scene.tln`
pub fn state_path(timeline_path: &Path) -> PathBuf {
    let name = timeline_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "timeline".to_string());
    timeline_path.with_file_name(format!(".{}.state.json", name))
}

/// Read the state file, `None` when missing or malformed
pub fn read_ui_state(timeline_path: &Path) -> Option<UiState> {
    let content = fs::read_to_string(state_path(timeline_path)).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn write_ui_state(timeline_path: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(state_path(timeline_path), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let timeline = dir.path().join("scene.tln");
        let mut state = UiState {
            focused_track: Some("Hero".into()),
            scroll_offset: 4,
            ..Default::default()
        };
        state.push_search("cam");

        write_ui_state(&timeline, &state).unwrap();
        assert!(dir.path().join(".scene.tln.state.json").exists());
        assert_eq!(read_ui_state(&timeline), Some(state));
    }

    #[test]
    fn read_missing_or_malformed_returns_none() {
        let dir = TempDir::new().unwrap();
        let timeline = dir.path().join("scene.tln");
        assert!(read_ui_state(&timeline).is_none());
        fs::write(state_path(&timeline), "not json {{{").unwrap();
        assert!(read_ui_state(&timeline).is_none());
    }

    #[test]
    fn serde_defaults_on_empty_object() {
        let state: UiState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, UiState::default());
    }

    #[test]
    fn search_history_is_deduplicated_and_capped() {
        let mut state = UiState::default();
        for i in 0..60 {
            state.push_search(&format!("p{i}"));
        }
        state.push_search("p55");
        assert_eq!(state.search_history.len(), MAX_SEARCH_HISTORY);
        assert_eq!(state.search_history[0], "p55");
        assert_eq!(state.search_history[1], "p59");
        assert_eq!(state.last_search.as_deref(), Some("p55"));
    }
}
