use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the TUI event loop
#[derive(Debug, PartialEq)]
pub enum FileEvent {
    /// The timeline file was written by someone else
    Changed(PathBuf),
    Removed(PathBuf),
}

/// Watches a single timeline file. Editors and our own atomic save replace
/// the file through a rename, so the parent directory is watched and events
/// are filtered down to the file name.
pub struct TimelineWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl TimelineWatcher {
    pub fn start(timeline_path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target = timeline_path.to_path_buf();
        let dir = match timeline_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else { return };
                if let Some(file_event) = classify(&event, &target) {
                    let _ = tx.send(file_event);
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %timeline_path.display(), "watching timeline file");
        Ok(TimelineWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending events without blocking
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

fn classify(event: &Event, target: &Path) -> Option<FileEvent> {
    let name = target.file_name()?;
    let hit = event.paths.iter().any(|p| p.file_name() == Some(name));
    if !hit {
        return None;
    }
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => Some(FileEvent::Changed(target.to_path_buf())),
        EventKind::Remove(_) => Some(FileEvent::Removed(target.to_path_buf())),
        _ => None,
    }
}
