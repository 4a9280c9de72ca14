use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::drag::DragController;
use crate::io::lock::FileLock;
use crate::io::state::{self, UiState};
use crate::io::timeline_io;
use crate::io::watcher::{FileEvent, TimelineWatcher};
use crate::model::config::{EditorConfig, LayoutConfig};
use crate::model::event::TimelineEvent;
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::layout;
use crate::ops::menu::TrackCommand;
use crate::model::archetype::TrackArchetype;
use crate::util::geometry::Point;
use crate::util::text::LineEdit;

use super::input;
use super::render;
use super::theme::Theme;
use super::undo::{self, Operation, UndoStack};

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Rename,
    Search,
    Menu,
}

/// What a popup menu entry does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Track(TrackCommand),
    AddRoot(TrackArchetype),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupEntry {
    Item { label: String, action: MenuAction },
    Separator,
}

/// An open popup menu
#[derive(Debug, Clone)]
pub struct MenuState {
    /// Track the commands apply to (`None` for root-level adds)
    pub track: Option<TrackId>,
    pub entries: Vec<PopupEntry>,
    /// Index into `entries`, never on a separator
    pub cursor: usize,
    /// Screen cell the popup opens at
    pub anchor: (u16, u16),
    /// Where the popup was last drawn, for mouse hits
    pub area: Option<ratatui::layout::Rect>,
}

impl MenuState {
    pub fn new(track: Option<TrackId>, entries: Vec<PopupEntry>, anchor: (u16, u16)) -> Self {
        let cursor = entries
            .iter()
            .position(|e| matches!(e, PopupEntry::Item { .. }))
            .unwrap_or(0);
        MenuState {
            track,
            entries,
            cursor,
            anchor,
            area: None,
        }
    }

    /// Move to the next item in `direction`, skipping separators
    pub fn step(&mut self, down: bool) {
        let len = self.entries.len();
        let mut i = self.cursor;
        for _ in 0..len {
            i = if down { (i + 1) % len } else { (i + len - 1) % len };
            if matches!(self.entries[i], PopupEntry::Item { .. }) {
                self.cursor = i;
                return;
            }
        }
    }

    pub fn selected(&self) -> Option<MenuAction> {
        match self.entries.get(self.cursor) {
            Some(PopupEntry::Item { action, .. }) => Some(*action),
            _ => None,
        }
    }
}

/// Left button held over a track
#[derive(Debug, Clone)]
pub struct Press {
    pub track: TrackId,
    /// Timeline-space point of the press
    pub origin: Point,
    pub was_selected: bool,
    pub additive: bool,
    /// Set once the pointer travelled far enough to start a drag
    pub payload: Option<String>,
    /// Tree snapshot taken when the drag started, for undo
    pub before: Option<Vec<u8>>,
}

/// Main application state
pub struct App {
    pub timeline: Timeline,
    pub path: PathBuf,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub show_help: bool,
    pub help_scroll: usize,
    pub show_key_hints: bool,
    pub mouse: bool,
    /// Track under the keyboard cursor
    pub cursor: Option<TrackId>,
    /// First timeline row shown in the outline
    pub scroll: usize,
    /// Outline area from the last render, for mouse mapping
    pub outline_area: ratatui::layout::Rect,
    /// Track under the mouse pointer
    pub hovered: Option<TrackId>,
    pub rename: Option<(TrackId, LineEdit)>,
    pub search: LineEdit,
    /// Position while browsing search history with Up/Down
    pub history_cursor: Option<usize>,
    pub last_search: Option<String>,
    pub menu: Option<MenuState>,
    pub drag: DragController,
    pub press: Option<Press>,
    pub undo: UndoStack,
    /// One-shot status message
    pub message: Option<String>,
    /// Set by the first `q` with unsaved edits
    pub confirm_quit: bool,
    pub ui_state: UiState,
    /// Bytes of our last save, to tell our own writes from external ones
    saved_bytes: Option<Vec<u8>>,
}

impl App {
    pub fn new(timeline: Timeline, path: PathBuf, config: &EditorConfig) -> Self {
        let cursor = timeline.roots().first().copied();
        App {
            timeline,
            path,
            mode: Mode::Navigate,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            show_help: false,
            help_scroll: 0,
            show_key_hints: config.ui.show_key_hints,
            mouse: config.ui.mouse,
            cursor,
            scroll: 0,
            outline_area: ratatui::layout::Rect::default(),
            hovered: None,
            rename: None,
            search: LineEdit::default(),
            history_cursor: None,
            last_search: None,
            menu: None,
            drag: DragController::default(),
            press: None,
            undo: UndoStack::new(),
            message: None,
            confirm_quit: false,
            ui_state: UiState::default(),
            saved_bytes: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn flash(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    // -----------------------------------------------------------------------
    // Cursor and scrolling
    // -----------------------------------------------------------------------

    /// Move the cursor to `id` and scroll it into view
    pub fn focus(&mut self, id: TrackId) {
        if !self.timeline.contains(id) {
            return;
        }
        self.cursor = Some(id);
        self.ensure_cursor_visible();
    }

    pub fn focus_name(&mut self, name: &str) {
        if let Some(id) = self.timeline.find_by_name(name) {
            self.timeline.select(id, false);
            self.focus(id);
        }
    }

    pub fn cursor_name(&self) -> Option<String> {
        self.cursor
            .and_then(|id| self.timeline.track(id))
            .map(|t| t.name.clone())
    }

    /// Keep the cursor on a visible track after deletes, collapses and
    /// reloads: the nearest visible ancestor, else the first row
    pub fn fix_cursor(&mut self) {
        let mut cur = self.cursor.filter(|&id| self.timeline.contains(id));
        while let Some(id) = cur {
            if self.timeline.track(id).is_some_and(|t| t.layout().visible) {
                break;
            }
            cur = self.timeline.parent_of(id);
        }
        self.cursor = cur.or_else(|| layout::visible_tracks(&self.timeline).first().copied());
        self.ensure_cursor_visible();
    }

    pub fn ensure_cursor_visible(&mut self) {
        let height = self.outline_area.height as usize;
        let Some(track) = self.cursor.and_then(|id| self.timeline.track(id)) else {
            return;
        };
        if height == 0 || !track.layout().visible {
            return;
        }
        let top = track.layout().y.max(0.0) as usize;
        let rows = self.timeline.layout_config().header_height.ceil() as usize;
        if top < self.scroll {
            self.scroll = top;
        } else if top + rows > self.scroll + height {
            self.scroll = top + rows - height;
        }
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let content = self.timeline.content_height().ceil() as usize;
        let max = content.saturating_sub(self.outline_area.height as usize);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    /// Map a screen cell to a timeline-space point, sampled at the cell
    /// center. `None` outside the outline.
    pub fn point_at(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.outline_area;
        if column < area.x || column >= area.right() || row < area.y || row >= area.bottom() {
            return None;
        }
        Some(Point::new(
            (column - area.x) as f32 + 0.5,
            (row - area.y) as f32 + self.scroll as f32 + 0.5,
        ))
    }

    pub fn outline_width(&self) -> f32 {
        self.outline_area.width as f32
    }

    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    /// Run a structural edit and record before/after snapshots for undo.
    /// Nothing is recorded when `f` reports no change.
    pub fn structural(&mut self, label: &'static str, f: impl FnOnce(&mut App) -> bool) {
        let before = undo::snapshot(&self.timeline);
        let focus_before = self.cursor_name();
        if !f(self) {
            return;
        }
        self.fix_cursor();
        if let (Some(before), Some(after)) = (before, undo::snapshot(&self.timeline)) {
            self.undo.push(Operation::Restore {
                label,
                before,
                after,
                focus_before,
                focus_after: self.cursor_name(),
            });
        }
    }

    pub fn undo(&mut self) {
        let previous = self.cursor_name();
        match self.undo.undo(&mut self.timeline) {
            Some(applied) => {
                self.after_history(applied.focus.or(previous));
                self.flash(format!("undid {}", applied.label));
            }
            None => self.flash("nothing to undo"),
        }
    }

    pub fn redo(&mut self) {
        let previous = self.cursor_name();
        match self.undo.redo(&mut self.timeline) {
            Some(applied) => {
                self.after_history(applied.focus.or(previous));
                self.flash(format!("redid {}", applied.label));
            }
            None => self.flash("nothing to redo"),
        }
    }

    /// Ids don't survive a snapshot restore, so refocus by name
    fn after_history(&mut self, focus: Option<String>) {
        self.drag.leave();
        self.press = None;
        self.hovered = None;
        self.cursor = None;
        if let Some(name) = focus {
            self.focus_name(&name);
        }
        self.fix_cursor();
    }

    /// Hand queued timeline notifications to the pieces that care
    pub fn process_events(&mut self) {
        for event in self.timeline.drain_events() {
            if let TimelineEvent::TrackDeleted(id) = event {
                self.drag.on_track_deleted(id);
                if self.hovered == Some(id) {
                    self.hovered = None;
                }
                if self.press.as_ref().is_some_and(|p| p.track == id) {
                    self.press = None;
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Case-insensitive regex for a pattern; invalid patterns match literally
    pub fn search_regex(pattern: &str) -> Option<Regex> {
        Regex::new(&format!("(?i){}", pattern))
            .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(pattern))))
            .ok()
    }

    /// Regex for highlighting: the live input while searching, else the last
    /// executed search
    pub fn active_search_re(&self) -> Option<Regex> {
        let pattern = match self.mode {
            Mode::Search if !self.search.text().is_empty() => self.search.text(),
            Mode::Search => return None,
            _ => self.last_search.as_deref()?,
        };
        Self::search_regex(pattern)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn save(&mut self) {
        let result = FileLock::acquire_default(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|_lock| {
                timeline_io::save(&self.path, &mut self.timeline).map_err(|e| e.to_string())
            });
        match result {
            Ok(()) => {
                self.saved_bytes = std::fs::read(&self.path).ok();
                self.flash(format!("saved {}", self.file_name()));
            }
            Err(e) => {
                tracing::error!(error = %e, "save failed");
                self.flash(format!("save failed: {}", e));
            }
        }
    }

    /// React to the timeline file changing on disk. Reloads unless there
    /// are unsaved edits, which would be lost.
    pub fn on_file_event(&mut self, event: FileEvent) {
        match event {
            FileEvent::Removed(_) => self.flash("timeline file was removed on disk"),
            FileEvent::Changed(path) => {
                let Ok(bytes) = std::fs::read(&path) else {
                    return;
                };
                if self.saved_bytes.as_deref() == Some(bytes.as_slice()) {
                    return;
                }
                if self.timeline.is_edited() {
                    self.flash("file changed on disk; save (s) to overwrite or undo your edits");
                    return;
                }
                self.reload(&bytes);
            }
        }
    }

    fn reload(&mut self, bytes: &[u8]) {
        match timeline_io::decode_timeline(bytes, *self.timeline.layout_config()) {
            Ok(tl) => {
                let focus = self.cursor_name();
                self.drag.leave();
                self.press = None;
                self.timeline = tl;
                self.saved_bytes = Some(bytes.to_vec());
                self.undo.push_sync_marker();
                self.cursor = None;
                if let Some(name) = focus {
                    self.focus_name(&name);
                }
                self.fix_cursor();
                self.flash("reloaded from disk");
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable external change");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// UI state
// ---------------------------------------------------------------------------

fn restore_ui_state(app: &mut App) {
    let Some(saved) = state::read_ui_state(&app.path) else {
        return;
    };
    if let Some(name) = &saved.focused_track {
        app.focus_name(name);
    }
    app.scroll = saved.scroll_offset;
    app.last_search = saved.last_search.clone();
    app.ui_state = saved;
}

fn save_ui_state(app: &mut App) {
    app.ui_state.focused_track = app.cursor_name();
    app.ui_state.scroll_offset = app.scroll;
    app.ui_state.last_search = app.last_search.clone();
    if let Err(e) = state::write_ui_state(&app.path, &app.ui_state) {
        tracing::warn!(error = %e, "could not write ui state");
    }
}

// ---------------------------------------------------------------------------
// Terminal loop
// ---------------------------------------------------------------------------

/// Open `path` (or start a new timeline there) in the terminal editor
pub fn run(path: &Path, config: &EditorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let layout_config = LayoutConfig::cells();
    let timeline = if path.exists() {
        timeline_io::load(path, layout_config)?
    } else {
        Timeline::new(config.timeline.fps, layout_config)
    };

    let mut app = App::new(timeline, path.to_path_buf(), config);
    app.saved_bytes = std::fs::read(path).ok();
    restore_ui_state(&mut app);
    if app.cursor.is_none() {
        app.fix_cursor();
    }

    let watcher = match TimelineWatcher::start(path) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "file watcher unavailable");
            None
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if app.mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    save_ui_state(&mut app);

    disable_raw_mode()?;
    if app.mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&TimelineWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }
        app.process_events();

        if let Some(w) = watcher {
            for event in w.poll() {
                app.on_file_event(event);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
