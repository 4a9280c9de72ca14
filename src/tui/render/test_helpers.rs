use std::path::PathBuf;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::archetype::TrackArchetype;
use crate::model::config::{EditorConfig, LayoutConfig};
use crate::model::timeline::Timeline;
use crate::ops::track_ops::spawn_named;
use crate::tui::app::App;

pub const TERM_W: u16 = 40;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Run the full screen render for `app`
pub fn render_app(app: &mut App, w: u16, h: u16) -> String {
    render_to_string(w, h, |frame, _| crate::tui::render::render(frame, app))
}

/// ```text
/// Folder        (expanded)
///   Camera Cut
/// Audio
/// ```
///
/// The outline area matches a `TERM_W` x `TERM_H` screen: it starts on row 1
/// under the title row.
pub fn app_with_tracks() -> App {
    let mut tl = Timeline::new(30.0, LayoutConfig::cells());
    let folder = spawn_named(&mut tl, TrackArchetype::Folder, None, "Folder").unwrap();
    spawn_named(&mut tl, TrackArchetype::CameraCut, Some(folder), "Camera Cut").unwrap();
    spawn_named(&mut tl, TrackArchetype::Audio, None, "Audio").unwrap();
    tl.clear_edited();
    tl.clear_selection();
    tl.drain_events();

    let mut app = App::new(tl, PathBuf::from("/tmp/trackline-test/scene.tln"), &EditorConfig::default());
    app.outline_area = Rect::new(0, 1, TERM_W, TERM_H - 2);
    app
}
