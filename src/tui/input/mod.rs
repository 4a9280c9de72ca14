mod menu;
mod mouse;
mod navigate;
mod rename;
mod search;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

use menu::handle_menu;
use navigate::handle_navigate;
use rename::handle_rename;
use search::handle_search;

pub use menu::open_context_menu;
pub use mouse::handle_mouse;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.message = None;

    let key = normalize_key(key);
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Rename => handle_rename(app, key),
        Mode::Search => handle_search(app, key),
        Mode::Menu => handle_menu(app, key),
    }
    if key.code != KeyCode::Char('q') {
        app.confirm_quit = false;
    }
}

/// Terminals disagree on whether Shift+a arrives as `A` or `a` with SHIFT;
/// fold both into `A`
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}
