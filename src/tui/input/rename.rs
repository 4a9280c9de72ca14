use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::track_ops;
use crate::tui::app::{App, Mode};
use crate::tui::undo::Operation;

pub(super) fn handle_rename(app: &mut App, key: KeyEvent) {
    let Some((id, edit)) = app.rename.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };
    let id = *id;
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => cancel(app),
        (_, KeyCode::Enter) => commit(app),
        (_, KeyCode::Backspace) => edit.backspace(),
        (_, KeyCode::Delete) => edit.delete(),
        (_, KeyCode::Left) => edit.left(),
        (_, KeyCode::Right) => edit.right(),
        (_, KeyCode::Home) => edit.home(),
        (_, KeyCode::End) => edit.end(),
        (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => edit.home(),
        (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => edit.end(),
        (m, KeyCode::Char('w')) if m.contains(KeyModifiers::CONTROL) => edit.delete_word_back(),
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => edit.insert(c),
        _ => {}
    }
    // The track can vanish under us (external reload)
    if app.mode == Mode::Rename && !app.timeline.contains(id) {
        cancel(app);
    }
}

fn cancel(app: &mut App) {
    app.rename = None;
    app.mode = Mode::Navigate;
}

/// Apply the edited name. Blank input keeps the old name; the rest is
/// sanitized and made unique by the rename op.
fn commit(app: &mut App) {
    let Some((id, edit)) = app.rename.take() else {
        return;
    };
    app.mode = Mode::Navigate;
    let Some(old) = app.timeline.track(id).map(|t| t.name.clone()) else {
        return;
    };
    if edit.text().trim().is_empty() {
        return;
    }
    match track_ops::rename(&mut app.timeline, id, edit.text()) {
        Ok(true) => {
            if let Some(new) = app.timeline.track(id).map(|t| t.name.clone()) {
                if new != edit.text() {
                    app.flash(format!("renamed to {}", new));
                }
                app.undo.push(Operation::Rename { old, new });
            }
        }
        Ok(false) => {}
        Err(e) => app.flash(format!("rename failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::render::test_helpers::app_with_tracks;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;

    fn press(app: &mut crate::tui::app::App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut crate::tui::app::App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn rename_commits_and_undoes() {
        let mut app = app_with_tracks();
        press(&mut app, KeyCode::F(2));
        assert_eq!(app.mode, Mode::Rename);
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        type_text(&mut app, "Shots");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.timeline.find_by_name("Shots").is_some());

        press(&mut app, KeyCode::Char('u'));
        assert!(app.timeline.find_by_name("Folder").is_some());
        assert!(app.timeline.find_by_name("Shots").is_none());
    }

    #[test]
    fn clashing_name_is_made_unique() {
        let mut app = app_with_tracks();
        press(&mut app, KeyCode::Char('r'));
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        type_text(&mut app, "Audio");
        press(&mut app, KeyCode::Enter);
        let name = app.cursor_name().unwrap();
        assert_ne!(name, "Audio");
        assert!(name.starts_with("Audio"));
    }

    #[test]
    fn escape_keeps_the_old_name() {
        let mut app = app_with_tracks();
        press(&mut app, KeyCode::Char('r'));
        type_text(&mut app, "xyz");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.cursor_name().as_deref(), Some("Folder"));
        assert!(app.undo.is_empty());
    }
}
