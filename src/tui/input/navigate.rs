use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::track::TrackId;
use crate::ops::layout;
use crate::ops::navigate::{self, NavKey, NavOutcome};
use crate::ops::track_ops;
use crate::tui::app::{App, Mode};
use crate::tui::undo::Operation;
use crate::util::text::LineEdit;

use super::menu::{open_add_child_menu, open_add_root_menu, open_context_menu_at_cursor};
use super::search::search_step;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay intercepts ? and Esc, plus scroll keys
    if app.show_help {
        match key.code {
            KeyCode::Char('?') | KeyCode::Esc => app.show_help = false,
            KeyCode::Char('j') | KeyCode::Down => {
                app.help_scroll = app.help_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => app.help_scroll = 0,
            _ => {}
        }
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => arrow(app, NavKey::Up),
        KeyCode::Down | KeyCode::Char('j') => arrow(app, NavKey::Down),
        KeyCode::Left => arrow(app, NavKey::Left),
        KeyCode::Right => arrow(app, NavKey::Right),
        KeyCode::Char('g') | KeyCode::Home => jump(app, false),
        KeyCode::Char('G') | KeyCode::End => jump(app, true),
        KeyCode::PageUp => app.scroll_by(-(app.outline_area.height as isize)),
        KeyCode::PageDown => app.scroll_by(app.outline_area.height as isize),
        KeyCode::Char('K') => shift_sibling(app, -1),
        KeyCode::Char('J') => shift_sibling(app, 1),

        KeyCode::Enter => toggle_expanded(app),
        KeyCode::Char(' ') => toggle_selected(app),
        KeyCode::Esc => app.timeline.clear_selection(),

        KeyCode::F(2) | KeyCode::Char('r') if !ctrl => begin_rename(app),
        KeyCode::Delete | KeyCode::Char('x') => delete_selection(app),
        KeyCode::Char('a') => {
            if let Some(id) = app.cursor {
                open_add_child_menu(app, id);
            } else {
                open_add_root_menu(app);
            }
        }
        KeyCode::Char('A') => open_add_root_menu(app),
        KeyCode::Char('o') | KeyCode::Menu => open_context_menu_at_cursor(app),
        KeyCode::Char('e') => expand_all(app, true),
        KeyCode::Char('E') => expand_all(app, false),
        KeyCode::Char('m') => {
            if let Some(id) = app.cursor {
                toggle_mute(app, id);
            }
        }
        KeyCode::Char('l') => {
            if let Some(id) = app.cursor {
                toggle_loop(app, id);
            }
        }

        KeyCode::Char('/') => {
            app.mode = Mode::Search;
            app.search = LineEdit::default();
            app.history_cursor = None;
        }
        KeyCode::Char('n') => search_step(app, true),
        KeyCode::Char('N') => search_step(app, false),

        KeyCode::Char('u') => app.undo(),
        KeyCode::Char('r') if ctrl => app.redo(),
        KeyCode::Char('U') => app.redo(),
        KeyCode::Char('s') => app.save(),

        KeyCode::Char('?') => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        KeyCode::Char('q') => request_quit(app),
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        _ => {}
    }
}

fn arrow(app: &mut App, key: NavKey) {
    let Some(current) = app.cursor.filter(|&id| app.timeline.contains(id)) else {
        app.fix_cursor();
        if let Some(id) = app.cursor {
            app.timeline.select(id, false);
        }
        return;
    };
    match navigate::navigate(&mut app.timeline, current, key) {
        Ok(NavOutcome::Moved(id)) => app.focus(id),
        Ok(NavOutcome::Collapsed(_) | NavOutcome::Expanded(_)) => app.ensure_cursor_visible(),
        Ok(NavOutcome::Unchanged) => {}
        Err(e) => tracing::warn!(error = %e, "navigation failed"),
    }
}

fn jump(app: &mut App, to_end: bool) {
    let order = layout::visible_tracks(&app.timeline);
    let target = if to_end { order.last() } else { order.first() };
    if let Some(&id) = target {
        app.timeline.select(id, false);
        app.focus(id);
    }
}

/// Move the cursor track one slot up or down among its siblings
fn shift_sibling(app: &mut App, delta: isize) {
    let Some(id) = app.cursor else {
        return;
    };
    let Some(index) = app.timeline.track_index(id) else {
        return;
    };
    let Some(new_index) = index.checked_add_signed(delta) else {
        return;
    };
    app.structural("reorder", |app| {
        app.timeline.with_layout_suspended(|tl| {
            let moved = tl.change_track_index(id, new_index);
            if moved {
                tl.on_tracks_order_changed();
                tl.mark_as_edited();
            }
            moved
        })
    });
    if let Some(name) = app.cursor_name() {
        app.focus_name(&name);
    }
}

fn toggle_expanded(app: &mut App) {
    let Some(id) = app.cursor else {
        return;
    };
    let Some(track) = app.timeline.track(id) else {
        return;
    };
    if !track.can_expand() {
        return;
    }
    let result = if track.is_expanded() {
        track_ops::collapse(&mut app.timeline, id)
    } else {
        track_ops::expand(&mut app.timeline, id)
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "toggle expanded failed");
    }
    app.ensure_cursor_visible();
}

fn toggle_selected(app: &mut App) {
    let Some(id) = app.cursor else {
        return;
    };
    if app.timeline.is_selected(id) {
        app.timeline.deselect(id);
    } else {
        app.timeline.select(id, true);
    }
}

pub(super) fn begin_rename(app: &mut App) {
    let Some(track) = app.cursor.and_then(|id| app.timeline.track(id)) else {
        return;
    };
    if !track.archetype.can_rename() {
        app.flash(format!("{} can't be renamed", track.name));
        return;
    }
    app.rename = Some((track.id, LineEdit::new(&track.name)));
    app.mode = Mode::Rename;
}

/// Delete the selection, or the cursor track when nothing is selected
fn delete_selection(app: &mut App) {
    if app.timeline.selected_tracks().is_empty() {
        match app.cursor {
            Some(id) => app.timeline.select(id, false),
            None => return,
        }
    }
    let mut removed = 0;
    app.structural("delete", |app| {
        removed = app.timeline.delete_selection();
        removed > 0
    });
    if removed > 0 {
        app.flash(format!("deleted {} track(s)", removed));
    }
}

fn expand_all(app: &mut App, expand: bool) {
    let ids: Vec<TrackId> = match app.cursor {
        Some(id) => vec![id],
        None => app.timeline.roots().to_vec(),
    };
    app.timeline.with_layout_suspended(|tl| {
        for id in ids {
            let result = if expand {
                track_ops::expand_all(tl, id)
            } else {
                track_ops::collapse_all(tl, id)
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, "expand all failed");
            }
        }
    });
    app.ensure_cursor_visible();
}

pub(super) fn toggle_mute(app: &mut App, id: TrackId) {
    let Some(track) = app.timeline.track(id) else {
        return;
    };
    let (name, muted) = (track.name.clone(), !track.muted);
    if let Ok(true) = track_ops::set_muted(&mut app.timeline, id, muted) {
        app.undo.push(Operation::Mute { track: name, muted });
    }
}

pub(super) fn toggle_loop(app: &mut App, id: TrackId) {
    let Some(track) = app.timeline.track(id) else {
        return;
    };
    let (name, looped) = (track.name.clone(), !track.looped);
    if let Ok(true) = track_ops::set_looped(&mut app.timeline, id, looped) {
        app.undo.push(Operation::Loop { track: name, looped });
    }
}

fn request_quit(app: &mut App) {
    if app.timeline.is_edited() && !app.confirm_quit {
        app.confirm_quit = true;
        app.flash("unsaved changes: s to save, q again to quit");
        return;
    }
    app.should_quit = true;
}
