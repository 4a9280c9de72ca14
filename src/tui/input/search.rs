use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::track::TrackId;
use crate::ops::track_ops;
use crate::tui::app::{App, Mode};
use crate::util::text::LineEdit;

pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            app.mode = Mode::Navigate;
            app.search = LineEdit::default();
            app.history_cursor = None;
        }

        (_, KeyCode::Enter) => {
            let query = app.search.text().to_string();
            app.mode = Mode::Navigate;
            app.search = LineEdit::default();
            app.history_cursor = None;
            if !query.is_empty() {
                app.ui_state.push_search(&query);
                app.last_search = Some(query);
                search_step(app, true);
            }
        }

        // History: Up = older, Down = newer
        (_, KeyCode::Up) => {
            let history = &app.ui_state.search_history;
            let next = app.history_cursor.map_or(0, |i| i + 1);
            if let Some(entry) = history.get(next) {
                app.search = LineEdit::new(entry);
                app.history_cursor = Some(next);
            }
        }
        (_, KeyCode::Down) => match app.history_cursor {
            Some(0) => {
                app.search = LineEdit::default();
                app.history_cursor = None;
            }
            Some(i) => {
                if let Some(entry) = app.ui_state.search_history.get(i - 1) {
                    app.search = LineEdit::new(entry);
                }
                app.history_cursor = Some(i - 1);
            }
            None => {}
        },

        (_, KeyCode::Backspace) => {
            if app.search.text().is_empty() {
                app.mode = Mode::Navigate;
            } else {
                app.search.backspace();
            }
        }
        (_, KeyCode::Left) => app.search.left(),
        (_, KeyCode::Right) => app.search.right(),
        (m, KeyCode::Char('w')) if m.contains(KeyModifiers::CONTROL) => {
            app.search.delete_word_back()
        }
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => app.search.insert(c),
        _ => {}
    }
}

/// Jump to the next (or previous) track whose name or title matches the
/// last search, wrapping around the document. Collapsed ancestors of the
/// match are expanded.
pub fn search_step(app: &mut App, forward: bool) {
    let Some(pattern) = app.last_search.clone() else {
        app.flash("no previous search");
        return;
    };
    let Some(re) = App::search_regex(&pattern) else {
        return;
    };
    let order = app.timeline.document_order();
    if order.is_empty() {
        return;
    }
    let start = app
        .cursor
        .and_then(|c| order.iter().position(|&id| id == c));
    let len = order.len();
    let candidates: Vec<usize> = (1..=len)
        .map(|step| match (start, forward) {
            (Some(s), true) => (s + step) % len,
            (Some(s), false) => (s + len * 2 - step) % len,
            (None, true) => step - 1,
            (None, false) => len - step,
        })
        .collect();

    let found = candidates.into_iter().find(|&i| {
        app.timeline.track(order[i]).is_some_and(|t| {
            re.is_match(&t.name) || t.title.as_deref().is_some_and(|title| re.is_match(title))
        })
    });
    let Some(index) = found else {
        app.flash(format!("no match: {}", pattern));
        return;
    };
    let wrapped = match start {
        Some(s) if forward => index <= s,
        Some(s) => index >= s,
        None => false,
    };

    let id = order[index];
    reveal(app, id);
    app.timeline.select(id, false);
    app.focus(id);
    if wrapped {
        app.flash("search wrapped");
    }
}

fn reveal(app: &mut App, id: TrackId) {
    let mut ancestors = Vec::new();
    let mut cur = app.timeline.parent_of(id);
    while let Some(p) = cur {
        ancestors.push(p);
        cur = app.timeline.parent_of(p);
    }
    app.timeline.with_layout_suspended(|tl| {
        for p in ancestors {
            if let Err(e) = track_ops::expand(tl, p) {
                tracing::warn!(error = %e, "could not reveal search match");
            }
        }
    });
}
