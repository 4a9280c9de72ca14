use crossterm::event::{KeyCode, KeyEvent};

use crate::model::archetype::TrackArchetype;
use crate::model::track::TrackId;
use crate::ops::menu::{self, CommandOutcome, MenuEntry, MenuItems, TrackCommand};
use crate::ops::track_ops;
use crate::tui::app::{App, MenuAction, MenuState, Mode, PopupEntry};

use super::navigate::{begin_rename, toggle_loop, toggle_mute};

pub(super) fn handle_menu(app: &mut App, key: KeyEvent) {
    let Some(menu) = app.menu.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => close(app),
        KeyCode::Up | KeyCode::Char('k') => menu.step(false),
        KeyCode::Down | KeyCode::Char('j') => menu.step(true),
        KeyCode::Enter => activate(app),
        _ => {}
    }
}

/// Screen cell just right of the cursor track's title
fn cursor_anchor(app: &App) -> (u16, u16) {
    let area = app.outline_area;
    let row = app
        .cursor
        .and_then(|id| app.timeline.track(id))
        .map(|t| t.layout().y as usize + 1)
        .unwrap_or(0)
        .saturating_sub(app.scroll);
    (area.x + 4, area.y + row as u16 + 1)
}

pub fn open_context_menu(app: &mut App, id: TrackId, anchor: (u16, u16)) {
    let mut items = MenuItems::default();
    menu::build_context_menu(&app.timeline, id, &mut items);
    let entries = items
        .entries
        .into_iter()
        .map(|e| match e {
            MenuEntry::Command { label, command } => PopupEntry::Item {
                label,
                action: MenuAction::Track(command),
            },
            MenuEntry::Separator => PopupEntry::Separator,
        })
        .collect();
    open(app, MenuState::new(Some(id), entries, anchor));
}

pub(super) fn open_context_menu_at_cursor(app: &mut App) {
    let Some(id) = app.cursor else {
        open_add_root_menu(app);
        return;
    };
    let anchor = cursor_anchor(app);
    open_context_menu(app, id, anchor);
}

/// Menu of the kinds the track accepts as children
pub(super) fn open_add_child_menu(app: &mut App, id: TrackId) {
    let Some(track) = app.timeline.track(id) else {
        return;
    };
    let entries: Vec<PopupEntry> = TrackArchetype::ALL
        .into_iter()
        .filter(|&kind| track.archetype.can_add_child_track(kind))
        .map(|kind| PopupEntry::Item {
            label: format!("Add {}", kind),
            action: MenuAction::Track(TrackCommand::AddChild(kind)),
        })
        .collect();
    if entries.is_empty() {
        let name = track.name.clone();
        app.flash(format!("{} takes no child tracks", name));
        return;
    }
    let anchor = cursor_anchor(app);
    open(app, MenuState::new(Some(id), entries, anchor));
}

pub fn open_add_root_menu(app: &mut App) {
    let entries = TrackArchetype::ALL
        .into_iter()
        .map(|kind| PopupEntry::Item {
            label: format!("Add {}", kind),
            action: MenuAction::AddRoot(kind),
        })
        .collect();
    let anchor = (app.outline_area.x + 2, app.outline_area.y);
    open(app, MenuState::new(None, entries, anchor));
}

fn open(app: &mut App, menu: MenuState) {
    app.menu = Some(menu);
    app.mode = Mode::Menu;
}

pub(super) fn close(app: &mut App) {
    app.menu = None;
    app.mode = Mode::Navigate;
}

/// Run the highlighted entry and close the menu
pub(super) fn activate(app: &mut App) {
    let Some(menu) = app.menu.take() else {
        return;
    };
    app.mode = Mode::Navigate;
    let Some(action) = menu.selected() else {
        return;
    };
    match (action, menu.track) {
        (MenuAction::Track(command), Some(id)) if app.timeline.contains(id) => {
            run_track_command(app, id, command)
        }
        (MenuAction::AddRoot(kind), _) => {
            app.structural("add track", |app| {
                match track_ops::spawn_track(&mut app.timeline, kind, None) {
                    Ok(child) => {
                        app.timeline.select(child, false);
                        app.cursor = Some(child);
                        true
                    }
                    Err(e) => {
                        app.flash(format!("can't add track: {}", e));
                        false
                    }
                }
            });
        }
        _ => {}
    }
}

fn run_track_command(app: &mut App, id: TrackId, command: TrackCommand) {
    match command {
        TrackCommand::Rename => {
            app.focus(id);
            begin_rename(app);
        }
        TrackCommand::ToggleMute => toggle_mute(app, id),
        TrackCommand::ToggleLoop => toggle_loop(app, id),
        TrackCommand::ExpandAll | TrackCommand::CollapseAll => {
            if let Err(e) = menu::execute(&mut app.timeline, id, command) {
                app.flash(e.to_string());
            }
            app.fix_cursor();
        }
        TrackCommand::Delete | TrackCommand::AddChild(_) => {
            let label = if command == TrackCommand::Delete {
                "delete"
            } else {
                "add track"
            };
            app.structural(label, |app| {
                match menu::execute(&mut app.timeline, id, command) {
                    Ok(CommandOutcome::Spawned(child)) => {
                        app.cursor = Some(child);
                        true
                    }
                    Ok(_) => true,
                    Err(e) => {
                        app.flash(e.to_string());
                        false
                    }
                }
            });
        }
    }
}
