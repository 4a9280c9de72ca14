use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::drag::payload;
use crate::model::track::TrackId;
use crate::ops::{layout, track_ops};
use crate::tui::app::{App, Mode, Press};
use crate::tui::undo::{self, Operation};
use crate::util::geometry::Point;

use super::menu::{activate, close, open_add_root_menu, open_context_menu};

/// Rows scrolled per wheel notch
const SCROLL_STEP: isize = 3;

pub fn handle_mouse(app: &mut App, event: MouseEvent) {
    if app.mode == Mode::Menu {
        if let MouseEventKind::Down(_) = event.kind {
            click_menu(app, event.column, event.row);
        }
        return;
    }
    if app.mode != Mode::Navigate || app.show_help {
        return;
    }

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => press(app, event),
        MouseEventKind::Drag(MouseButton::Left) => drag(app, event),
        MouseEventKind::Up(MouseButton::Left) => release(app, event),
        MouseEventKind::Down(MouseButton::Right) => context_menu(app, event),
        MouseEventKind::ScrollUp => app.scroll_by(-SCROLL_STEP),
        MouseEventKind::ScrollDown => app.scroll_by(SCROLL_STEP),
        MouseEventKind::Moved => {
            app.hovered = track_under(app, event.column, event.row).map(|(id, _)| id);
        }
        _ => {}
    }
}

fn track_under(app: &App, column: u16, row: u16) -> Option<(TrackId, Point)> {
    let point = app.point_at(column, row)?;
    layout::track_at(&app.timeline, point, app.outline_width())
}

fn press(app: &mut App, event: MouseEvent) {
    let Some(point) = app.point_at(event.column, event.row) else {
        return;
    };
    let Some((id, local)) = layout::track_at(&app.timeline, point, app.outline_width()) else {
        app.timeline.clear_selection();
        return;
    };

    let on_arrow = app.timeline.track(id).is_some_and(|t| t.can_expand())
        && layout::arrow_rect(&app.timeline, id).is_some_and(|r| r.contains(local));
    if on_arrow {
        let result = if app.timeline.track(id).is_some_and(|t| t.is_expanded()) {
            track_ops::collapse(&mut app.timeline, id)
        } else {
            track_ops::expand(&mut app.timeline, id)
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "arrow toggle failed");
        }
        app.fix_cursor();
        return;
    }

    let additive = event.modifiers.contains(KeyModifiers::CONTROL);
    let was_selected = app.timeline.is_selected(id);
    if additive && was_selected {
        app.timeline.deselect(id);
    } else if additive || !was_selected {
        app.timeline.select(id, additive);
    }
    app.cursor = Some(id);
    app.press = Some(Press {
        track: id,
        origin: point,
        was_selected,
        additive,
        payload: None,
        before: None,
    });
}

fn drag(app: &mut App, event: MouseEvent) {
    let Some(point) = app.point_at(event.column, event.row) else {
        app.drag.leave();
        return;
    };
    let threshold = app.timeline.layout_config().drag_start_distance;
    let Some(press) = app.press.as_mut() else {
        return;
    };
    if press.payload.is_none() {
        if press.origin.distance(point) < threshold {
            return;
        }
        // Pressing then dragging an already selected track carries the
        // whole selection along
        let Some(payload) = payload::payload_for_press(&app.timeline, press.track) else {
            app.press = None;
            return;
        };
        press.payload = Some(payload);
        press.before = undo::snapshot(&app.timeline);
    }
    let Some(payload) = press.payload.clone() else {
        return;
    };
    let width = app.outline_width();
    if let Err(e) = app.drag.hover(&mut app.timeline, point, width, &payload) {
        tracing::debug!(error = %e, "drag hover rejected");
    }
    app.hovered = app.drag.target();
}

fn release(app: &mut App, event: MouseEvent) {
    let Some(press) = app.press.take() else {
        return;
    };
    let Some(payload) = press.payload else {
        // Plain click on a selected track narrows the selection to it
        if press.was_selected && !press.additive && app.timeline.contains(press.track) {
            app.timeline.select(press.track, false);
        }
        return;
    };

    let width = app.outline_width();
    let Some(point) = app.point_at(event.column, event.row) else {
        app.drag.leave();
        return;
    };
    if let Err(e) = app.drag.hover(&mut app.timeline, point, width, &payload) {
        tracing::debug!(error = %e, "drag hover rejected");
    }
    let Some((target, local)) = layout::track_at(&app.timeline, point, width) else {
        app.drag.leave();
        return;
    };
    if app.drag.target() != Some(target) {
        app.drag.leave();
        return;
    }

    let focus_before = app.cursor_name();
    match app.drag.drop(&mut app.timeline, local, width) {
        Ok(outcome) if outcome.moved > 0 => {
            app.fix_cursor();
            if let (Some(before), Some(after)) = (press.before, undo::snapshot(&app.timeline)) {
                app.undo.push(Operation::Restore {
                    label: "move",
                    before,
                    after,
                    focus_before,
                    focus_after: app.cursor_name(),
                });
            }
            app.flash(format!("moved {} track(s)", outcome.moved));
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "drop failed");
            app.flash(format!("drop failed: {}", e));
        }
    }
}

fn context_menu(app: &mut App, event: MouseEvent) {
    match track_under(app, event.column, event.row) {
        Some((id, _)) => {
            if !app.timeline.is_selected(id) {
                app.timeline.select(id, false);
            }
            app.cursor = Some(id);
            open_context_menu(app, id, (event.column, event.row));
        }
        None if app.point_at(event.column, event.row).is_some() => open_add_root_menu(app),
        None => {}
    }
}

/// Inside the popup: run the clicked entry. Outside: dismiss.
fn click_menu(app: &mut App, column: u16, row: u16) {
    let Some(menu) = app.menu.as_mut() else {
        return;
    };
    let Some(area) = menu.area else {
        close(app);
        return;
    };
    let inside = column > area.x
        && column + 1 < area.right()
        && row > area.y
        && row + 1 < area.bottom();
    if !inside {
        close(app);
        return;
    }
    let index = (row - area.y - 1) as usize;
    if index < menu.entries.len() {
        menu.cursor = index;
        if menu.selected().is_some() {
            activate(app);
        }
    }
}
