use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, PopupEntry};
use crate::util::text::display_width;

/// Popup placement: opens at the anchor and shifts to stay on screen
pub fn menu_rect(entries: &[PopupEntry], anchor: (u16, u16), screen: Rect) -> Rect {
    let label_width = entries
        .iter()
        .map(|e| match e {
            PopupEntry::Item { label, .. } => display_width(label),
            PopupEntry::Separator => 0,
        })
        .max()
        .unwrap_or(0) as u16;
    let width = (label_width + 4).min(screen.width);
    let height = (entries.len() as u16 + 2).min(screen.height);
    let x = anchor.0.min(screen.right().saturating_sub(width)).max(screen.x);
    let y = anchor.1.min(screen.bottom().saturating_sub(height)).max(screen.y);
    Rect::new(x, y, width, height)
}

/// Render the open popup menu and remember where it went
pub fn render_menu_popup(frame: &mut Frame, app: &mut App, screen: Rect) {
    let theme = app.theme.clone();
    let Some(menu) = app.menu.as_mut() else {
        return;
    };
    let area = menu_rect(&menu.entries, menu.anchor, screen);
    menu.area = Some(area);

    let bg = theme.background;
    let inner_width = area.width.saturating_sub(2) as usize;
    let lines: Vec<Line> = menu
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            PopupEntry::Separator => Line::from(Span::styled(
                "\u{2500}".repeat(inner_width),
                Style::default().fg(theme.dim).bg(bg),
            )),
            PopupEntry::Item { label, .. } => {
                let text = format!(" {:<w$}", label, w = inner_width.saturating_sub(1));
                let style = if i == menu.cursor {
                    Style::default()
                        .fg(theme.text_bright)
                        .bg(theme.selection_bg)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text).bg(bg)
                };
                Line::from(Span::styled(text, style))
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::MenuAction;
    use crate::model::archetype::TrackArchetype;
    use crate::tui::input::{handle_mouse, open_context_menu};
    use crate::tui::render::test_helpers::{app_with_tracks, render_app, render_to_string};
    use insta::assert_snapshot;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use pretty_assertions::assert_eq;

    fn item(label: &str) -> PopupEntry {
        PopupEntry::Item {
            label: label.into(),
            action: MenuAction::AddRoot(TrackArchetype::Folder),
        }
    }

    #[test]
    fn popup_is_pushed_back_on_screen() {
        let entries = vec![item("Rename"), PopupEntry::Separator, item("Delete")];
        let screen = Rect::new(0, 0, 40, 10);
        assert_eq!(menu_rect(&entries, (2, 2), screen), Rect::new(2, 2, 10, 5));
        assert_eq!(menu_rect(&entries, (38, 9), screen), Rect::new(30, 5, 10, 5));
    }

    #[test]
    fn leaf_menu_renders_boxed_entries() {
        let mut app = app_with_tracks();
        let audio = app.timeline.find_by_name("Audio").unwrap();
        open_context_menu(&mut app, audio, (0, 0));
        let out = render_to_string(10, 7, |frame, area| render_menu_popup(frame, &mut app, area));
        assert_snapshot!(out, @r"
        ┌────────┐
        │ Rename │
        │ Delete │
        │────────│
        │ Mute   │
        │ Loop   │
        └────────┘
        ");
    }

    #[test]
    fn clicking_an_entry_runs_it() {
        let mut app = app_with_tracks();
        handle_mouse(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Right),
                column: 10,
                row: 2,
                modifiers: KeyModifiers::NONE,
            },
        );
        let out = render_app(&mut app, 40, 24);
        assert!(out.contains("Rename"));
        let area = app.menu.as_ref().and_then(|m| m.area).unwrap();

        // "Delete" is the second entry of a Folder's menu
        handle_mouse(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: area.x + 2,
                row: area.y + 2,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert!(app.menu.is_none());
        assert!(app.timeline.find_by_name("Folder").is_none());
    }
}
