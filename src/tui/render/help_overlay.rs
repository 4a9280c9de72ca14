use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            (" \u{2191}\u{2193}/jk", "Move cursor up/down"),
            (" \u{2190}", "Collapse / go to parent"),
            (" \u{2192}", "Expand / go to first child"),
            (" g/G", "Jump to top/bottom"),
            (" Enter", "Toggle expanded"),
            (" e/E", "Expand/collapse everything below"),
        ],
    ),
    (
        "Editing",
        &[
            (" Space", "Toggle selection"),
            (" r/F2", "Rename"),
            (" x/Del", "Delete selection"),
            (" a", "Add child track"),
            (" A", "Add root track"),
            (" J/K", "Move down/up among siblings"),
            (" m", "Mute"),
            (" l", "Loop"),
            (" o", "Context menu"),
            (" u/U", "Undo/redo"),
            (" s", "Save"),
        ],
    ),
    (
        "Mouse",
        &[
            (" click", "Select (Ctrl adds)"),
            (" drag", "Move tracks: top edge above, middle into, bottom edge below"),
            (" right click", "Context menu"),
        ],
    ),
    (
        "Search",
        &[(" /", "Search names"), (" n/N", "Next/previous match")],
    ),
    ("Global", &[(" ?", "Toggle this help"), (" q", "Quit")]),
];

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Center the overlay, leaving some margin
    let overlay_area = centered_rect(70, 80, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));
    for (title, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(format!(" {}", title), header_style)));
        for (key, desc) in *bindings {
            add_binding(&mut lines, key, desc, key_style, desc_style);
        }
        lines.push(Line::from(""));
    }

    let inner_height = overlay_area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_height);
    let scroll = app.help_scroll.min(max_scroll) as u16;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll, 0))
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use crate::tui::render::test_helpers::{app_with_tracks, render_app};

    #[test]
    fn help_lists_drag_zones() {
        let mut app = app_with_tracks();
        app.show_help = true;
        let out = render_app(&mut app, 100, 50);
        assert!(out.contains("Key Bindings"));
        assert!(out.contains("Move tracks: top edge above"));
    }
}
