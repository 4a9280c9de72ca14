use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::text::display_width;

/// File name, dirty marker and counts across the top of the screen
pub fn render_title_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = vec![
        Span::styled(
            format!(" {}", app.file_name()),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if app.timeline.is_edited() {
        spans.push(Span::styled(
            " \u{25CF}",
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }

    let selected = app.timeline.selected_tracks().len();
    let mut info = format!(
        "{} tracks  {} fps",
        app.timeline.track_count(),
        app.timeline.fps()
    );
    if selected > 1 {
        info = format!("{} selected  {}", selected, info);
    }
    info.push(' ');

    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let info_width = display_width(&info);
    if used + info_width < width {
        spans.push(Span::styled(
            " ".repeat(width - used - info_width),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(info, Style::default().fg(app.theme.dim).bg(bg)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::{app_with_tracks, render_to_string};

    #[test]
    fn shows_file_and_counts() {
        let app = app_with_tracks();
        let out = render_to_string(40, 1, |frame, area| render_title_row(frame, &app, area));
        assert!(out.starts_with(" scene.tln"));
        assert!(out.ends_with("3 tracks  30 fps"));
        assert!(!out.contains('\u{25CF}'));
    }

    #[test]
    fn edited_timeline_gets_a_dot() {
        let mut app = app_with_tracks();
        app.timeline.mark_as_edited();
        let out = render_to_string(40, 1, |frame, area| render_title_row(frame, &app, area));
        assert!(out.starts_with(" scene.tln \u{25CF}"));
    }
}
