use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::text::display_width;

const NAVIGATE_HINTS: &str = "a add  r rename  x delete  / search  ? help";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let (mut spans, hint): (Vec<Span>, &str) = match app.mode {
        Mode::Navigate => {
            let left = if let Some(msg) = &app.message {
                vec![Span::styled(
                    format!(" {}", msg),
                    Style::default().fg(app.theme.yellow).bg(bg),
                )]
            } else if let Some(pattern) = &app.last_search {
                vec![Span::styled(format!(" /{}", pattern), dim)]
            } else {
                Vec::new()
            };
            let hint = if app.last_search.is_some() && app.message.is_none() {
                "n/N next/prev"
            } else if app.show_key_hints {
                NAVIGATE_HINTS
            } else {
                ""
            };
            (left, hint)
        }
        Mode::Search => {
            // Search prompt: /pattern with the terminal cursor on the edit point
            let spans = vec![Span::styled(
                format!(" /{}", app.search.text()),
                Style::default().fg(app.theme.text_bright).bg(bg),
            )];
            let x = area.x + 2 + app.search.cursor_col() as u16;
            if x < area.right() {
                frame.set_cursor_position(Position::new(x, area.y));
            }
            (spans, "Enter search  Esc cancel")
        }
        Mode::Rename => (
            vec![Span::styled(
                " rename",
                Style::default().fg(app.theme.highlight).bg(bg),
            )],
            "Enter apply  Esc cancel",
        ),
        Mode::Menu => (Vec::new(), "\u{2191}\u{2193} choose  Enter run  Esc close"),
    };

    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint) + 1;
    if !hint.is_empty() && content_width + hint_width < width {
        spans.push(Span::styled(
            " ".repeat(width - content_width - hint_width),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(format!("{} ", hint), dim));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::{app_with_tracks, render_to_string};
    use crate::util::text::LineEdit;

    fn status(app: &App) -> String {
        render_to_string(60, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn navigate_shows_key_hints() {
        let app = app_with_tracks();
        assert!(status(&app).ends_with(NAVIGATE_HINTS));
    }

    #[test]
    fn message_wins_over_search() {
        let mut app = app_with_tracks();
        app.last_search = Some("cam".into());
        assert!(status(&app).starts_with(" /cam"));
        app.flash("saved scene.tln");
        let out = status(&app);
        assert!(out.starts_with(" saved scene.tln"));
        assert!(!out.contains("/cam"));
    }

    #[test]
    fn search_prompt_echoes_input() {
        let mut app = app_with_tracks();
        app.mode = Mode::Search;
        app.search = LineEdit::new("aud");
        let out = status(&app);
        assert!(out.starts_with(" /aud"));
        assert!(out.ends_with("Esc cancel"));
    }
}
