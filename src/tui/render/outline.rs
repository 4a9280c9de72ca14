use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::draw::{self, DrawCommand, DrawSink, HeaderState};
use crate::model::track::TrackId;
use crate::ops::layout;
use crate::tui::app::{App, Mode};
use crate::tui::theme::Theme;
use crate::util::text::{display_width, truncate_to_width};

use super::push_highlighted_spans;

/// Maps header draw commands from timeline space (one unit per cell) onto
/// the terminal buffer, shifted by the scroll offset and clipped to `area`.
struct CellSink<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    scroll: usize,
    theme: &'a Theme,
    search_re: Option<&'a Regex>,
    /// Header being drawn; text styling depends on its selection
    selected: bool,
}

impl CellSink<'_> {
    fn row(&self, y: f32) -> Option<u16> {
        let r = y.floor() as i64 - self.scroll as i64;
        (r >= 0 && r < i64::from(self.area.height)).then(|| self.area.y + r as u16)
    }

    /// Clip a timeline-space span of columns to the outline
    fn cols(&self, x: f32, width: f32) -> Option<(u16, u16)> {
        let start = (x.floor().max(0.0) as u16).min(self.area.width);
        let end = ((x + width).ceil().max(0.0) as u16).min(self.area.width);
        (end > start).then(|| (self.area.x + start, end - start))
    }

    fn middle_row(&self, y: f32, height: f32) -> Option<u16> {
        self.row(y + height / 2.0)
    }
}

impl DrawSink for CellSink<'_> {
    fn draw(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::FillRect { rect, fill } => {
                let Some((x, width)) = self.cols(rect.x, rect.width) else {
                    return;
                };
                let style = self.theme.fill_style(fill);
                let top = rect.y.floor() as i64;
                let bottom = rect.bottom().ceil() as i64;
                for y in top..bottom {
                    if let Some(row) = self.row(y as f32) {
                        self.buf.set_style(Rect::new(x, row, width, 1), style);
                    }
                }
            }
            DrawCommand::Arrow {
                rect,
                expanded,
                highlighted,
            } => {
                let (Some((x, _)), Some(row)) = (
                    self.cols(rect.x, rect.width),
                    self.middle_row(rect.y, rect.height),
                ) else {
                    return;
                };
                let symbol = if expanded { "\u{25BE}" } else { "\u{25B8}" };
                let fg = if highlighted {
                    self.theme.highlight
                } else {
                    self.theme.dim
                };
                self.buf.set_string(x, row, symbol, Style::default().fg(fg));
            }
            DrawCommand::Text { rect, text } => {
                let (Some((x, width)), Some(row)) = (
                    self.cols(rect.x, rect.width),
                    self.middle_row(rect.y, rect.height),
                ) else {
                    return;
                };
                let base = if self.selected {
                    Style::default()
                        .fg(self.theme.text_bright)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.text)
                };
                let matched = Style::default()
                    .fg(self.theme.search_match_fg)
                    .bg(self.theme.search_match_bg);
                let shown = truncate_to_width(&text, width as usize);
                let mut spans = Vec::new();
                push_highlighted_spans(&mut spans, &shown, base, matched, self.search_re);
                self.buf.set_line(x, row, &Line::from(spans), width);
            }
        }
    }
}

/// Render the track outline: one three-row header per visible track
pub fn render_outline(frame: &mut Frame, app: &App, area: Rect) {
    if app.timeline.roots().is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            " No tracks. Press A to add one.",
            Style::default().fg(app.theme.dim).bg(app.theme.background),
        )));
        frame.render_widget(hint, area);
        return;
    }

    let search_re = app.active_search_re();
    let width = area.width as f32;
    let pitch = app.timeline.layout_config().row_pitch();
    let window = app.scroll as f32..(app.scroll + area.height as usize) as f32;
    let focused = app.mode != Mode::Menu;

    let visible: Vec<TrackId> = layout::visible_tracks(&app.timeline)
        .into_iter()
        .filter(|&id| {
            app.timeline.track(id).is_some_and(|t| {
                let y = t.layout().y;
                y + pitch > window.start && y < window.end
            })
        })
        .collect();

    {
        let mut sink = CellSink {
            buf: frame.buffer_mut(),
            area,
            scroll: app.scroll,
            theme: &app.theme,
            search_re: search_re.as_ref(),
            selected: false,
        };
        for &id in &visible {
            sink.selected = app.timeline.is_selected(id);
            let state = HeaderState {
                hovered: app.hovered == Some(id),
                focused,
            };
            draw::draw_track_header(&app.timeline, id, width, state, &app.drag, &mut sink);
            draw_decorations(&mut sink, app, id, width);
        }
    }

    if let Some((id, edit)) = &app.rename
        && let Some(rect) = draw::text_rect(&app.timeline, *id, width)
    {
        let sink = CellSink {
            buf: frame.buffer_mut(),
            area,
            scroll: app.scroll,
            theme: &app.theme,
            search_re: None,
            selected: true,
        };
        let (Some((x, cols)), Some(row)) = (
            sink.cols(rect.x, rect.width),
            sink.middle_row(rect.y, rect.height),
        ) else {
            return;
        };
        let style = Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg);
        sink.buf.set_style(Rect::new(x, row, cols, 1), style);
        sink.buf
            .set_stringn(x, row, " ".repeat(cols as usize), cols as usize, style);
        // Keep the cursor in view for names longer than the slot
        let skip = (edit.cursor_col() + 1).saturating_sub(cols as usize);
        let tail: String = edit.text().chars().skip(skip).collect();
        sink.buf.set_stringn(x, row, &tail, cols as usize, style);
        let cursor_x = x + (edit.cursor_col() - skip).min(cols as usize - 1) as u16;
        frame.set_cursor_position(Position::new(cursor_x, row));
    }
}

/// Cursor marker and the right-aligned kind badge
fn draw_decorations(sink: &mut CellSink, app: &App, id: TrackId, width: f32) {
    let (Some(track), Some(header), Some(text)) = (
        app.timeline.track(id),
        layout::header_rect(&app.timeline, id, width),
        draw::text_rect(&app.timeline, id, width),
    ) else {
        return;
    };
    let Some(row) = sink.middle_row(header.y, header.height) else {
        return;
    };

    if app.cursor == Some(id) && app.mode != Mode::Menu {
        sink.buf.set_string(
            sink.area.x,
            row,
            "\u{258C}",
            Style::default().fg(app.theme.highlight),
        );
    }

    let mut badge = track.archetype.default_name().to_lowercase();
    if track.looped {
        badge.push_str(" \u{21BB}");
    }
    let badge_width = display_width(&badge) as u16;
    let title_end = text.x as u16 + display_width(track.display_title()) as u16 + 2;
    if title_end + badge_width + 1 < sink.area.width {
        let x = sink.area.x + sink.area.width - badge_width - 1;
        let mut style = Style::default().fg(app.theme.kind_color(track.archetype));
        if crate::ops::track_ops::is_effectively_muted(&app.timeline, id) {
            style = style.fg(app.theme.dim).add_modifier(Modifier::DIM);
        }
        sink.buf.set_string(x, row, &badge, style);
    }
}
