//! Abstract drawing for track headers. Hosts turn the commands into pixels
//! or terminal cells.

use crate::drag::{DragController, DragEffect, DragPosition};
use crate::model::timeline::Timeline;
use crate::model::track::TrackId;
use crate::ops::{layout, track_ops};
use crate::util::geometry::Rect;

/// Semantic fill colors; the host maps them to its palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Selected,
    /// Selected while the outline doesn't have focus
    SelectedUnfocused,
    Hovered,
    /// Dims a muted track and everything under it
    Disabled,
    DropIndicator,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, fill: Fill },
    Arrow { rect: Rect, expanded: bool, highlighted: bool },
    Text { rect: Rect, text: String },
}

pub trait DrawSink {
    fn draw(&mut self, command: DrawCommand);
}

impl DrawSink for Vec<DrawCommand> {
    fn draw(&mut self, command: DrawCommand) {
        self.push(command);
    }
}

/// Per-frame interaction state the host tracks
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderState {
    pub hovered: bool,
    pub focused: bool,
}

/// Text area of a header in timeline space: right of the arrow slot
pub fn text_rect(tl: &Timeline, id: TrackId, width: f32) -> Option<Rect> {
    let header = layout::header_rect(tl, id, width)?;
    let track = tl.track(id)?;
    let metrics = tl.layout_config();
    let left = track.layout().x_offset + metrics.arrow_padding * 2.0 + metrics.arrow_size;
    Some(Rect::new(
        left,
        header.y,
        (width - left).max(0.0),
        header.height,
    ))
}

/// Emit the commands for one visible header, back to front. Hidden
/// tracks draw nothing.
pub fn draw_track_header(
    tl: &Timeline,
    id: TrackId,
    width: f32,
    state: HeaderState,
    drag: &DragController,
    sink: &mut dyn DrawSink,
) {
    let (Some(track), Some(header), Some(text)) = (
        tl.track(id),
        layout::header_rect(tl, id, width),
        text_rect(tl, id, width),
    ) else {
        return;
    };
    let metrics = tl.layout_config();

    let selected = tl.is_selected(id);
    if selected || state.hovered {
        let fill = match (selected, state.focused) {
            (true, true) => Fill::Selected,
            (true, false) if !state.hovered => Fill::SelectedUnfocused,
            _ => Fill::Hovered,
        };
        sink.draw(DrawCommand::FillRect { rect: header, fill });
    }

    if track.can_expand()
        && let Some(arrow) = layout::arrow_rect(tl, id)
    {
        sink.draw(DrawCommand::Arrow {
            rect: Rect::new(arrow.x, header.y + arrow.y, arrow.width, arrow.height),
            expanded: track.is_expanded(),
            highlighted: state.hovered,
        });
    }

    sink.draw(DrawCommand::Text {
        rect: text,
        text: track.display_title().to_string(),
    });

    if track_ops::is_effectively_muted(tl, id) {
        sink.draw(DrawCommand::FillRect {
            rect: header,
            fill: Fill::Disabled,
        });
    }

    if drag.target() == Some(id) && drag.effect() == DragEffect::Move {
        let margin = metrics.drag_margin;
        let rect = match drag.position() {
            DragPosition::At => Some(text),
            DragPosition::Above => Some(Rect::new(
                text.x,
                text.y - margin - metrics.node_offset,
                text.width,
                margin * 2.0,
            )),
            DragPosition::Below => Some(Rect::new(
                text.x,
                text.bottom() - margin,
                text.width,
                margin * 2.0,
            )),
            DragPosition::None => None,
        };
        if let Some(rect) = rect {
            sink.draw(DrawCommand::FillRect {
                rect,
                fill: Fill::DropIndicator,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::payload;
    use crate::model::archetype::TrackArchetype;
    use crate::model::config::LayoutConfig;
    use crate::ops::track_ops::{set_muted, spawn_named};
    use crate::util::geometry::Point;
    use pretty_assertions::assert_eq;

    #[test]
    fn leaf_header_draws_title_only() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let cam = spawn_named(&mut tl, TrackArchetype::CameraCut, None, "Cam").unwrap();
        let mut out: Vec<DrawCommand> = Vec::new();
        draw_track_header(&tl, cam, 200.0, HeaderState::default(), &DragController::default(), &mut out);
        assert_eq!(
            out,
            vec![DrawCommand::Text {
                rect: Rect::new(20.0, 0.0, 180.0, 22.0),
                text: "Cam".into(),
            }]
        );
    }

    #[test]
    fn muted_parent_dims_child_and_arrow_is_drawn() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let f = spawn_named(&mut tl, TrackArchetype::Folder, None, "F").unwrap();
        let c = spawn_named(&mut tl, TrackArchetype::CameraCut, Some(f), "C").unwrap();
        set_muted(&mut tl, f, true).unwrap();

        let mut parent: Vec<DrawCommand> = Vec::new();
        draw_track_header(&tl, f, 200.0, HeaderState::default(), &DragController::default(), &mut parent);
        assert!(matches!(parent[0], DrawCommand::Arrow { expanded: true, .. }));

        let mut child: Vec<DrawCommand> = Vec::new();
        draw_track_header(&tl, c, 200.0, HeaderState::default(), &DragController::default(), &mut child);
        assert!(child.contains(&DrawCommand::FillRect {
            rect: Rect::new(0.0, 23.0, 200.0, 22.0),
            fill: Fill::Disabled,
        }));
    }

    #[test]
    fn live_drag_draws_drop_indicator() {
        let mut tl = Timeline::new(30.0, LayoutConfig::default());
        let a = spawn_named(&mut tl, TrackArchetype::CameraCut, None, "A").unwrap();
        let b = spawn_named(&mut tl, TrackArchetype::CameraCut, None, "B").unwrap();
        let mut drag = DragController::default();
        drag.enter(&tl, a, &payload::encode_tracks(&tl, &[b])).unwrap();
        drag.over(&mut tl, Point::new(50.0, 0.5), 200.0);

        let mut out: Vec<DrawCommand> = Vec::new();
        let state = HeaderState {
            hovered: true,
            focused: true,
        };
        draw_track_header(&tl, a, 200.0, state, &drag, &mut out);
        assert_eq!(
            out.first(),
            Some(&DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 200.0, 22.0),
                fill: Fill::Hovered,
            })
        );
        assert_eq!(
            out.last(),
            Some(&DrawCommand::FillRect {
                rect: Rect::new(20.0, -3.0, 180.0, 4.0),
                fill: Fill::DropIndicator,
            })
        );
    }
}
