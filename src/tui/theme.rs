use ratatui::style::{Color, Modifier, Style};

use crate::draw::Fill;
use crate::model::archetype::TrackArchetype;
use crate::model::config::UiConfig;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub selection_bg: Color,
    pub selection_unfocused_bg: Color,
    pub hover_bg: Color,
    pub drop_bg: Color,
    pub search_match_bg: Color,
    pub search_match_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_unfocused_bg: Color::Rgb(0x24, 0x10, 0x30),
            hover_bg: Color::Rgb(0x1C, 0x10, 0x33),
            drop_bg: Color::Rgb(0x40, 0xE0, 0xD0),
            search_match_bg: Color::Rgb(0x40, 0xE0, 0xD0),
            search_match_fg: Color::Rgb(0x0C, 0x00, 0x1B),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from `[ui.colors]`, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(%key, %value, "ignoring unparseable color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "yellow" => theme.yellow = color,
                "green" => theme.green = color,
                "cyan" => theme.cyan = color,
                "purple" => theme.purple = color,
                "selection_bg" => theme.selection_bg = color,
                "selection_unfocused_bg" => theme.selection_unfocused_bg = color,
                "hover_bg" => theme.hover_bg = color,
                "drop_bg" => theme.drop_bg = color,
                "search_match_bg" => theme.search_match_bg = color,
                "search_match_fg" => theme.search_match_fg = color,
                _ => {}
            }
        }
        theme
    }

    /// Style patch a header fill applies on top of what's already drawn
    pub fn fill_style(&self, fill: Fill) -> Style {
        match fill {
            Fill::Selected => Style::default().bg(self.selection_bg),
            Fill::SelectedUnfocused => Style::default().bg(self.selection_unfocused_bg),
            Fill::Hovered => Style::default().bg(self.hover_bg),
            Fill::Disabled => Style::default().fg(self.dim).add_modifier(Modifier::DIM),
            Fill::DropIndicator => Style::default().bg(self.drop_bg).fg(self.background),
        }
    }

    /// Accent for the small kind badge next to a title
    pub fn kind_color(&self, kind: TrackArchetype) -> Color {
        match kind {
            TrackArchetype::Folder => self.text,
            TrackArchetype::Actor => self.highlight,
            TrackArchetype::Script => self.purple,
            TrackArchetype::Property | TrackArchetype::Event => self.cyan,
            TrackArchetype::Audio => self.green,
            TrackArchetype::ScreenFade | TrackArchetype::CameraCut => self.yellow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#FF4444"),
            Some(Color::Rgb(0xFF, 0x44, 0x44))
        );
        assert_eq!(parse_hex_color("FF4444"), None);
        assert_eq!(parse_hex_color("#FF44"), None);
        assert_eq!(parse_hex_color("#ZZZZZZ"), None);
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("drop_bg".into(), "#112233".into());
        ui.colors.insert("text".into(), "not a color".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        assert_eq!(theme.drop_bg, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.text, Color::Rgb(0xB0, 0xAA, 0xFF));
    }

    #[test]
    fn disabled_fill_only_touches_foreground() {
        let theme = Theme::default();
        let style = theme.fill_style(Fill::Disabled);
        assert_eq!(style.bg, None);
        assert_eq!(style.fg, Some(theme.dim));
    }
}
