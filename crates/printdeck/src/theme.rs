use printdeck_core::UiMode;
use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const TITLE_STYLE: Style = Style::new()
    .fg(Color::Rgb(250, 189, 47))
    .add_modifier(Modifier::BOLD);
pub const MESSAGE_STYLE: Style = Style::new().fg(Color::Rgb(235, 219, 178));
pub const HINT_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));
pub const LABEL_STYLE: Style = Style::new().fg(Color::Rgb(131, 165, 152));
pub const BORDER_STYLE: Style = Style::new().fg(Color::Rgb(80, 73, 69));

pub fn mode_color(mode: UiMode) -> Color {
    match mode {
        UiMode::Splash => Color::Rgb(254, 128, 25),
        UiMode::Idle => Color::Rgb(184, 187, 38),
        UiMode::Printing => Color::Rgb(131, 165, 152),
    }
}

pub fn mode_style(mode: UiMode) -> Style {
    Style::new()
        .fg(mode_color(mode))
        .add_modifier(Modifier::BOLD)
}
