//! Color palette, style constants and playlist indicators.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_ACCENT: Color = Color::Rgb(200, 40, 40);
pub const C_PLAYING: Color = Color::Rgb(80, 200, 120);
pub const C_PAUSED: Color = Color::Rgb(255, 184, 80);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 40, 52);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(200, 40, 40);
pub const C_ACTIVE_FG: Color = Color::White;
pub const C_INACTIVE_FG: Color = Color::Black;
pub const C_INACTIVE_BG: Color = Color::Rgb(200, 200, 200);
pub const C_FILTER_FG: Color = Color::Rgb(255, 200, 80);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);

// ── Playlist / progress indicators ────────────────────────────────────────────

pub const IND_PLAYING: &str = ">";
pub const IND_PLAYED: char = '#';
pub const IND_UNPLAYED: char = '-';

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

/// Cursor row of the focused panel: white on red.
pub fn style_active() -> Style {
    Style::default()
        .fg(C_ACTIVE_FG)
        .bg(C_ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Cursor row of the other panels: black on white.
pub fn style_inactive() -> Style {
    Style::default().fg(C_INACTIVE_FG).bg(C_INACTIVE_BG)
}

pub fn style_playing() -> Style {
    Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD)
}

pub fn style_paused() -> Style {
    Style::default().fg(C_PAUSED)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_filter() -> Style {
    Style::default().fg(C_FILTER_FG)
}
