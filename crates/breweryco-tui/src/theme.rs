//! Taproom palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const AMBER: Color = Color::Rgb(255, 179, 71); // #ffb347
pub const COPPER: Color = Color::Rgb(214, 124, 66); // #d67c42
pub const FOAM: Color = Color::Rgb(245, 236, 214); // #f5ecd6
pub const HOPS_GREEN: Color = Color::Rgb(140, 201, 96); // #8cc960
pub const CHERRY_RED: Color = Color::Rgb(232, 85, 85); // #e85555
pub const MALT_GRAY: Color = Color::Rgb(125, 112, 98); // #7d7062

pub const STOUT: Color = Color::Rgb(28, 24, 22); // #1c1816
pub const PORTER: Color = Color::Rgb(48, 40, 35); // #302823

/// Shimmer gradient for placeholder rows, darkest first.
pub const SHIMMER: [Color; 4] = [
    Color::Rgb(58, 50, 44),
    Color::Rgb(74, 64, 56),
    Color::Rgb(92, 80, 70),
    Color::Rgb(74, 64, 56),
];

// ── Semantic styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(COPPER)
}

pub fn border_default() -> Style {
    Style::default().fg(MALT_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(AMBER)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(FOAM)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(AMBER)
        .bg(PORTER)
        .add_modifier(Modifier::BOLD)
}

/// Label column on the details screen.
pub fn field_label() -> Style {
    Style::default().fg(MALT_GRAY)
}

pub fn field_value() -> Style {
    Style::default().fg(FOAM)
}

pub fn key_hint() -> Style {
    Style::default().fg(MALT_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

/// Placeholder bar colour for a row at `phase` ticks into the animation.
pub fn shimmer(row: usize, phase: usize) -> Style {
    Style::default().fg(SHIMMER[(row + phase) % SHIMMER.len()])
}
