//! Placeholder bars drawn while the first page loads.

use ratatui::text::{Line, Span};

use crate::theme;

const BLOCK: char = '▒';

/// Bar width for placeholder `row`: varies between rows so the list does
/// not look like a solid rectangle.
pub fn bar_width(row: usize, max: u16) -> usize {
    let max = usize::from(max.max(4));
    let widths = [0.55, 0.8, 0.4, 0.7, 0.6];
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let width = (max as f64 * widths[row % widths.len()]) as usize;
    width.max(3)
}

/// One shimmering placeholder line.
pub fn placeholder_line(row: usize, phase: usize, max: u16) -> Line<'static> {
    let bar: String = std::iter::repeat_n(BLOCK, bar_width(row, max)).collect();
    Line::from(Span::styled(bar, theme::shimmer(row, phase)))
}
