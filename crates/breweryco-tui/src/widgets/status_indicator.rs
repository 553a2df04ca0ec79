//! Connectivity indicator: ● connected, ○ offline.

use ratatui::style::Style;
use ratatui::text::Span;

use breweryco_core::ConnectionType;

use crate::theme;

pub fn connection_span(connection: ConnectionType) -> Span<'static> {
    let (symbol, color) = if connection.is_connected() {
        ("●", theme::HOPS_GREEN)
    } else {
        ("○", theme::CHERRY_RED)
    };
    Span::styled(
        format!("{symbol} {}", connection.label()),
        Style::default().fg(color),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn offline_uses_hollow_dot() {
        assert_eq!(connection_span(ConnectionType::NoInternet).content, "○ offline");
        assert_eq!(connection_span(ConnectionType::Wifi).content, "● wifi");
    }
}
