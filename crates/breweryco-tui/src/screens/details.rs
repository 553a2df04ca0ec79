//! Details screen for the selected brewery.

use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use breweryco_core::BreweryDetailsUiData;

use crate::action::Action;
use crate::component::Component;
use crate::theme;

const MISSING: &str = "—";

pub struct DetailsScreen {
    focused: bool,
    details: Option<Arc<BreweryDetailsUiData>>,
}

impl DetailsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            details: None,
        }
    }
}

/// Label/value pairs in display order.
fn fields(details: &BreweryDetailsUiData) -> Vec<(&'static str, String)> {
    let or_missing = |v: Option<&str>| {
        v.filter(|s| !s.trim().is_empty())
            .unwrap_or(MISSING)
            .to_owned()
    };

    vec![
        ("Type", details.type_label().to_owned()),
        ("Address", or_missing(details.address.as_deref())),
        ("Location", or_missing(details.location.as_deref())),
        ("Phone", or_missing(details.phone.as_deref())),
        ("Website", or_missing(details.website.as_deref())),
        (
            "Coordinates",
            details
                .coordinates
                .map_or_else(|| MISSING.to_owned(), |(lat, lon)| format!("{lat:.5}, {lon:.5}")),
        ),
    ]
}

impl Component for DetailsScreen {
    fn update(&mut self, action: &Action) -> color_eyre::eyre::Result<Option<Action>> {
        if let Action::SelectionChanged(details) = action {
            self.details.clone_from(details);
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = self
            .details
            .as_ref()
            .map_or_else(|| " Brewery ".to_owned(), |d| format!(" {} ", d.name));

        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        let lines: Vec<Line> = match &self.details {
            Some(details) => {
                let mut lines = vec![Line::from("")];
                lines.extend(fields(details).into_iter().map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("  {label:<13}"), theme::field_label()),
                        Span::styled(value, theme::field_value()),
                    ])
                }));
                lines
            }
            None => vec![Line::from(Span::styled("  Nothing selected", theme::key_hint()))],
        };
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), layout[0]);

        let hints = Line::from(vec![
            Span::styled(" Esc ", theme::key_hint_key()),
            Span::styled("back", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
