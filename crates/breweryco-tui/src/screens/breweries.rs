//! Breweries screen: the paged list with infinite scroll.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::{Throbber, ThrobberState};

use breweryco_core::BreweriesScreenState;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::shimmer;

/// Rows from the end at which the next page is requested.
const LOAD_MORE_THRESHOLD: usize = 5;
const PAGE_JUMP: isize = 10;

pub struct BreweriesScreen {
    focused: bool,
    state: Arc<BreweriesScreenState>,
    loading: bool,
    loading_more: bool,
    table_state: TableState,
    throbber_state: ThrobberState,
    phase: usize,
    /// Last-row key that already fired a load-more.
    requested_after: Option<String>,
}

impl BreweriesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            state: Arc::new(BreweriesScreenState::default()),
            loading: false,
            loading_more: false,
            table_state: TableState::default(),
            throbber_state: ThrobberState::default(),
            phase: 0,
            requested_after: None,
        }
    }

    fn row_count(&self) -> usize {
        self.state.breweries.len()
    }

    fn has_placeholders(&self) -> bool {
        self.state.breweries.iter().any(|r| r.is_placeholder())
    }

    fn select(&mut self, index: usize) -> Option<Action> {
        let len = self.row_count();
        if len == 0 {
            self.table_state.select(None);
            return None;
        }
        self.table_state.select(Some(index.min(len - 1)));
        self.load_more_if_near_end()
    }

    fn move_by(&mut self, delta: isize) -> Option<Action> {
        let current = self.table_state.selected().unwrap_or(0);
        self.select(current.saturating_add_signed(delta))
    }

    /// Fire a load-more once per distinct last row, when the selection is
    /// close to the end of a fully loaded list.
    fn load_more_if_near_end(&mut self) -> Option<Action> {
        let selected = self.table_state.selected()?;
        if self.loading || self.has_placeholders() {
            return None;
        }
        if selected + LOAD_MORE_THRESHOLD < self.row_count() {
            return None;
        }

        let last = self.state.last_key()?;
        if self.requested_after.as_deref() == Some(last) {
            return None;
        }
        self.requested_after = Some(last.to_owned());
        Some(Action::LoadMore)
    }

    fn selected_key(&self) -> Option<&str> {
        let row = self.state.breweries.get(self.table_state.selected()?)?;
        (!row.is_placeholder()).then_some(row.key.as_str())
    }

    fn set_state(&mut self, state: Arc<BreweriesScreenState>) -> Option<Action> {
        self.state = state;
        let len = self.row_count();
        match self.table_state.selected() {
            _ if len == 0 => {
                self.table_state.select(None);
                None
            }
            None => {
                self.table_state.select(Some(0));
                None
            }
            Some(i) if i >= len => self.select(len - 1),
            // Rows may have arrived while already sitting at the end.
            Some(_) => self.load_more_if_near_end(),
        }
    }

    fn render_rows(&self, frame: &mut Frame, area: Rect) {
        let name_width = area.width.saturating_sub(8);
        let rows: Vec<Row> = self
            .state
            .breweries
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let name = if row.is_placeholder() {
                    shimmer::placeholder_line(i, self.phase, name_width)
                } else {
                    Line::from(Span::styled(row.name.clone(), theme::table_row()))
                };
                Row::new(vec![
                    Cell::from(Span::styled(format!("{:>5}", i + 1), theme::key_hint())),
                    Cell::from(name),
                ])
            })
            .collect();

        let header = Row::new(vec![
            Cell::from(Span::styled("    #", theme::table_header())),
            Cell::from(Span::styled("Name", theme::table_header())),
        ]);

        let table = Table::new(rows, [Constraint::Length(6), Constraint::Min(10)])
            .header(header)
            .row_highlight_style(theme::table_selected())
            .highlight_symbol("▸ ");

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        if self.loading_more {
            let throbber = Throbber::default()
                .label(" Loading more breweries...")
                .style(Style::default().fg(theme::FOAM))
                .throbber_style(Style::default().fg(theme::AMBER));
            frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
            return;
        }

        let hints = Line::from(vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("details  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("reload", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), area);
    }
}

impl Component for BreweriesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match (key.modifiers, key.code) {
            (_, KeyCode::Char('j') | KeyCode::Down) => self.move_by(1),
            (_, KeyCode::Char('k') | KeyCode::Up) => self.move_by(-1),
            (KeyModifiers::CONTROL, KeyCode::Char('d')) | (_, KeyCode::PageDown) => {
                self.move_by(PAGE_JUMP)
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) | (_, KeyCode::PageUp) => {
                self.move_by(-PAGE_JUMP)
            }
            (_, KeyCode::Char('g') | KeyCode::Home) => self.select(0),
            (_, KeyCode::Char('G') | KeyCode::End) => self.select(usize::MAX),
            (_, KeyCode::Enter) => self
                .selected_key()
                .map(|key| Action::OpenBrewery(key.to_owned())),
            (_, KeyCode::Char('r')) => Some(Action::Reload),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        let follow_up = match action {
            Action::BreweriesUpdated(state) => self.set_state(Arc::clone(state)),
            Action::LoadingChanged(loading) => {
                self.loading = *loading;
                None
            }
            Action::LoadingMoreChanged(loading_more) => {
                self.loading_more = *loading_more;
                // A finished page may have added nothing new; the next move
                // near the end asks again.
                if !*loading_more {
                    self.requested_after = None;
                }
                None
            }
            // A failed page can be requested again by scrolling.
            Action::ErrorChanged(Some(_)) => {
                self.requested_after = None;
                None
            }
            Action::Reload => {
                self.requested_after = None;
                self.table_state.select(None);
                None
            }
            Action::Tick => {
                self.phase = self.phase.wrapping_add(1);
                if self.loading_more {
                    self.throbber_state.calc_next();
                }
                None
            }
            _ => None,
        };
        Ok(follow_up)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let real = self.state.real_rows();
        let title = if self.loading && real == 0 {
            " Breweries (loading) ".to_owned()
        } else {
            format!(" Breweries ({real}) ")
        };

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

        if self.state.breweries.is_empty() && !self.loading {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  No breweries yet. Press r to reload.",
                    theme::key_hint(),
                )),
                layout[0],
            );
        } else {
            self.render_rows(frame, layout[0]);
        }
        self.render_footer(frame, layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
