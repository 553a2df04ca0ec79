//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use breweryco_core::{BreweriesViewModel, ConnectionType, ConnectivityObserver, Services};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::{BridgeSources, run_data_bridge};
use crate::event::{Event, EventReader, Rates};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::status_indicator;

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    view_model: BreweriesViewModel,
    connection: ConnectionType,
    /// Rows with a name, for the status bar.
    row_count: usize,
    /// Message shown in the error dialog; blocks other input while set.
    error: Option<String>,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
    bridge_sources: Option<BridgeSources>,
}

impl App {
    pub fn new(services: &Services) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let view_model = services.breweries_view_model();
        let bridge_sources = BridgeSources::new(&view_model, services.connectivity().observe());

        let mut screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();
        if let Some(screen) = screens.get_mut(&ScreenId::Breweries) {
            screen.set_focused(true);
        }

        Self {
            active_screen: ScreenId::Breweries,
            screens,
            running: true,
            view_model,
            connection: services.connectivity().connection_type(),
            row_count: 0,
            error: None,
            help_visible: false,
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
            bridge_sources: Some(bridge_sources),
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        let (w, h) = tui.size().unwrap_or((80, 24));
        debug!(width = w, height = h, "terminal ready");

        if let Some(sources) = self.bridge_sources.take() {
            tokio::spawn(run_data_bridge(
                sources,
                self.action_tx.clone(),
                self.cancel.child_token(),
            ));
        }

        let mut events = EventReader::spawn(Rates::default(), &self.cancel);
        self.view_model.on_collecting_started();
        info!("TUI event loop started");

        while self.running {
            // Bridge actions queue up between events; ticks drain them.
            let Some(event) = events.next().await else {
                break;
            };
            self.handle_event(event)?;

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.view_model.close();
        self.cancel.cancel();
        info!("TUI event loop ended");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let action = match event {
            Event::Key(key) => self.handle_key_event(key)?,
            Event::Resize(w, h) => Some(Action::Resize(w, h)),
            Event::Tick => Some(Action::Tick),
            Event::Render => Some(Action::Render),
        };
        if let Some(action) = action {
            self.action_tx.send(action)?;
        }
        Ok(())
    }

    /// Map a key event to an action. Dialogs and global keys come first;
    /// anything else goes to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.error.is_some() {
            return Ok(match key.code {
                KeyCode::Enter | KeyCode::Esc => Some(Action::DismissError),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match key.code {
            KeyCode::Char('q') => return Ok(Some(Action::Quit)),
            KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
            KeyCode::Esc => return Ok(Some(Action::GoBack)),
            _ => {}
        }

        match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        self.active_screen = target;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    /// Send `action` to one screen and queue its follow-up, if any.
    fn forward(&mut self, id: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&id) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render | Action::Resize(..) => {}
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::SwitchScreen(target) => self.switch_to(*target),

            Action::GoBack => {
                if self.active_screen == ScreenId::Details {
                    self.action_tx.send(Action::CloseDetails)?;
                }
            }

            // ── Commands ─────────────────────────────────────────────
            Action::Reload => {
                self.view_model.on_collecting_started();
                self.forward(ScreenId::Breweries, action)?;
            }
            Action::LoadMore => self.view_model.on_load_more_triggered(),
            Action::OpenBrewery(key) => {
                if !self.view_model.select_brewery(key) {
                    debug!(key = %key, "selected row has no brewery behind it");
                }
            }
            Action::CloseDetails => self.view_model.clear_selection(),
            Action::DismissError => self.view_model.clear_error(),

            // ── Data events ──────────────────────────────────────────
            Action::ConnectivityChanged(connection) => self.connection = *connection,
            Action::ErrorChanged(message) => {
                self.error.clone_from(message);
                self.forward(ScreenId::Breweries, action)?;
            }
            Action::SelectionChanged(details) => {
                self.forward(ScreenId::Details, action)?;
                let target = if details.is_some() {
                    ScreenId::Details
                } else {
                    ScreenId::Breweries
                };
                self.switch_to(target);
            }
            Action::BreweriesUpdated(state) => {
                self.row_count = state.real_rows();
                self.forward(ScreenId::Breweries, action)?;
            }
            Action::LoadingChanged(_) | Action::LoadingMoreChanged(_) | Action::Tick => {
                self.forward(ScreenId::Breweries, action)?;
            }
        }

        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_status_bar(frame, layout[1]);

        if self.help_visible {
            render_help_overlay(frame, area);
        }
        if let Some(message) = &self.error {
            render_error_dialog(frame, area, message);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::raw(" "),
            status_indicator::connection_span(self.connection),
            Span::styled(
                format!(" │ {} breweries │ page {}", self.row_count, self.view_model.current_page()),
                theme::key_hint(),
            ),
            Span::styled(" │ ? help  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Rect of at most `width` x `height`, centred in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn render_error_dialog(frame: &mut Frame, area: Rect, message: &str) {
    let dialog = centered(area, 56, 7);
    frame.render_widget(Clear, dialog);

    let block = Block::default()
        .title(" Something went wrong ")
        .title_style(Style::default().fg(theme::CHERRY_RED))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::CHERRY_RED))
        .style(Style::default().bg(theme::STOUT));

    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let text = vec![
        Line::from(Span::styled(format!(" {message}"), theme::field_value())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Enter ", theme::key_hint_key()),
            Span::styled("ok", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help = centered(area, 44, 12);
    frame.render_widget(Clear, help);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::STOUT));

    let inner = block.inner(help);
    frame.render_widget(block, help);

    let rows = [
        ("j/k ↑/↓", "Move up/down"),
        ("g/G", "Top / bottom"),
        ("Ctrl+d/u", "Page down / up"),
        ("Enter", "Open details"),
        ("Esc", "Back"),
        ("r", "Reload from page 1"),
        ("q", "Quit"),
    ];
    let mut lines = vec![Line::from("")];
    lines.extend(rows.iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(*desc, theme::key_hint()),
        ])
    }));
    frame.render_widget(Paragraph::new(lines), inner);
}
