//! UI actions. Every state change in the TUI goes through one.

use std::sync::Arc;

use breweryco_core::{BreweriesScreenState, BreweryDetailsUiData, ConnectionType};

use crate::screen::ScreenId;

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Data events (from the view-model and connectivity) ────────
    BreweriesUpdated(Arc<BreweriesScreenState>),
    LoadingChanged(bool),
    LoadingMoreChanged(bool),
    ErrorChanged(Option<String>),
    SelectionChanged(Option<Arc<BreweryDetailsUiData>>),
    ConnectivityChanged(ConnectionType),

    // ── Commands (to the view-model) ──────────────────────────────
    Reload,
    LoadMore,
    OpenBrewery(String),
    CloseDetails,
    DismissError,
}
