//! Domain layer between `breweryco-api` and UI front-ends.
//!
//! This crate owns the domain model, the paging logic and the reactive
//! state the screens render:
//!
//! - **[`BreweriesRepository`]**: turns a page request into a lazy stream
//!   of [`ApiResult`]s (`Loading` then one terminal value), gated on the
//!   current connectivity and deduplicated by brewery id.
//!
//! - **[`GetAllBreweriesUseCase`]**: the single entry point view-models use
//!   to fetch a page.
//!
//! - **[`BreweriesViewModel`]**: folds fetch results into an append-only
//!   row list exposed through `tokio::sync::watch` receivers, with
//!   placeholder rows, infinite scroll, error overlay and a details
//!   selection.
//!
//! - **[`NetworkConnectivityMonitor`]**: process-wide connectivity state
//!   with an optional TCP reachability probe.
//!
//! - **[`Services`]**: builds all of the above from a [`BreweryConfig`].

pub mod config;
pub mod connectivity;
pub mod convert;
pub mod error;
pub mod model;
pub mod repository;
pub mod services;
pub mod usecase;
pub mod viewmodel;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BreweryConfig, MAX_PAGE_SIZE, PagingConfig, ProbeConfig};
pub use connectivity::{
    ConnectionType, ConnectivityObserver, ConnectivityStream, NetworkConnectivityMonitor,
};
pub use error::CoreError;
pub use model::{ApiResult, Brewery, BreweryType};
pub use repository::{BreweriesRepository, BreweryDataSource, RemoteBreweriesRepository};
pub use services::Services;
pub use usecase::GetAllBreweriesUseCase;
pub use viewmodel::{
    BreweriesScreenState, BreweriesViewModel, BreweryDetailsUiData, BreweryUiData,
};
