// ── Core error types ──
//
// Errors surfaced by the repository and view-models. Transport failures
// keep the original `breweryco_api::Error` as their source so callers can
// still inspect status codes and bodies.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connectivity ─────────────────────────────────────────────────
    #[error("No internet connection")]
    NoConnectivity,

    // ── Remote source ────────────────────────────────────────────────
    /// Any failure talking to or decoding from the remote source.
    #[error("{0}")]
    Transport(#[source] breweryco_api::Error),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<breweryco_api::Error> for CoreError {
    fn from(err: breweryco_api::Error) -> Self {
        Self::Transport(err)
    }
}

impl CoreError {
    /// The underlying API error, if this failure came from the remote source.
    pub fn api_error(&self) -> Option<&breweryco_api::Error> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}
