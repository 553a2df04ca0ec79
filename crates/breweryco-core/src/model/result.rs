// ── Network result envelope ──

use std::sync::Arc;

use super::brewery::Brewery;
use crate::error::CoreError;

/// One emission of a fetch stream.
///
/// A fetch yields at most one `Loading` followed by exactly one terminal
/// variant. Consumers must match all four: `Offline` has no producer yet
/// but carries cached rows when one exists.
#[derive(Debug, Clone)]
pub enum ApiResult {
    Loading,
    Success(Vec<Brewery>),
    Error(Arc<CoreError>),
    Offline {
        error: Arc<CoreError>,
        cached: Vec<Brewery>,
    },
}

impl ApiResult {
    pub fn error(err: impl Into<CoreError>) -> Self {
        Self::Error(Arc::new(err.into()))
    }

    /// `true` for every variant except `Loading`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}
