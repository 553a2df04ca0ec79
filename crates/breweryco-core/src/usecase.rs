// ── Use cases ──

use std::sync::Arc;

use futures_util::stream::BoxStream;

use crate::model::ApiResult;
use crate::repository::BreweriesRepository;

/// Fetch one page of breweries.
#[derive(Clone)]
pub struct GetAllBreweriesUseCase {
    repository: Arc<dyn BreweriesRepository>,
}

impl GetAllBreweriesUseCase {
    pub fn new(repository: Arc<dyn BreweriesRepository>) -> Self {
        Self { repository }
    }

    /// Returns the repository stream unchanged.
    pub fn invoke(&self, page: u32, page_size: u32) -> BoxStream<'static, ApiResult> {
        self.repository.get_breweries(page, page_size)
    }
}
