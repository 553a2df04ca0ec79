// ── Breweries repository ──
//
// Turns one page request into a lazy stream of `ApiResult`s. Each call
// builds a fresh stream; nothing runs until it is polled. Connectivity is
// read once, when the stream starts.

use std::future::Future;
use std::sync::Arc;

use async_stream::stream;
use breweryco_api::{BreweryClient, BreweryDto};
use futures_util::stream::BoxStream;
use tracing::{debug, warn};

use crate::connectivity::{ConnectionType, ConnectivityObserver};
use crate::convert::breweries_from_page;
use crate::error::CoreError;
use crate::model::ApiResult;

/// A remote source of brewery pages.
pub trait BreweryDataSource: Send + Sync + 'static {
    fn get_breweries(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<BreweryDto>, breweryco_api::Error>> + Send;
}

impl BreweryDataSource for BreweryClient {
    fn get_breweries(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<BreweryDto>, breweryco_api::Error>> + Send {
        self.list_breweries(page, page_size)
    }
}

/// Paged access to breweries.
pub trait BreweriesRepository: Send + Sync {
    /// Stream the fetch of one page: an optional `Loading` followed by
    /// exactly one terminal result.
    fn get_breweries(&self, page: u32, page_size: u32) -> BoxStream<'static, ApiResult>;
}

/// Repository backed by a remote data source, gated on connectivity.
pub struct RemoteBreweriesRepository<S> {
    remote: Arc<S>,
    connectivity: Arc<dyn ConnectivityObserver>,
}

impl<S: BreweryDataSource> RemoteBreweriesRepository<S> {
    pub fn new(remote: Arc<S>, connectivity: Arc<dyn ConnectivityObserver>) -> Self {
        Self {
            remote,
            connectivity,
        }
    }
}

impl<S: BreweryDataSource> BreweriesRepository for RemoteBreweriesRepository<S> {
    fn get_breweries(&self, page: u32, page_size: u32) -> BoxStream<'static, ApiResult> {
        let remote = Arc::clone(&self.remote);
        let connectivity = Arc::clone(&self.connectivity);

        Box::pin(stream! {
            if connectivity.connection_type() == ConnectionType::NoInternet {
                debug!(page, "skipping fetch while offline");
                yield ApiResult::error(CoreError::NoConnectivity);
            } else {
                yield ApiResult::Loading;

                match remote.get_breweries(page, page_size).await {
                    Ok(records) => {
                        let breweries = breweries_from_page(records);
                        debug!(page, count = breweries.len(), "fetched breweries");
                        yield ApiResult::Success(breweries);
                    }
                    Err(e) => {
                        warn!(page, error = %e, "brewery fetch failed");
                        yield ApiResult::error(e);
                    }
                }
            }
        })
    }
}
