// ── Service container ──
//
// Composition root: wires the HTTP client, the connectivity monitor, the
// repository and the use case from one `BreweryConfig`. Front-ends build
// one `Services` per process and ask it for view-models.

use std::sync::Arc;

use breweryco_api::{BreweryClient, TransportConfig};
use tracing::info;

use crate::config::{BreweryConfig, MAX_PAGE_SIZE};
use crate::connectivity::{ConnectivityObserver, NetworkConnectivityMonitor};
use crate::error::CoreError;
use crate::repository::{BreweriesRepository, RemoteBreweriesRepository};
use crate::usecase::GetAllBreweriesUseCase;
use crate::viewmodel::BreweriesViewModel;

pub struct Services {
    config: BreweryConfig,
    client: Arc<BreweryClient>,
    connectivity: Arc<NetworkConnectivityMonitor>,
    get_all_breweries: GetAllBreweriesUseCase,
}

impl Services {
    /// Build every service. Nothing is spawned until [`start`](Self::start).
    pub fn new(config: BreweryConfig) -> Result<Self, CoreError> {
        if config.paging.page_size == 0 || config.paging.page_size > MAX_PAGE_SIZE {
            return Err(CoreError::Config {
                message: format!(
                    "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                    config.paging.page_size
                ),
            });
        }

        let mut transport = TransportConfig::default();
        if let Some(timeout) = config.timeout {
            transport = transport.with_timeout(timeout);
        }
        let client = Arc::new(BreweryClient::new(config.base_url.clone(), &transport)?);
        let connectivity = Arc::new(NetworkConnectivityMonitor::new());

        let repository: Arc<dyn BreweriesRepository> = Arc::new(RemoteBreweriesRepository::new(
            Arc::clone(&client),
            Arc::clone(&connectivity) as Arc<dyn ConnectivityObserver>,
        ));

        Ok(Self {
            config,
            client,
            connectivity,
            get_all_breweries: GetAllBreweriesUseCase::new(repository),
        })
    }

    /// Start background services. Requires a tokio runtime.
    pub fn start(&self) {
        match &self.config.probe {
            Some(probe) => self.connectivity.start(probe.clone()),
            None => info!("connectivity probe disabled"),
        }
    }

    /// Stop background services.
    pub fn shutdown(&self) {
        self.connectivity.stop();
    }

    pub fn client(&self) -> &BreweryClient {
        &self.client
    }

    pub fn connectivity(&self) -> &Arc<NetworkConnectivityMonitor> {
        &self.connectivity
    }

    /// A fresh view-model for one breweries screen session.
    pub fn breweries_view_model(&self) -> BreweriesViewModel {
        BreweriesViewModel::new(self.get_all_breweries.clone(), self.config.paging)
    }
}

impl Drop for Services {
    fn drop(&mut self) {
        self.shutdown();
    }
}
