// Open Brewery DB HTTP client
//
// Wraps `reqwest::Client` with URL construction and response decoding.
// All methods return decoded payloads; status and decode failures are
// surfaced as typed `Error` variants with the raw body attached.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::BreweryDto;
use crate::transport::TransportConfig;

/// Raw HTTP client for the Open Brewery DB API.
pub struct BreweryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BreweryClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` is the API root (e.g. `https://api.openbrewerydb.org`);
    /// the `/v1/...` paths are appended per request.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List one page of breweries.
    ///
    /// `GET /v1/breweries?page={page}&per_page={per_page}`
    pub async fn list_breweries(&self, page: u32, per_page: u32) -> Result<Vec<BreweryDto>, Error> {
        let mut url = self.api_url("breweries")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());
        debug!(page, per_page, "listing breweries");
        self.get(url).await
    }

    /// Fetch a single brewery by id.
    ///
    /// `GET /v1/breweries/{id}`
    pub async fn get_brewery(&self, id: &str) -> Result<BreweryDto, Error> {
        let mut url = self.api_url("breweries")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);
        debug!(id, "fetching brewery");
        self.get(url).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/v1/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}/v1/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
