// Catalog HTTP client
//
// Wraps `reqwest::Client` with the catalog endpoint URL and response
// handling. A success response must carry a JSON array of items; anything
// else is surfaced as a typed error for the caller to classify.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::model::CatalogItem;
use crate::transport::TransportConfig;

/// HTTP client for a single catalog endpoint (e.g. `http://localhost:5000/api/products`).
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl CatalogClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(endpoint: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint)?;
        let http = transport.build_client()?;
        Ok(Self { http, endpoint })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(endpoint: &str, http: reqwest::Client) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint)?;
        Ok(Self { http, endpoint })
    }

    /// The catalog endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the full item list.
    pub async fn list_items(&self) -> Result<Vec<CatalogItem>, Error> {
        debug!("GET {}", self.endpoint);

        let resp = self
            .http
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            // The body is best-effort: a broken stream still leaves us the status.
            let body = resp.text().await.ok().filter(|b| !b.is_empty());
            debug!(status = status.as_u16(), "catalog endpoint returned error status");
            return Err(Error::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
                body,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        let items: Vec<CatalogItem> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        debug!(count = items.len(), "catalog fetched");
        Ok(items)
    }
}
