// ── Fetch sources ──
//
// The controller only knows `FetchSource`. Any async closure qualifies;
// `HttpSource` and `SimulatedSource` are the two concrete catalog sources.

use std::future::Future;
use std::time::Duration;

use futures_util::future::BoxFuture;
use shelf_api::{CatalogClient, CatalogItem, TransportConfig};
use tracing::debug;

use crate::error::{CoreError, FetchFailure};

/// An asynchronous operation producing the full item list.
///
/// Each call starts a fresh operation. The returned future must be
/// `'static`: the controller may abandon it on timeout.
pub trait FetchSource<T>: Send + Sync + 'static {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<T>, FetchFailure>>;
}

impl<T, F, Fut> FetchSource<T> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, FetchFailure>> + Send + 'static,
{
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<T>, FetchFailure>> {
        Box::pin(self())
    }
}

// ── HttpSource ───────────────────────────────────────────────────────

/// Fetches the catalog from an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: CatalogClient,
}

impl HttpSource {
    pub fn new(endpoint: &str, transport: &TransportConfig) -> Result<Self, CoreError> {
        Ok(Self {
            client: CatalogClient::new(endpoint, transport)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint().as_str()
    }
}

impl FetchSource<CatalogItem> for HttpSource {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<CatalogItem>, FetchFailure>> {
        let client = self.client.clone();
        Box::pin(async move { client.list_items().await.map_err(FetchFailure::from) })
    }
}

// ── SimulatedSource ──────────────────────────────────────────────────

const SIMULATED_FAILURE: &str = "Cannot reach server. Please check your internet connection.";

/// What a [`SimulatedSource`] resolves to once its delay has passed.
#[derive(Debug, Clone)]
pub enum SimulatedOutcome {
    Catalog(Vec<CatalogItem>),
    Unreachable,
}

/// In-process catalog with an artificial network delay.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    delay: Duration,
    outcome: SimulatedOutcome,
}

impl SimulatedSource {
    /// The sample catalog after a one second delay.
    pub fn new() -> Self {
        Self {
            delay: Duration::from_secs(1),
            outcome: SimulatedOutcome::Catalog(sample_catalog()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail every fetch with a simulated connection failure.
    pub fn failing(mut self) -> Self {
        self.outcome = SimulatedOutcome::Unreachable;
        self
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchSource<CatalogItem> for SimulatedSource {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<CatalogItem>, FetchFailure>> {
        let delay = self.delay;
        let outcome = self.outcome.clone();
        Box::pin(async move {
            debug!(delay_ms = delay.as_millis(), "simulating network delay");
            tokio::time::sleep(delay).await;
            match outcome {
                SimulatedOutcome::Catalog(items) => Ok(items),
                SimulatedOutcome::Unreachable => Err(FetchFailure::connect(SIMULATED_FAILURE)),
            }
        })
    }
}

/// The eight-item demo catalog.
pub fn sample_catalog() -> Vec<CatalogItem> {
    const IMAGE_BASE: &str =
        "https://tailwindcss.com/plus-assets/img/ecommerce-images/category-page-04-image-card";

    let entries: [(&str, &str, &str); 8] = [
        ("Earthen Bottle", "48R", "Porcelain bottle"),
        ("Nomad Tumbler", "35R", "Green insulated bottle"),
        ("Focus Paper Refill", "89R", "Paper card"),
        ("Machined Mechanical Pencil", "35R", "Mechanical pencil"),
        ("Focus Card Tray", "64R", "Card holder tray"),
        ("Focus Multi-Pack", "39R", "Pack of refills"),
        ("Brass Scissors", "50R", "Stylish scissors"),
        ("Focus Carry Pouch", "32R", "Felt pouch"),
    ];

    (1_i64..)
        .zip(entries)
        .map(|(id, (name, price, alt))| {
            CatalogItem::new(id)
                .with("name", name)
                .with("href", "#")
                .with("price", price)
                .with("imageSrc", format!("{IMAGE_BASE}-{id:02}.jpg"))
                .with("imageAlt", alt)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shelf_api::ItemId;

    #[test]
    fn sample_catalog_shape() {
        let items = sample_catalog();
        assert_eq!(items.len(), 8);
        assert_eq!(items[0].id, ItemId::Number(1));
        assert_eq!(items[7].name(), Some("Focus Carry Pouch"));
        assert_eq!(
            items[1].image_src(),
            Some("https://tailwindcss.com/plus-assets/img/ecommerce-images/category-page-04-image-card-02.jpg")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_source_waits_then_resolves() {
        let source = SimulatedSource::new().with_delay(Duration::from_millis(1000));
        let start = tokio::time::Instant::now();
        let items = source.fetch().await.unwrap();
        assert_eq!(items.len(), 8);
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_failure_is_connect() {
        let source = SimulatedSource::new().failing();
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, FetchFailure::Connect { .. }));
        assert_eq!(err.to_string(), SIMULATED_FAILURE);
    }

    #[tokio::test]
    async fn closures_are_sources() {
        let source = || async { Ok::<_, FetchFailure>(vec![1u32, 2, 3]) };
        assert_eq!(source.fetch().await.unwrap(), vec![1, 2, 3]);
    }
}
