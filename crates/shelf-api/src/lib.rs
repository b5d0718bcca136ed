// shelf-api: Async HTTP client for product catalog endpoints

pub mod client;
pub mod error;
pub mod model;
pub mod transport;

pub use client::CatalogClient;
pub use error::Error;
pub use model::{CatalogItem, ItemId};
pub use transport::{TlsMode, TransportConfig};
