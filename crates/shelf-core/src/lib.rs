//! Fetch lifecycle controller for catalog-style data sources.
//!
//! - **[`FetchController`]** — owns `Idle -> Loading -> {Success, Failed}`
//!   for one [`FetchSource`]. [`start()`](FetchController::start) is guarded
//!   against re-entrant triggers, every attempt races a deadline, and only
//!   the most recently issued attempt may write state.
//!
//! - **[`classify`]** — turns a [`FetchFailure`] into a [`ClassifiedError`]
//!   with a fixed [`ErrorKind`], a user-facing message and the original
//!   cause.
//!
//! - **Observation** — [`FetchController::subscribe`] delivers every
//!   transition in order; [`FetchController::watch`] gives a coalescing
//!   [`StateStream`] for async consumers.
//!
//! - **Sources** — any async closure, plus [`HttpSource`] (backed by
//!   `shelf-api`) and [`SimulatedSource`].

pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod source;
pub mod state;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::{Cause, ClassifiedError, ErrorKind, classify};
pub use config::{DEFAULT_TIMEOUT_MS, FetchConfig};
pub use controller::{FetchController, FetchControllerBuilder, Subscription};
pub use error::{BoxError, CoreError, FetchFailure};
pub use source::{FetchSource, HttpSource, SimulatedOutcome, SimulatedSource, sample_catalog};
pub use state::FetchState;
pub use stream::{StateStream, StateWatchStream};

// Re-export the wire model so consumers need only one dependency.
pub use shelf_api::{CatalogItem, ItemId, TlsMode, TransportConfig};
