// ── Reactive state streams ──
//
// Watch-based view of a controller's state for async consumers.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::state::FetchState;

/// A subscription to the latest [`FetchState`] of a controller.
///
/// Provides both point-in-time snapshot access and change notification via
/// [`changed()`](Self::changed) or by converting to a `Stream`. Rapid
/// transitions may be coalesced; use
/// [`FetchController::subscribe`](crate::FetchController::subscribe) to
/// observe every one.
pub struct StateStream<T: Clone + Send + Sync + 'static> {
    current: FetchState<T>,
    receiver: watch::Receiver<FetchState<T>>,
}

impl<T: Clone + Send + Sync + 'static> StateStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<FetchState<T>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The state captured at creation or at the last `changed()`.
    pub fn current(&self) -> &FetchState<T> {
        &self.current
    }

    /// The latest state (may have changed since creation).
    pub fn latest(&self) -> FetchState<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new state.
    /// Returns `None` once the controller and its in-flight attempt are gone.
    pub async fn changed(&mut self) -> Option<FetchState<T>> {
        self.receiver.changed().await.ok()?;
        let state = self.receiver.borrow_and_update().clone();
        self.current = state.clone();
        Some(state)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    /// The first item is the state at conversion time.
    pub fn into_stream(self) -> StateWatchStream<T> {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct StateWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<FetchState<T>>,
}

impl<T: Clone + Send + Sync + 'static> Stream for StateWatchStream<T> {
    type Item = FetchState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream is Unpin, so projecting through `&mut` is fine.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
