// ── Fetch controller ──
//
// Owns the lifecycle state of one fetch source: issues attempts, races them
// against the configured deadline, classifies failures and publishes every
// transition to listeners and watchers.
//
// Lock order: `issued` -> `dispatch`. `registry` is never held together
// with either.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classify::{ClassifiedError, classify};
use crate::config::FetchConfig;
use crate::source::FetchSource;
use crate::state::FetchState;
use crate::stream::StateStream;

type Listener<T> = Arc<dyn Fn(&FetchState<T>) + Send + Sync>;

// ── FetchController ──────────────────────────────────────────────

/// Drives a [`FetchSource`] through `Idle -> Loading -> {Success, Failed}`.
///
/// The controller has a single owner. Dropping it abandons any in-flight
/// attempt (nothing is written afterwards) and releases every listener.
///
/// `start`/`retry` spawn onto the current Tokio runtime and must be called
/// from within one; so must construction when `auto_start` is set.
pub struct FetchController<T: Clone + Send + Sync + 'static> {
    inner: Arc<Inner<T>>,
}

struct Inner<T: Clone + Send + Sync + 'static> {
    source: Box<dyn FetchSource<T>>,
    config: FetchConfig,
    /// Highest attempt number issued so far. Every state write happens
    /// while holding this lock.
    issued: Mutex<u32>,
    state: watch::Sender<FetchState<T>>,
    /// Last transition every listener has seen, tagged with its sequence
    /// number. `settled` waits on this rather than on `state`.
    delivered: watch::Sender<(u64, FetchState<T>)>,
    registry: Arc<Mutex<Registry<T>>>,
    dispatch: Mutex<Dispatch<T>>,
    cancel: CancellationToken,
}

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Transitions waiting to be delivered to listeners, in order.
struct Dispatch<T> {
    /// Sequence number of the most recently published transition.
    published: u64,
    queue: VecDeque<(u64, FetchState<T>)>,
    draining: bool,
}

impl<T: Clone + Send + Sync + 'static> FetchController<T> {
    /// Create a controller. Begins loading immediately if
    /// [`FetchConfig::auto_start`] is set.
    pub fn new(source: impl FetchSource<T>, config: FetchConfig) -> Self {
        Self::builder(source).config(config).build()
    }

    /// Start building a controller, e.g. to register listeners that must
    /// observe the auto-start transition.
    pub fn builder(source: impl FetchSource<T>) -> FetchControllerBuilder<T> {
        FetchControllerBuilder {
            source: Box::new(source),
            config: FetchConfig::default(),
            listeners: Vec::new(),
        }
    }

    /// Begin a new attempt.
    ///
    /// A no-op returning `false` while an attempt is in flight, or when
    /// called outside a Tokio runtime. Otherwise transitions to
    /// `Loading { attempt: previous + 1 }`, spawns the fetch and returns
    /// `true` without waiting for it.
    pub fn start(&self) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no Tokio runtime available, fetch not started");
            return false;
        };
        let Some(attempt) = self.inner.begin() else {
            debug!(
                attempt = self.attempt(),
                "fetch already in flight, ignoring start"
            );
            return false;
        };

        info!(attempt, "starting fetch");
        runtime.spawn(Arc::clone(&self.inner).run_attempt(attempt));
        true
    }

    /// Same as [`start`](Self::start). Legal from `Failed` and `Success`.
    pub fn retry(&self) -> bool {
        self.start()
    }

    /// Same as [`start`](Self::start), named for the re-fetch-after-success case.
    pub fn refetch(&self) -> bool {
        self.start()
    }

    /// Current state, by value.
    pub fn snapshot(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    /// Highest attempt number issued so far (0 before the first start).
    pub fn attempt(&self) -> u32 {
        *lock(&self.inner.issued)
    }

    pub fn config(&self) -> &FetchConfig {
        &self.inner.config
    }

    /// Register a listener invoked once per transition, in transition order.
    ///
    /// The listener is removed when the returned [`Subscription`] is
    /// cancelled or dropped. Listeners may call [`retry`](Self::retry);
    /// the resulting transition is delivered after the current one.
    pub fn subscribe(
        &self,
        listener: impl Fn(&FetchState<T>) + Send + Sync + 'static,
    ) -> Subscription {
        let id = {
            let mut registry = lock(&self.inner.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::new(listener)));
            id
        };

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.inner.registry);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    lock(&registry).listeners.retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    /// Watch the latest state asynchronously.
    ///
    /// Unlike [`subscribe`](Self::subscribe), a watcher only ever sees the
    /// most recent state and may skip intermediate ones.
    pub fn watch(&self) -> StateStream<T> {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Wait until the state is not `Loading` and return it.
    ///
    /// Returns immediately when no attempt is in flight, including `Idle`.
    /// The returned state has already been delivered to every listener.
    pub async fn settled(&self) -> FetchState<T> {
        let mut rx = self.inner.delivered.subscribe();
        let target = lock(&self.inner.dispatch).published;
        let result = rx
            .wait_for(|(seq, state)| *seq >= target && !state.is_loading())
            .await
            .map(|delivered| delivered.1.clone());
        result.unwrap_or_else(|_| self.snapshot())
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for FetchController<T> {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
        lock(&self.inner.registry).listeners.clear();
    }
}

impl<T: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for FetchController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchController")
            .field("config", &self.inner.config)
            .field("attempt", &self.attempt())
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

// ── Builder ──────────────────────────────────────────────────────

/// Builder for [`FetchController`].
pub struct FetchControllerBuilder<T: Clone + Send + Sync + 'static> {
    source: Box<dyn FetchSource<T>>,
    config: FetchConfig,
    listeners: Vec<Listener<T>>,
}

impl<T: Clone + Send + Sync + 'static> FetchControllerBuilder<T> {
    pub fn config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a listener that lives as long as the controller.
    pub fn on_transition(
        mut self,
        listener: impl Fn(&FetchState<T>) + Send + Sync + 'static,
    ) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn build(self) -> FetchController<T> {
        let (state, _) = watch::channel(FetchState::Idle);
        let (delivered, _) = watch::channel((0, FetchState::Idle));
        let next_id = u64::try_from(self.listeners.len()).unwrap_or(u64::MAX);
        let listeners = (0..).zip(self.listeners).collect();

        let controller = FetchController {
            inner: Arc::new(Inner {
                source: self.source,
                config: self.config,
                issued: Mutex::new(0),
                state,
                delivered,
                registry: Arc::new(Mutex::new(Registry { next_id, listeners })),
                dispatch: Mutex::new(Dispatch {
                    published: 0,
                    queue: VecDeque::new(),
                    draining: false,
                }),
                cancel: CancellationToken::new(),
            }),
        };

        if self.config.auto_start() {
            controller.start();
        }
        controller
    }
}

// ── State machine internals ──────────────────────────────────────

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    /// Issue a new attempt unless one is in flight.
    fn begin(&self) -> Option<u32> {
        let attempt = {
            let mut issued = lock(&self.issued);
            if self.state.borrow().is_loading() {
                return None;
            }
            *issued = issued.saturating_add(1);
            self.publish(FetchState::Loading { attempt: *issued });
            *issued
        };
        self.drain();
        Some(attempt)
    }

    /// Write a settlement, unless `attempt` is stale or already settled.
    fn settle(&self, attempt: u32, next: FetchState<T>) -> bool {
        {
            let issued = lock(&self.issued);
            let in_flight =
                matches!(*self.state.borrow(), FetchState::Loading { attempt: a } if a == attempt);
            if *issued != attempt || !in_flight {
                debug!(
                    attempt,
                    latest = *issued,
                    "discarding stale settlement"
                );
                return false;
            }
            self.publish(next);
        }
        self.drain();
        true
    }

    /// Caller holds `issued`.
    fn publish(&self, next: FetchState<T>) {
        debug!(state = next.label(), attempt = ?next.attempt(), "fetch state transition");
        self.state.send_replace(next.clone());
        let mut dispatch = lock(&self.dispatch);
        dispatch.published += 1;
        let seq = dispatch.published;
        dispatch.queue.push_back((seq, next));
    }

    /// Deliver queued transitions. Only one caller drains at a time; a
    /// transition queued by a listener is picked up by the active drainer.
    fn drain(&self) {
        {
            let mut dispatch = lock(&self.dispatch);
            if dispatch.draining {
                return;
            }
            dispatch.draining = true;
        }

        loop {
            let (seq, next) = {
                let mut dispatch = lock(&self.dispatch);
                if let Some(entry) = dispatch.queue.pop_front() {
                    entry
                } else {
                    dispatch.draining = false;
                    return;
                }
            };

            let listeners: Vec<Listener<T>> = lock(&self.registry)
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();

            for listener in listeners {
                let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| (*listener)(&next)));
                if let Err(panic) = outcome {
                    warn!(
                        panic = panic_message(panic.as_ref()),
                        "state listener panicked"
                    );
                }
            }
            self.delivered.send_replace((seq, next));
        }
    }

    async fn run_attempt(self: Arc<Self>, attempt: u32) {
        let timeout = self.config.timeout();
        let operation = AssertUnwindSafe(async { self.source.fetch().await }).catch_unwind();

        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!(attempt, "controller released, abandoning attempt");
                return;
            }
            outcome = tokio::time::timeout(timeout, operation) => outcome,
        };

        let next = match outcome {
            Err(_elapsed) => FetchState::Failed {
                error: ClassifiedError::timeout(timeout),
                attempt,
            },
            Ok(Err(panic)) => FetchState::Failed {
                error: ClassifiedError::panicked(panic_message(panic.as_ref())),
                attempt,
            },
            Ok(Ok(Ok(items))) => {
                debug!(attempt, items = items.len(), "fetch succeeded");
                FetchState::Success {
                    data: Arc::from(items),
                }
            }
            Ok(Ok(Err(failure))) => FetchState::Failed {
                error: classify(failure),
                attempt,
            },
        };

        if let FetchState::Failed { error, .. } = &next {
            warn!(
                attempt,
                kind = error.kind().as_ref(),
                message = error.message(),
                "fetch failed"
            );
        }

        self.settle(attempt, next);
    }
}

// ── Subscription ─────────────────────────────────────────────────

/// Cancellation handle for a listener registered with
/// [`FetchController::subscribe`].
#[must_use = "dropping a Subscription removes its listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn cancel(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Keep the listener registered for the controller's whole lifetime.
    pub fn detach(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// A poisoned lock only means a listener or source panicked mid-update;
/// the guarded data is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
