// ── Fetch lifecycle state ──

use std::sync::Arc;

use crate::classify::ClassifiedError;

/// Lifecycle state of a [`FetchController`](crate::FetchController).
///
/// Exactly one variant is current at a time. `Success` data is shared
/// behind an `Arc<[T]>`: snapshots are cheap and cannot be mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// No fetch has started.
    Idle,
    /// A fetch is in flight.
    Loading { attempt: u32 },
    /// The last fetch completed; items in the order the source returned them.
    Success { data: Arc<[T]> },
    /// The last fetch failed.
    Failed { error: ClassifiedError, attempt: u32 },
}

impl<T> FetchState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// `true` for `Success` and `Failed`.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failed { .. })
    }

    /// Attempt number carried by `Loading` and `Failed`.
    pub fn attempt(&self) -> Option<u32> {
        match self {
            Self::Loading { attempt } | Self::Failed { attempt, .. } => Some(*attempt),
            Self::Idle | Self::Success { .. } => None,
        }
    }

    pub fn data(&self) -> Option<&Arc<[T]>> {
        match self {
            Self::Success { data } => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Success { .. } => "success",
            Self::Failed { .. } => "failed",
        }
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}
