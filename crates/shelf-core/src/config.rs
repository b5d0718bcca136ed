// ── Controller configuration ──
//
// Tuning for a single FetchController. Built by the CLI (or any other
// consumer) and handed in; core never reads config files.

use std::time::Duration;

use crate::error::CoreError;

/// Default deadline for one fetch attempt.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Options recognized by [`FetchController`](crate::FetchController).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    timeout_ms: u64,
    auto_start: bool,
}

impl FetchConfig {
    /// Validate and build a config. `timeout_ms` must be non-zero.
    pub fn new(timeout_ms: u64, auto_start: bool) -> Result<Self, CoreError> {
        if timeout_ms == 0 {
            return Err(CoreError::InvalidTimeout);
        }
        Ok(Self {
            timeout_ms,
            auto_start,
        })
    }

    /// Abort and classify as `Timeout` once this elapses.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Whether construction immediately begins loading.
    pub fn auto_start(&self) -> bool {
        self.auto_start
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            auto_start: true,
        }
    }
}
