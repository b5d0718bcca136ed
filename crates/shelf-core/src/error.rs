// ── Core error types ──
//
// `FetchFailure` is what a fetch source reports: the raw, structured facts
// about how an operation failed. The controller turns it into a
// `ClassifiedError` (see `classify`). `CoreError` covers the few fallible
// setup paths (configuration, source construction).

use thiserror::Error;

/// Boxed error used for opaque causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for the core crate's setup paths.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid timeout: must be greater than zero milliseconds")]
    InvalidTimeout,

    #[error("Cannot build catalog source: {0}")]
    Source(#[from] shelf_api::Error),
}

/// Failure surfaced by a fetch source.
///
/// Sources should pick the most specific variant they can. `Other` is the
/// escape hatch for transports that cannot tell connection failures from
/// anything else; classification then falls back to heuristics.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The connection could not be established; no response was received.
    #[error("{message}")]
    Connect {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The transport itself gave up waiting for a response.
    #[error("{message}")]
    TimedOut {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A response arrived with a non-success status code.
    #[error("HTTP {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        body: Option<String>,
    },

    /// A success response whose payload is not an item list.
    #[error("{message}")]
    Malformed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Anything else.
    #[error(transparent)]
    Other(BoxError),
}

impl FetchFailure {
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
            source: None,
        }
    }

    pub fn status(status: u16, body: Option<String>) -> Self {
        Self::Status {
            status,
            reason: String::new(),
            body,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            source: None,
        }
    }

    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<shelf_api::Error> for FetchFailure {
    fn from(err: shelf_api::Error) -> Self {
        match err {
            shelf_api::Error::Transport(e) => {
                if e.is_connect() {
                    FetchFailure::Connect {
                        message: e.to_string(),
                        source: Some(Box::new(e)),
                    }
                } else if e.is_timeout() {
                    FetchFailure::TimedOut {
                        message: e.to_string(),
                        source: Some(Box::new(e)),
                    }
                } else if let Some(status) = e.status() {
                    FetchFailure::Status {
                        status: status.as_u16(),
                        reason: status.canonical_reason().unwrap_or_default().to_owned(),
                        body: None,
                    }
                } else if e.is_decode() || e.is_body() {
                    FetchFailure::Malformed {
                        message: e.to_string(),
                        source: Some(Box::new(e)),
                    }
                } else {
                    FetchFailure::Other(Box::new(e))
                }
            }
            shelf_api::Error::Status {
                status,
                reason,
                body,
            } => FetchFailure::Status {
                status,
                reason,
                body,
            },
            err @ shelf_api::Error::Deserialization { .. } => FetchFailure::Malformed {
                message: err.to_string(),
                source: Some(Box::new(err)),
            },
            err @ (shelf_api::Error::InvalidUrl(_) | shelf_api::Error::Tls(_)) => {
                FetchFailure::Other(Box::new(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_maps_to_status() {
        let failure = FetchFailure::from(shelf_api::Error::Status {
            status: 502,
            reason: "Bad Gateway".into(),
            body: Some("upstream down".into()),
        });
        assert!(matches!(
            failure,
            FetchFailure::Status { status: 502, ref body, .. } if body.as_deref() == Some("upstream down")
        ));
    }

    #[test]
    fn api_deserialization_keeps_source() {
        let failure = FetchFailure::from(shelf_api::Error::Deserialization {
            message: "invalid type: map, expected a sequence".into(),
            body: "{}".into(),
        });
        match failure {
            FetchFailure::Malformed { source, message } => {
                assert!(message.contains("expected a sequence"));
                assert!(source.is_some());
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn tls_setup_error_is_opaque() {
        let failure = FetchFailure::from(shelf_api::Error::Tls("invalid CA cert".into()));
        assert!(matches!(failure, FetchFailure::Other(_)));
        assert_eq!(failure.to_string(), "TLS error: invalid CA cert");
    }
}
