use thiserror::Error;

/// Top-level error type for the `shelf-api` crate.
///
/// Keeps the distinction between "never got a response", "got a response
/// with a bad status" and "got a response we could not decode" intact so
/// `shelf-core` can classify failures without sniffing message strings.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Response ────────────────────────────────────────────────────
    /// The server answered with a non-success status code.
    #[error("HTTP {status} {reason}")]
    Status {
        status: u16,
        reason: String,
        /// Raw response body, if one could be read.
        body: Option<String>,
    },

    /// A success response whose body is not a JSON item list.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request never produced a response because the
    /// connection could not be established.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Returns `true` if the transport gave up waiting for the server.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// The HTTP status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_reports_code() {
        let err = Error::Status {
            status: 503,
            reason: "Service Unavailable".into(),
            body: None,
        };
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_connect());
        assert_eq!(err.to_string(), "HTTP 503 Service Unavailable");
    }
}
