// ── Failure classification ──
//
// One function turns whatever a fetch source reported into a user-facing
// `ClassifiedError`. Structured `FetchFailure` variants map directly; only
// `FetchFailure::Other` goes through the io-kind and message heuristics.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::FetchFailure;

/// Shared, immutable underlying cause of a classified failure.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

const UNREACHABLE_MESSAGE: &str = "No internet connection or server is not reachable.";

/// Substrings (lowercase) that mark a connection-level failure.
const CONNECT_HINTS: &[&str] = &[
    "network error",
    "connection refused",
    "econnrefused",
    "connection reset",
    "econnreset",
    "enotfound",
    "dns error",
    "failed to lookup address",
    "network is unreachable",
    "host is unreachable",
    "cannot reach server",
    "error trying to connect",
];

/// Substrings (lowercase) that mark a timeout.
const TIMEOUT_HINTS: &[&str] = &[
    "timed out",
    "timeout",
    "econnaborted",
    "etimedout",
    "deadline has elapsed",
];

/// Keys a server error body may carry a human-readable message under.
const MESSAGE_KEYS: &[&str] = &["message", "error", "detail"];

// ── ErrorKind ────────────────────────────────────────────────────────

/// Failure category surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NetworkUnreachable,
    Timeout,
    ServerError(u16),
    MalformedResponse,
    Unknown,
}

impl ErrorKind {
    /// HTTP status for `ServerError`, `None` otherwise.
    pub fn status(self) -> Option<u16> {
        match self {
            Self::ServerError(status) => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkUnreachable => f.write_str("network unreachable"),
            Self::Timeout => f.write_str("timeout"),
            Self::ServerError(status) => write!(f, "server error (HTTP {status})"),
            Self::MalformedResponse => f.write_str("malformed response"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

// ── ClassifiedError ──────────────────────────────────────────────────

/// A failure normalized into a fixed kind, a human-readable message and
/// the original cause.
#[derive(Clone)]
pub struct ClassifiedError {
    kind: ErrorKind,
    message: String,
    cause: Option<Cause>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, cause: Option<Cause>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause,
        }
    }

    /// The controller-level deadline elapsed before the operation settled.
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!(
                "Request timed out after {} ms. Please check your network.",
                after.as_millis()
            ),
            None,
        )
    }

    /// The fetch operation panicked instead of settling.
    pub fn panicked(detail: &str) -> Self {
        Self::new(
            ErrorKind::Unknown,
            format!("Something went wrong. Please try again. (fetch operation panicked: {detail})"),
            None,
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message suitable for showing to the user verbatim.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying failure, kept for diagnostics.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl fmt::Debug for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifiedError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("cause", &self.cause.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ClassifiedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn StdError + 'static))
    }
}

/// Two classified errors are equal when they describe the same failure
/// instance: same kind, same message, same cause allocation.
impl PartialEq for ClassifiedError {
    fn eq(&self, other: &Self) -> bool {
        let same_cause = match (&self.cause, &other.cause) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.kind == other.kind && self.message == other.message && same_cause
    }
}

// ── Classification ───────────────────────────────────────────────────

/// Classify a failure reported by a fetch source.
pub fn classify(failure: FetchFailure) -> ClassifiedError {
    match failure {
        FetchFailure::Connect { .. } => {
            ClassifiedError::new(ErrorKind::NetworkUnreachable, UNREACHABLE_MESSAGE, Some(Arc::new(failure)))
        }
        FetchFailure::TimedOut { .. } => ClassifiedError::new(
            ErrorKind::Timeout,
            "Request timed out. Please check your network.",
            Some(Arc::new(failure)),
        ),
        FetchFailure::Status {
            status,
            ref reason,
            ref body,
        } => {
            let reason = reason.clone();
            let body = body.clone();
            server_error(status, &reason, body.as_deref(), Arc::new(failure))
        }
        FetchFailure::Malformed { ref message, .. } => {
            let message = format!("Unexpected response from server: {message}");
            ClassifiedError::new(ErrorKind::MalformedResponse, message, Some(Arc::new(failure)))
        }
        FetchFailure::Other(err) => classify_opaque(err.into()),
    }
}

/// A non-success status. The body, if any, must be JSON; a body
/// that does not parse downgrades the failure to `MalformedResponse`.
fn server_error(status: u16, reason: &str, body: Option<&str>, failure: Cause) -> ClassifiedError {
    let headline = if reason.is_empty() {
        format!("Server error: {status}")
    } else {
        format!("Server error: {status} {reason}")
    };

    let body = body.map(str::trim).filter(|b| !b.is_empty());
    let detail = match body.map(serde_json::from_str::<Value>) {
        None => None,
        Some(Ok(value)) => server_message(&value),
        Some(Err(parse_err)) => {
            return ClassifiedError::new(
                ErrorKind::MalformedResponse,
                format!("{headline} (response body could not be parsed)"),
                Some(Arc::new(parse_err)),
            );
        }
    };

    let message = match detail {
        Some(detail) => format!("{headline}: {detail}"),
        None => headline,
    };
    ClassifiedError::new(ErrorKind::ServerError(status), message, Some(failure))
}

/// Pull a server-supplied message out of a parsed error body.
fn server_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => MESSAGE_KEYS.iter().find_map(|key| match map.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            nested @ Value::Object(_) => server_message(nested),
            _ => None,
        }),
        _ => None,
    }
}

/// Failures without structure: io kinds anywhere in
/// the source chain first, then message heuristics, then `Unknown`.
fn classify_opaque(err: Cause) -> ClassifiedError {
    let kind = io_kind(err.as_ref()).or_else(|| hinted_kind(err.as_ref()));

    match kind {
        Some(ErrorKind::NetworkUnreachable) => {
            ClassifiedError::new(ErrorKind::NetworkUnreachable, UNREACHABLE_MESSAGE, Some(err))
        }
        Some(ErrorKind::Timeout) => ClassifiedError::new(
            ErrorKind::Timeout,
            "Request timed out. Please check your network.",
            Some(err),
        ),
        _ => {
            let detail = chain_text(err.as_ref());
            let message = if detail.is_empty() {
                "Something went wrong. Please try again.".to_owned()
            } else {
                format!("Something went wrong. Please try again. ({detail})")
            };
            ClassifiedError::new(ErrorKind::Unknown, message, Some(err))
        }
    }
}

fn io_kind(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::AddrNotAvailable
                | io::ErrorKind::HostUnreachable
                | io::ErrorKind::NetworkUnreachable => return Some(ErrorKind::NetworkUnreachable),
                io::ErrorKind::TimedOut => return Some(ErrorKind::Timeout),
                _ => {}
            }
        }
        current = e.source();
    }
    None
}

fn hinted_kind(err: &(dyn StdError + 'static)) -> Option<ErrorKind> {
    let text = chain_text(err).to_lowercase();
    if CONNECT_HINTS.iter().any(|hint| text.contains(hint)) {
        Some(ErrorKind::NetworkUnreachable)
    } else if TIMEOUT_HINTS.iter().any(|hint| text.contains(hint)) {
        Some(ErrorKind::Timeout)
    } else {
        None
    }
}

/// `outer: inner: innermost`, skipping links that repeat their parent.
fn chain_text(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string();
        if !text.is_empty() && parts.last().is_none_or(|prev| !prev.contains(&text)) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Wrapped {
        inner: io::Error,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("request failed")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.inner)
        }
    }

    // ── Structured failures ─────────────────────────────────────────

    #[test]
    fn connect_is_network_unreachable() {
        let err = classify(FetchFailure::connect("connection refused"));
        assert_eq!(err.kind(), ErrorKind::NetworkUnreachable);
        assert_eq!(err.message(), UNREACHABLE_MESSAGE);
        assert!(err.cause().is_some());
    }

    #[test]
    fn transport_timeout_is_timeout() {
        let err = classify(FetchFailure::TimedOut {
            message: "operation timed out".into(),
            source: None,
        });
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn status_500_embeds_code() {
        let err = classify(FetchFailure::Status {
            status: 500,
            reason: "Internal Server Error".into(),
            body: None,
        });
        assert_eq!(err.kind(), ErrorKind::ServerError(500));
        assert_eq!(err.message(), "Server error: 500 Internal Server Error");
    }

    #[test]
    fn status_message_field_is_appended() {
        let err = classify(FetchFailure::status(
            503,
            Some(r#"{"message":"maintenance window"}"#.into()),
        ));
        assert_eq!(err.kind(), ErrorKind::ServerError(503));
        assert_eq!(err.message(), "Server error: 503: maintenance window");
    }

    #[test]
    fn nested_error_message_is_found() {
        let err = classify(FetchFailure::status(
            400,
            Some(r#"{"error":{"message":"bad category"}}"#.into()),
        ));
        assert_eq!(err.kind(), ErrorKind::ServerError(400));
        assert!(err.message().ends_with("bad category"));
    }

    #[test]
    fn json_body_without_message_keeps_headline() {
        let err = classify(FetchFailure::status(500, Some(r#"{"code":17}"#.into())));
        assert_eq!(err.kind(), ErrorKind::ServerError(500));
        assert_eq!(err.message(), "Server error: 500");
    }

    #[test]
    fn unparseable_status_body_is_malformed() {
        let err = classify(FetchFailure::Status {
            status: 502,
            reason: "Bad Gateway".into(),
            body: Some("<html><body>nginx</body></html>".into()),
        });
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.message().contains("502"));
        let cause = err.cause().unwrap();
        assert!(cause.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn malformed_success_payload() {
        let err = classify(FetchFailure::malformed("expected a list of items"));
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.message().contains("expected a list of items"));
    }

    // ── Opaque failures ─────────────────────────────────────────────

    #[test]
    fn io_kind_in_source_chain_wins() {
        let err = classify(FetchFailure::other(Wrapped {
            inner: io::Error::from(io::ErrorKind::ConnectionRefused),
        }));
        assert_eq!(err.kind(), ErrorKind::NetworkUnreachable);

        let err = classify(FetchFailure::other(Wrapped {
            inner: io::Error::from(io::ErrorKind::TimedOut),
        }));
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn message_heuristics() {
        let cases = [
            ("Network Error", ErrorKind::NetworkUnreachable),
            ("Cannot reach server. Please check your internet connection.", ErrorKind::NetworkUnreachable),
            ("ECONNABORTED", ErrorKind::Timeout),
            ("deadline has elapsed", ErrorKind::Timeout),
        ];
        for (text, expected) in cases {
            let err = classify(FetchFailure::other(text));
            assert_eq!(err.kind(), expected, "input: {text}");
        }
    }

    #[test]
    fn connect_hint_beats_timeout_hint() {
        let err = classify(FetchFailure::other("connection refused after timeout"));
        assert_eq!(err.kind(), ErrorKind::NetworkUnreachable);
    }

    #[test]
    fn unknown_keeps_message_and_cause() {
        let err = classify(FetchFailure::other("quota exhausted"));
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.message().contains("quota exhausted"));
        assert_eq!(err.cause().unwrap().to_string(), "quota exhausted");
    }

    #[test]
    fn unknown_with_empty_text_still_has_message() {
        let err = classify(FetchFailure::other(""));
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.message(), "Something went wrong. Please try again.");
    }

    // ── Misc ────────────────────────────────────────────────────────

    #[test]
    fn timeout_message_names_deadline() {
        let err = ClassifiedError::timeout(Duration::from_millis(5000));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.message().contains("5000 ms"));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ErrorKind::ServerError(500).as_ref(), "server_error");
        assert_eq!(ErrorKind::NetworkUnreachable.as_ref(), "network_unreachable");
        assert_eq!(ErrorKind::ServerError(404).to_string(), "server error (HTTP 404)");
        assert_eq!(ErrorKind::ServerError(404).status(), Some(404));
        assert_eq!(ErrorKind::Timeout.status(), None);
    }

    #[test]
    fn clones_compare_equal() {
        let err = classify(FetchFailure::other("boom"));
        assert_eq!(err.clone(), err);
        assert_ne!(classify(FetchFailure::other("boom")), err);
    }
}
