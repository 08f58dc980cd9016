// ── Core error types ──
//
// Two layers. `FetchError` is what a poll subscription records in its
// state: cloneable, classified by `ErrorKind`, never propagated into the
// rendering layer. `CoreError` is returned by one-shot operations
// (directory refresh/create, health probe). Both are translated from
// `zlog_api::Error` so consumers never match on transport details.

use thiserror::Error;

/// Classification of a failed backend read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never produced a response (refused, DNS, timeout).
    Network,
    /// The backend answered with a non-2xx status.
    Http,
    /// The response body could not be decoded at all.
    Shape,
}

/// A failed read, as stored in a subscription's state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Shape(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Http { .. } => ErrorKind::Http,
            Self::Shape(_) => ErrorKind::Shape,
        }
    }

    /// User-facing banner text for a failed load of `resource`.
    pub fn banner(&self, resource: &str) -> String {
        match self.kind() {
            ErrorKind::Network => {
                format!("Failed to load {resource}. Check that the backend is running.")
            }
            ErrorKind::Http => format!("Failed to load {resource}: {self}."),
            ErrorKind::Shape => {
                format!("Failed to load {resource}: the backend sent an unreadable response.")
            }
        }
    }
}

impl From<zlog_api::Error> for FetchError {
    fn from(err: zlog_api::Error) -> Self {
        match err {
            zlog_api::Error::Transport(e) => match e.status() {
                Some(status) => Self::Http {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => Self::Network(e.to_string()),
            },
            zlog_api::Error::InvalidUrl(e) => Self::Network(format!("invalid URL: {e}")),
            zlog_api::Error::Http { status, message } => Self::Http { status, message },
            zlog_api::Error::Deserialization { message, body: _ } => Self::Shape(message),
        }
    }
}

/// Unified error type for one-shot core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Backend errors ───────────────────────────────────────────────
    #[error("Cannot reach backend: {reason}")]
    Unreachable { reason: String },

    #[error("Backend rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from backend: {message}")]
    UnexpectedResponse { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    /// A newer operation replaced this one before it completed.
    #[error("Superseded by a newer request")]
    Superseded,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<FetchError> for CoreError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network(reason) => Self::Unreachable { reason },
            FetchError::Http { status, message } => Self::Rejected { status, message },
            FetchError::Shape(message) => Self::UnexpectedResponse { message },
        }
    }
}

impl From<zlog_api::Error> for CoreError {
    fn from(err: zlog_api::Error) -> Self {
        match err {
            zlog_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid backend URL: {e}"),
            },
            other => FetchError::from(other).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_kinds() {
        let http: FetchError = zlog_api::Error::Http {
            status: 502,
            message: "Bad Gateway".into(),
        }
        .into();
        assert_eq!(http.kind(), ErrorKind::Http);

        let shape: FetchError = zlog_api::Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        }
        .into();
        assert_eq!(shape.kind(), ErrorKind::Shape);
    }

    #[test]
    fn banner_names_the_resource() {
        let err = FetchError::Network("connection refused".into());
        assert_eq!(
            err.banner("logs"),
            "Failed to load logs. Check that the backend is running."
        );

        let err = FetchError::Http {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.banner("stats"), "Failed to load stats: HTTP 500: boom.");
    }

    #[test]
    fn core_error_from_fetch_error() {
        let err: CoreError = FetchError::Shape("bad".into()).into();
        assert!(matches!(err, CoreError::UnexpectedResponse { .. }));
    }
}
