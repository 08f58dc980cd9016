use thiserror::Error;

/// Top-level error type for the `zlog-api` crate.
///
/// Covers every failure mode of a backend call: transport, URL
/// construction, non-2xx responses, and undecodable bodies.
/// `zlog-core` maps these into the fetch error kinds shown to the user.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Backend ─────────────────────────────────────────────────────
    /// The backend answered with a non-2xx status.
    #[error("Backend error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
