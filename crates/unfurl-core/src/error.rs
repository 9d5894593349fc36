//! Unified error type for the unfurl application.
//!
//! Request-level failures funnel into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].
//! Resolution failures that must still produce a `200` body (timeouts,
//! unknown extraction errors) are not represented here; those travel inside
//! the payload as a [`crate::MediaError`] overlay.

/// Unified error type covering request-level failure modes in unfurl.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request did not carry a URL to resolve.
    #[error("No URL provided")]
    MissingUrl,

    /// The supplied URL is not something the resolver can work with.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The resolver's request budget is exhausted.
    #[error("Rate limit exceeded, retry in {retry_in}s")]
    RateLimited {
        /// Seconds until the next resolution slot opens.
        retry_in: u64,
    },

    /// Configuration is missing or inconsistent.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::MissingUrl => 400,
            Error::InvalidUrl(_) => 422,
            Error::RateLimited { .. } => 429,
            Error::Config(_) => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingUrl => "MISSING_URL",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::RateLimited { .. } => "RATE_LIMITED",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io { .. } => "IO_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convenience constructor for [`Error::InvalidUrl`].
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Error::InvalidUrl(url.into())
    }

    /// Convenience constructor for [`Error::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
