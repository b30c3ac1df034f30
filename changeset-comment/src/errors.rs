//! Crate-wide error hierarchy for the changeset bot.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Platform errors keep their HTTP diagnostics (status, URL, body) so they
//!   can be logged before the run fails.
//! - No dynamic dispatch, ergonomic `?` via `From` impls.

use std::sync::Arc;

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type BotResult<T> = Result<T, Error>;

/// Root error type for the changeset bot.
#[derive(Debug, Error)]
pub enum Error {
    /// GitLab API related failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration problems (missing variables, bad comment type).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure surfaced through the shared changed-files future; both
    /// consumers observe the same underlying error.
    #[error(transparent)]
    Shared(Arc<Error>),
}

/// Detailed platform error used inside the GitLab client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-success HTTP status with captured diagnostics.
    #[error("gitlab api error: status {status} at {url}")]
    Http {
        status: u16,
        url: String,
        /// Response body, captured best-effort for operator debugging.
        body: Option<String>,
    },

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("invalid comment type {0:?}, expected \"discussion\" or \"note\"")]
    InvalidCommentType(String),
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Provider(ProviderError::from(e))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return ProviderError::Timeout;
        }
        if let Some(status) = e.status() {
            return ProviderError::Http {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
                body: None,
            };
        }
        ProviderError::Network(e.to_string())
    }
}

/// Logs the structured request/response detail a platform error carries.
///
/// Best-effort: a body that could not be captured is simply absent, and
/// errors without diagnostics log nothing extra. The caller re-raises the
/// error afterwards so the CI job still fails visibly.
pub fn log_api_diagnostics(err: &Error) {
    let mut cur = err;
    loop {
        match cur {
            Error::Shared(inner) => cur = inner,
            Error::Provider(ProviderError::Http { status, url, body }) => {
                tracing::error!("gitlab api request failed: status={status} url={url}");
                if let Some(body) = body {
                    tracing::error!("gitlab api response body: {body}");
                }
                return;
            }
            _ => return,
        }
    }
}
