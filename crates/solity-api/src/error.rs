use thiserror::Error;

/// Top-level error type for the `solity-api` crate.
///
/// Every failure is one of three kinds (see [`ErrorKind`]): the credentials
/// were rejected, the network let us down, or the API answered with
/// something we did not expect. `solity-core` branches on the kind, never
/// on the individual variant.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the API answered 401/403.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Timeout, DNS failure, refused connection, truncated body.
    #[error("Communication error: {message}")]
    Communication {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status other than 401/403.
    #[error("HTTP error (status {status})")]
    Http { status: u16 },

    /// URL construction failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// The envelope carried a non-zero `result`, or something unexpected
    /// happened while talking to the API.
    #[error("API error: {message}")]
    Api {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON body did not match the expected shape. Keeps the raw body.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Coarse classification used for failure handling upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Communication,
    Api,
}

impl Error {
    /// Build a generic API error without an underlying cause.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Communication { .. } => ErrorKind::Communication,
            Self::Http { .. }
            | Self::InvalidUrl(_)
            | Self::Api { .. }
            | Self::Deserialization { .. } => ErrorKind::Api,
        }
    }

    /// Returns `true` if the credentials need to be re-entered.
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// Returns `true` for failures expected to clear up on the next attempt.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Communication
    }

    /// Classify a `reqwest` failure.
    ///
    /// Timeouts and network-level errors are communication failures;
    /// everything else is an unexpected API error wrapping the cause.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Communication {
                message: format!("timeout fetching information - {err}"),
                source: err,
            }
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::Communication {
                message: format!("error fetching information - {err}"),
                source: err,
            }
        } else {
            Self::Api {
                message: format!("unexpected error - {err}"),
                source: Some(Box::new(err)),
            }
        }
    }
}
