// ── Core error types ──
//
// The coordinator collapses every client failure into one of two signals:
// the credentials must be re-entered, or this update failed and the next
// tick may fix it. `CoreError` is what hosts see from setup.

use solity_api::ErrorKind;
use thiserror::Error;

/// Outcome of a failed refresh cycle.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Credentials rejected. Polling cannot recover on its own.
    #[error("Re-authentication required: {source}")]
    AuthRequired {
        #[source]
        source: solity_api::Error,
    },

    /// Any other failure. The last good snapshot stays in place.
    #[error("Update failed: {source}")]
    UpdateFailed {
        kind: ErrorKind,
        #[source]
        source: solity_api::Error,
    },
}

impl CoordinatorError {
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired { .. })
    }
}

impl From<solity_api::Error> for CoordinatorError {
    fn from(err: solity_api::Error) -> Self {
        match err.kind() {
            ErrorKind::Authentication => Self::AuthRequired { source: err },
            kind => Self::UpdateFailed { kind, source: err },
        }
    }
}

/// Unified error type for hosts driving the integration.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Setup / connection ───────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach the Solity API: {message}")]
    Communication { message: String },

    /// Setup could not complete; the host should retry later.
    #[error("Integration not ready: {message}")]
    NotReady { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether the user has to enter new credentials.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from lower layers ─────────────────────────────────────

impl From<solity_api::Error> for CoreError {
    fn from(err: solity_api::Error) -> Self {
        match err {
            solity_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            solity_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            other if other.is_transient() => CoreError::Communication {
                message: other.to_string(),
            },
            other => CoreError::Api {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoordinatorError> for CoreError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::AuthRequired { source } => source.into(),
            CoordinatorError::UpdateFailed { source, .. } => CoreError::NotReady {
                message: source.to_string(),
            },
        }
    }
}
