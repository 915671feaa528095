//! CLI error types with miette diagnostics.
//!
//! Maps core, client and config errors into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use solity_config::ConfigError;
use solity_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the Solity API")]
    #[diagnostic(
        code(solity::connection_failed),
        help(
            "Check your network connection and try again.\n\
             Details: {message}\n\
             Increase the timeout with --timeout if the API is slow."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Not ready: {message}")]
    #[diagnostic(
        code(solity::not_ready),
        help("The API answered but the device list could not be loaded. Try again later.")
    )]
    NotReady { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(solity::auth_failed),
        help(
            "Verify the e-mail and password of profile '{profile}'.\n\
             Run: solity config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(solity::no_credentials),
        help(
            "Configure credentials with: solity config init\n\
             Or pass --username and set SOLITY_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Device '{device_id}' not found")]
    #[diagnostic(
        code(solity::not_found),
        help("Run: solity devices list to see available devices")
    )]
    DeviceNotFound { device_id: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(solity::api_error))]
    ApiError { message: String },

    #[error("Device rejected '{command}' (result {code}): {message}")]
    #[diagnostic(
        code(solity::command_rejected),
        help("The lock or its gateway may be offline. Check: solity devices list")
    )]
    CommandRejected {
        command: String,
        code: i64,
        message: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(solity::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(solity::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: solity config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No configuration found")]
    #[diagnostic(
        code(solity::no_config),
        help(
            "Create one with: solity config init\n\
             Expected at: {path}\n\
             Or pass --username and set SOLITY_PASSWORD."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(solity::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(solity::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::NotReady { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::CommandRejected { .. } => exit_code::REJECTED,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            Self::ApiError { .. } | Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Attach the profile name to an authentication failure.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            other => other,
        }
    }
}

// ── Lower layers → CliError ──────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::Communication { message } => CliError::ConnectionFailed { message },
            CoreError::NotReady { message } => CliError::NotReady { message },
            CoreError::DeviceNotFound { device_id } => CliError::DeviceNotFound { device_id },
            CoreError::Api { message } => CliError::ApiError { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<solity_api::Error> for CliError {
    fn from(err: solity_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
