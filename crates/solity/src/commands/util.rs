//! Shared helpers for command handlers.

use std::io::IsTerminal;

use solity_api::{ControlResponse, DeviceCommand, SolityClient, TransportConfig};
use solity_core::IntegrationConfig;

use crate::error::CliError;

/// Build a bare API client for one-shot requests that need no polling.
pub fn build_client(config: &IntegrationConfig) -> Result<SolityClient, CliError> {
    let http = TransportConfig::default()
        .with_timeout(config.timeout)
        .build_client()?;
    Ok(
        SolityClient::with_client(http, config.base_url.clone(), config.credentials.clone())
            .with_timeout(config.timeout),
    )
}

/// Turn a non-zero vendor `result` into an error.
pub fn check_control(command: DeviceCommand, response: &ControlResponse) -> Result<(), CliError> {
    if response.is_success() {
        return Ok(());
    }
    Err(CliError::CommandRejected {
        command: command.to_string(),
        code: response.result.unwrap_or(-1),
        message: response
            .error_message
            .clone()
            .unwrap_or_else(|| "no message".into()),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Refuses outright when stdin is not a terminal.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
