//! Lock, unlock and open.
//!
//! Runs the full integration setup so the command goes through the lock
//! entity and its optimistic state, then tears everything down again.

use serde::Serialize;
use solity_api::{ControlResponse, DeviceCommand};
use solity_core::{Entity, Integration, IntegrationConfig, LockEntity};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LockAction {
    Lock,
    Unlock,
    Open,
}

impl LockAction {
    fn command(self) -> DeviceCommand {
        match self {
            Self::Lock => DeviceCommand::Close,
            Self::Unlock | Self::Open => DeviceCommand::Open,
        }
    }

    async fn run(self, lock: &LockEntity) -> Result<ControlResponse, solity_api::Error> {
        match self {
            Self::Lock => lock.lock().await,
            Self::Unlock => lock.unlock().await,
            Self::Open => lock.open().await,
        }
    }
}

#[derive(Serialize)]
struct LockOutcome {
    device_id: String,
    name: String,
    is_locked: Option<bool>,
    available: bool,
    battery: Option<u8>,
}

fn detail(o: &LockOutcome, color: bool) -> String {
    [
        format!("Device:    {}", o.device_id),
        format!("Name:      {}", o.name),
        format!("State:     {}", output::lock_state(o.is_locked, color)),
        format!("Available: {}", if o.available { "yes" } else { "no" }),
        format!(
            "Battery:   {}",
            o.battery.map_or_else(|| "-".into(), |b| format!("{b}%"))
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: IntegrationConfig,
    action: LockAction,
    device_id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if action != LockAction::Lock
        && !util::confirm(&format!("{action} {device_id}?"), &action.to_string(), global.yes)?
    {
        return Ok(());
    }

    let integration = Integration::connect(config).await?;
    let result = execute(&integration, action, device_id, global).await;
    integration.unload().await;
    result
}

async fn execute(
    integration: &Integration,
    action: LockAction,
    device_id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let entities = integration.entities();
    let lock = entities
        .lock(device_id)
        .ok_or_else(|| CliError::DeviceNotFound {
            device_id: device_id.into(),
        })?;

    let response = action.run(lock).await?;
    util::check_control(action.command(), &response)?;

    let outcome = LockOutcome {
        device_id: device_id.into(),
        name: lock.name().to_owned(),
        is_locked: lock.is_locked(),
        available: lock.available(),
        battery: entities.sensor(device_id).and_then(|s| s.native_value()),
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &outcome,
        |o| detail(o, color),
        |o| output::lock_state(o.is_locked, false),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
