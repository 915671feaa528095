//! Watch: keep the integration running and print entity state on every
//! snapshot change until interrupted.

use std::time::Duration;

use serde::Serialize;
use solity_core::{Entity, EntitySet, Integration, IntegrationConfig, RefreshState};
use tabled::Tabled;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct EntityState {
    device_id: String,
    name: String,
    is_locked: Option<bool>,
    battery: Option<u8>,
    available: bool,
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Device")]
    device_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Lock")]
    lock: String,
    #[tabled(rename = "Battery")]
    battery: String,
    #[tabled(rename = "Available")]
    available: String,
}

fn collect(entities: &EntitySet) -> Vec<EntityState> {
    entities
        .locks
        .iter()
        .map(|lock| EntityState {
            device_id: lock.device_id().to_owned(),
            name: lock.name().to_owned(),
            is_locked: lock.is_locked(),
            battery: entities
                .sensor(lock.device_id())
                .and_then(|s| s.native_value()),
            available: lock.available(),
        })
        .collect()
}

fn render(entities: &EntitySet, global: &GlobalOpts) -> String {
    let states = collect(entities);
    let color = output::should_color(&global.color);
    // One document per update so the stream stays line-parseable.
    let format = match global.output {
        OutputFormat::Json => &OutputFormat::JsonCompact,
        ref other => other,
    };
    output::render_list(
        format,
        &states,
        |s| EntityRow {
            device_id: s.device_id.clone(),
            name: s.name.clone(),
            lock: output::lock_state(s.is_locked, color),
            battery: s.battery.map_or_else(|| "-".into(), |b| format!("{b}%")),
            available: if s.available { "yes" } else { "no" }.into(),
        },
        |s| {
            format!(
                "{} {} {}",
                s.device_id,
                output::lock_state(s.is_locked, false),
                s.battery.map_or_else(|| "-".into(), |b| b.to_string())
            )
        },
    )
}

pub async fn handle(
    mut config: IntegrationConfig,
    interval: Option<u64>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(secs) = interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least one second".into(),
            });
        }
        config = config.with_update_interval(Duration::from_secs(secs));
    }

    let integration = Integration::connect(config).await?;
    let result = run(&integration, global).await;
    integration.unload().await;
    result
}

async fn run(integration: &Integration, global: &GlobalOpts) -> Result<(), CliError> {
    let entities = integration.entities();
    let mut updates = integration.coordinator().updates();
    let mut refresh = integration.coordinator().refresh_state();

    output::print_output(&render(&entities, global), global.quiet);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted, stopping watch");
                return Ok(());
            }
            changed = updates.changed() => {
                if changed.is_none() {
                    return Ok(());
                }
                output::print_output(&render(&entities, global), global.quiet);
            }
            changed = refresh.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = refresh.borrow_and_update().clone();
                match state {
                    RefreshState::AuthFailed { message } => {
                        return Err(CliError::AuthFailed {
                            profile: "current".into(),
                            message,
                        });
                    }
                    RefreshState::UpdateFailed { message } => {
                        tracing::warn!(%message, "refresh failed, showing last known state");
                    }
                    _ => {}
                }
            }
        }
    }
}
