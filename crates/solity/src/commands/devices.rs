//! Device command handlers.

use solity_api::{ControlResponse, DeviceCommand, SolityClient};
use solity_core::{DeviceState, IntegrationConfig, Snapshot};
use tabled::Tabled;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Battery")]
    battery: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
}

impl DeviceRow {
    fn new(d: &DeviceState, color: bool) -> Self {
        Self {
            id: d.device_id().to_owned(),
            name: d.nickname.clone(),
            model: d.model.clone(),
            firmware: d.firmware.clone(),
            battery: format!("{}%", d.battery),
            gateway: output::gateway_state(d.gateway_connected, color),
        }
    }
}

fn response_detail(r: &ControlResponse) -> String {
    let mut lines = vec![
        format!(
            "Result:  {}",
            r.result.map_or_else(|| "-".into(), |c| c.to_string())
        ),
        format!("Message: {}", r.error_message.as_deref().unwrap_or("-")),
    ];
    for (key, value) in &r.extra {
        lines.push(format!("{key}: {value}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: &IntegrationConfig,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = util::build_client(config)?;

    match args.command {
        DevicesCommand::List => {
            let snapshot = Snapshot::from_devices(client.get_devices().await?);
            let mut states: Vec<&DeviceState> = snapshot.devices.values().collect();
            states.sort_by(|a, b| a.device_id().cmp(b.device_id()));

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &states,
                |d| DeviceRow::new(d, color),
                |d| d.device_id().to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Status { device } => {
            send(&client, &device, DeviceCommand::GetStatus, global).await
        }

        DevicesCommand::Command { device, command } => send(&client, &device, command, global).await,
    }
}

async fn send(
    client: &SolityClient,
    device_id: &str,
    command: DeviceCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let response = client.control(device_id, command).await?;
    let out = output::render_single(&global.output, &response, response_detail, |r| {
        r.result.map_or_else(String::new, |c| c.to_string())
    });
    output::print_output(&out, global.quiet);
    util::check_control(command, &response)
}
