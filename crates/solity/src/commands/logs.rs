//! Activity log handler.

use serde::Serialize;
use solity_api::LogEntry;
use solity_core::IntegrationConfig;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

/// A log entry with its position on the page. Serializes as the bare entry.
#[derive(Serialize)]
#[serde(transparent)]
struct Numbered<'a> {
    #[serde(skip)]
    position: usize,
    entry: &'a LogEntry,
}

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Entry")]
    entry: String,
}

/// One line per entry: `key=value` pairs in key order.
fn summarize(entry: &LogEntry) -> String {
    entry
        .fields
        .iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => format!("{k}={s}"),
            other => format!("{k}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn handle(
    config: &IntegrationConfig,
    device_id: &str,
    page: u32,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = util::build_client(config)?;
    let entries = client.get_logs(device_id, page).await?;

    let numbered: Vec<Numbered<'_>> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| Numbered {
            position: i + 1,
            entry,
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &numbered,
        |n| LogRow {
            position: n.position,
            entry: summarize(n.entry),
        },
        |n| summarize(n.entry),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
