// Vendor response shapes
//
// Every endpoint answers with `{ result, errorMessage?, contents? }`.
// Records keep unknown fields in a flattened `extra` map so schema drift
// shows up in one place instead of failing the whole poll.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// The `{ result, errorMessage, contents }` envelope.
///
/// `result == 0` means success. Callers decide what a missing `result` means.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub result: Option<i64>,
    pub error_message: Option<String>,
    pub contents: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.result == Some(0)
    }

    /// Vendor error message, or `fallback` if the envelope carries none.
    pub fn error_message_or(&self, fallback: &str) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| fallback.to_owned())
    }
}

/// `contents` of a successful `/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginContents {
    pub auth_token: Option<String>,
    pub auth_pwd: Option<String>,
}

/// `contents` of `/myDevice`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceListContents {
    #[serde(default, deserialize_with = "device_list")]
    pub my_device_list: Vec<Device>,
}

/// `contents` of `/retrieveLog/page/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LogListContents {
    #[serde(default)]
    pub log_list: Vec<LogEntry>,
}

/// A lock registered to the account, as returned by `/myDevice`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, deserialize_with = "device_id")]
    pub my_device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Percent, 0-100. Some firmware reports it as a string; anything
    /// unreadable becomes `None`.
    #[serde(
        default,
        deserialize_with = "battery_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub battery: Option<u8>,
    /// `"Y"` when the lock's gateway is online. Non-string scalars are
    /// kept in their JSON text form, so they never read as online.
    #[serde(
        default,
        deserialize_with = "scalar_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_connection_status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn is_gateway_connected(&self) -> bool {
        self.gateway_connection_status.as_deref() == Some("Y")
    }
}

/// One entry from the activity log. The vendor does not document the
/// fields, so the record is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry {
    pub fields: Map<String, Value>,
}

impl LogEntry {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Raw answer to a `/controlDevice` request.
///
/// Not validated by the client: callers that care check [`is_success`](Self::is_success).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ControlResponse {
    pub fn is_success(&self) -> bool {
        self.result == Some(0)
    }
}

/// Entries that are not device records at all are skipped so the rest of
/// the account still polls.
fn device_list<'de, D>(deserializer: D) -> Result<Vec<Device>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|entry| {
            serde_json::from_value(entry)
                .inspect_err(|e| warn!(error = %e, "skipping unreadable device record"))
                .ok()
        })
        .collect())
}

/// Ids come back as strings or bare numbers depending on the account.
fn device_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "myDeviceId: expected string or number, got {other}"
        ))),
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Accept `55`, `55.0` or `"55"`. Anything else (negative, out of range,
/// empty, non-numeric) is logged and treated as unknown.
#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn battery_level<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)?.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let level = match &raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    let level = level.and_then(|l| u8::try_from(l).ok()).filter(|l| *l <= 100);
    if level.is_none() {
        warn!(battery = %raw, "unreadable battery level");
    }
    Ok(level)
}
