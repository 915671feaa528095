// ── Entity adapters ──
//
// Presentation views over the coordinator's snapshot. Entities hold no
// device state of their own; every read goes through the coordinator.

mod lock;
mod sensor;

use serde::Serialize;
use solity_api::Device;

pub use lock::{LockAttributes, LockEntity};
pub use sensor::BatterySensor;

use crate::DOMAIN;

/// Host platform an entity registers under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Lock,
    Sensor,
}

/// Behaviour shared by every entity the integration registers.
pub trait Entity: Send + Sync {
    /// Stable across restarts: `solity_{device_id}_{suffix}`.
    fn unique_id(&self) -> &str;
    fn name(&self) -> &str;
    fn device_info(&self) -> &DeviceInfo;
    fn platform(&self) -> Platform;
    /// Derived from the coordinator snapshot on every call.
    fn available(&self) -> bool;
}

/// Physical device an entity belongs to, as shown in the host's device
/// registry. Built once from the device list seen at setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(domain, device_id)` pairs.
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: String,
}

impl DeviceInfo {
    pub fn from_device(device: &Device) -> Self {
        Self {
            identifiers: vec![(DOMAIN.to_owned(), device.my_device_id.clone())],
            name: device
                .nickname
                .clone()
                .unwrap_or_else(|| "Solity Lock".into()),
            manufacturer: device
                .manufacturer
                .clone()
                .unwrap_or_else(|| "Solity".into()),
            model: device.model_name.clone().unwrap_or_else(|| "LAVO".into()),
            sw_version: device
                .firmware_version
                .clone()
                .unwrap_or_else(|| "Unknown".into()),
        }
    }
}

pub(crate) fn unique_id(device_id: &str, suffix: &str) -> String {
    format!("{DOMAIN}_{device_id}_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn device_info_defaults_differ_from_snapshot_defaults() {
        let device: Device = serde_json::from_value(json!({ "myDeviceId": "A1" })).expect("device");
        let info = DeviceInfo::from_device(&device);

        assert_eq!(info.identifiers, vec![("solity".to_owned(), "A1".to_owned())]);
        assert_eq!(info.name, "Solity Lock");
        assert_eq!(info.manufacturer, "Solity");
        assert_eq!(info.model, "LAVO");
        assert_eq!(info.sw_version, "Unknown");
    }

    #[test]
    fn device_info_uses_vendor_fields() {
        let device: Device = serde_json::from_value(json!({
            "myDeviceId": "B2",
            "nickname": "Front Door",
            "manufacturer": "Solity Co.",
            "modelName": "LAVO-X",
            "firmwareVersion": "2.1.0"
        }))
        .expect("device");
        let info = DeviceInfo::from_device(&device);

        assert_eq!(info.name, "Front Door");
        assert_eq!(info.manufacturer, "Solity Co.");
        assert_eq!(info.model, "LAVO-X");
        assert_eq!(info.sw_version, "2.1.0");
    }

    #[test]
    fn unique_ids_are_namespaced() {
        assert_eq!(unique_id("A1", "lock"), "solity_A1_lock");
        assert_eq!(Platform::Sensor.to_string(), "sensor");
    }
}
