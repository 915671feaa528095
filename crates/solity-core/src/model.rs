// ── Snapshot domain types ──
//
// A `Snapshot` is rebuilt from scratch on every successful poll. Its keys
// are exactly the device ids of the latest device list.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use solity_api::Device;

/// Derived state of one lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceState {
    /// The vendor record this entry was derived from.
    pub info: Device,
    /// Percent; 0 when the vendor omits it.
    pub battery: u8,
    /// Not reported by the device list. `None` after every poll; set only
    /// by the outcome of a lock/unlock command.
    pub is_locked: Option<bool>,
    pub model: String,
    pub nickname: String,
    pub firmware: String,
    pub gateway_connected: bool,
}

impl DeviceState {
    pub fn from_device(device: Device) -> Self {
        Self {
            battery: device.battery.unwrap_or(0),
            is_locked: None,
            model: device
                .model_name
                .clone()
                .unwrap_or_else(|| "Unknown".into()),
            nickname: device
                .nickname
                .clone()
                .unwrap_or_else(|| "Solity Lock".into()),
            firmware: device
                .firmware_version
                .clone()
                .unwrap_or_else(|| "Unknown".into()),
            gateway_connected: device.is_gateway_connected(),
            info: device,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.info.my_device_id
    }
}

/// Per-device state from one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub devices: HashMap<String, DeviceState>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot from a device list. A repeated id keeps the last record.
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let devices = devices
            .into_iter()
            .map(|d| (d.my_device_id.clone(), DeviceState::from_device(d)))
            .collect();
        Self {
            devices,
            fetched_at: Utc::now(),
        }
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceState> {
        self.devices.get(device_id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Device ids, sorted for stable output.
    pub fn device_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.devices.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn device(value: serde_json::Value) -> Device {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_fields_take_defaults() {
        let state = DeviceState::from_device(device(json!({ "myDeviceId": "A1" })));

        assert_eq!(state.battery, 0);
        assert_eq!(state.model, "Unknown");
        assert_eq!(state.nickname, "Solity Lock");
        assert_eq!(state.firmware, "Unknown");
        assert!(!state.gateway_connected);
        assert_eq!(state.is_locked, None);
    }

    #[test]
    fn present_fields_are_copied() {
        let state = DeviceState::from_device(device(json!({
            "myDeviceId": "A1",
            "nickname": "Front door",
            "modelName": "LAVO X",
            "firmwareVersion": "2.1.0",
            "battery": 80,
            "gatewayConnectionStatus": "Y"
        })));

        assert_eq!(state.device_id(), "A1");
        assert_eq!(state.battery, 80);
        assert_eq!(state.model, "LAVO X");
        assert_eq!(state.nickname, "Front door");
        assert_eq!(state.firmware, "2.1.0");
        assert!(state.gateway_connected);
    }

    #[test]
    fn snapshot_has_one_entry_per_device_id() {
        let snap = Snapshot::from_devices(vec![
            device(json!({ "myDeviceId": "B2", "battery": 10 })),
            device(json!({ "myDeviceId": "A1" })),
            device(json!({ "myDeviceId": "B2", "battery": 20 })),
        ]);

        assert_eq!(snap.len(), 2);
        assert_eq!(snap.device_ids(), vec!["A1", "B2"]);
        assert_eq!(snap.get("B2").unwrap().battery, 20);
    }
}
