// ── Battery sensor ──

use solity_api::Device;

use super::{DeviceInfo, Entity, Platform, unique_id};
use crate::coordinator::Coordinator;

/// Battery level of one lock, in percent.
#[derive(Clone)]
pub struct BatterySensor {
    coordinator: Coordinator,
    device_id: String,
    unique_id: String,
    device_info: DeviceInfo,
}

impl BatterySensor {
    pub const UNIT: &'static str = "%";
    pub const DEVICE_CLASS: &'static str = "battery";
    pub const STATE_CLASS: &'static str = "measurement";

    pub fn new(coordinator: Coordinator, device: &Device) -> Self {
        Self {
            coordinator,
            device_id: device.my_device_id.clone(),
            unique_id: unique_id(&device.my_device_id, "battery"),
            device_info: DeviceInfo::from_device(device),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// `None` before the first snapshot, `0` for a device the snapshot
    /// no longer lists.
    pub fn native_value(&self) -> Option<u8> {
        let snapshot = self.coordinator.snapshot()?;
        Some(snapshot.get(&self.device_id).map_or(0, |d| d.battery))
    }

    pub fn unit_of_measurement(&self) -> &'static str {
        Self::UNIT
    }

    pub fn device_class(&self) -> &'static str {
        Self::DEVICE_CLASS
    }
}

impl Entity for BatterySensor {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn name(&self) -> &str {
        "Battery"
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    fn platform(&self) -> Platform {
        Platform::Sensor
    }

    fn available(&self) -> bool {
        self.coordinator.is_device_available(&self.device_id)
    }
}

impl std::fmt::Debug for BatterySensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatterySensor")
            .field("unique_id", &self.unique_id)
            .finish_non_exhaustive()
    }
}
