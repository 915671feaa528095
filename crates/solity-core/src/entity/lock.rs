// ── Lock entity ──

use serde::Serialize;
use solity_api::{ControlResponse, Device};
use tracing::{debug, error, warn};

use super::{DeviceInfo, Entity, Platform, unique_id};
use crate::coordinator::Coordinator;

/// Extra attributes exposed alongside the lock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockAttributes {
    pub battery_level: u8,
    pub model: String,
    pub firmware: String,
    pub gateway_connected: bool,
}

/// A LAVO lock. Reads come from the coordinator snapshot; lock and unlock
/// go straight to the API and record their outcome optimistically.
#[derive(Clone)]
pub struct LockEntity {
    coordinator: Coordinator,
    device_id: String,
    unique_id: String,
    name: String,
    device_info: DeviceInfo,
}

impl LockEntity {
    pub fn new(coordinator: Coordinator, device: &Device) -> Self {
        Self {
            coordinator,
            device_id: device.my_device_id.clone(),
            unique_id: unique_id(&device.my_device_id, "lock"),
            name: device.nickname.clone().unwrap_or_else(|| "Lock".into()),
            device_info: DeviceInfo::from_device(device),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// `None` until a command succeeds, and again after every poll.
    pub fn is_locked(&self) -> Option<bool> {
        self.coordinator
            .device(&self.device_id)
            .and_then(|d| d.is_locked)
    }

    /// `None` before the first snapshot. A device missing from the
    /// snapshot reports the default values.
    pub fn extra_state_attributes(&self) -> Option<LockAttributes> {
        let snapshot = self.coordinator.snapshot()?;
        let attrs = match snapshot.get(&self.device_id) {
            Some(d) => LockAttributes {
                battery_level: d.battery,
                model: d.model.clone(),
                firmware: d.firmware.clone(),
                gateway_connected: d.gateway_connected,
            },
            None => LockAttributes {
                battery_level: 0,
                model: "Unknown".into(),
                firmware: "Unknown".into(),
                gateway_connected: false,
            },
        };
        Some(attrs)
    }

    /// Send `close`. On success `is_locked` becomes `true`.
    ///
    /// The vendor `result` code is not checked; callers that care can
    /// inspect the returned response.
    pub async fn lock(&self) -> Result<ControlResponse, solity_api::Error> {
        debug!(device_id = %self.device_id, "locking device");
        let response = self
            .coordinator
            .client()
            .lock(&self.device_id)
            .await
            .inspect_err(|e| error!(device_id = %self.device_id, error = %e, "failed to lock device"))?;
        self.commit(true, &response);
        Ok(response)
    }

    /// Send `open`. On success `is_locked` becomes `false`.
    pub async fn unlock(&self) -> Result<ControlResponse, solity_api::Error> {
        debug!(device_id = %self.device_id, "unlocking device");
        let response = self
            .coordinator
            .client()
            .unlock(&self.device_id)
            .await
            .inspect_err(|e| error!(device_id = %self.device_id, error = %e, "failed to unlock device"))?;
        self.commit(false, &response);
        Ok(response)
    }

    /// Same as [`unlock()`](Self::unlock) on this hardware.
    pub async fn open(&self) -> Result<ControlResponse, solity_api::Error> {
        self.unlock().await
    }

    fn commit(&self, locked: bool, response: &ControlResponse) {
        if !response.is_success() {
            warn!(
                device_id = %self.device_id,
                result = ?response.result,
                message = response.error_message.as_deref().unwrap_or_default(),
                "vendor reported a non-zero result"
            );
        }
        if !self.coordinator.record_lock_state(&self.device_id, locked) {
            debug!(device_id = %self.device_id, "device not in snapshot, lock state not recorded");
        }
    }
}

impl Entity for LockEntity {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    fn platform(&self) -> Platform {
        Platform::Lock
    }

    fn available(&self) -> bool {
        self.coordinator.is_device_available(&self.device_id)
    }
}

impl std::fmt::Debug for LockEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockEntity")
            .field("unique_id", &self.unique_id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
