// Device endpoints
//
// Listing, remote control, and activity logs. All of them ensure a session
// first; only `get_devices` validates the envelope's `result`.

use reqwest::Method;
use serde_json::json;
use tracing::debug;

use crate::client::SolityClient;
use crate::command::DeviceCommand;
use crate::error::Error;
use crate::models::{ControlResponse, Device, DeviceListContents, Envelope, LogEntry, LogListContents};

impl SolityClient {
    /// List every lock registered to the account.
    ///
    /// `GET /myDevice`. Fails with [`Error::Api`] when `result != 0`.
    pub async fn get_devices(&self) -> Result<Vec<Device>, Error> {
        let url = self.endpoint(&["myDevice"])?;
        let envelope: Envelope<DeviceListContents> = self.authed(Method::GET, url, None).await?;

        if !envelope.is_success() {
            return Err(Error::api(envelope.error_message_or("Failed to get devices")));
        }

        let devices = envelope.contents.unwrap_or_default().my_device_list;
        debug!(count = devices.len(), "fetched device list");
        Ok(devices)
    }

    /// Send a command code to a lock.
    ///
    /// `PUT /controlDevice/{id}` with `{command}`. The response is returned
    /// as-is; a non-zero `result` is *not* an error here.
    pub async fn control(
        &self,
        device_id: &str,
        command: DeviceCommand,
    ) -> Result<ControlResponse, Error> {
        let url = self.endpoint(&["controlDevice", device_id])?;
        debug!(device_id, %command, "sending device command");
        let body = json!({ "command": command });
        self.authed(Method::PUT, url, Some(&body)).await
    }

    /// Ask the lock for its status. Raw envelope; check `result` yourself.
    pub async fn get_device_status(&self, device_id: &str) -> Result<ControlResponse, Error> {
        self.control(device_id, DeviceCommand::GetStatus).await
    }

    /// Lock (`close`). Raw envelope; check `result` yourself.
    pub async fn lock(&self, device_id: &str) -> Result<ControlResponse, Error> {
        self.control(device_id, DeviceCommand::Close).await
    }

    /// Unlock (`open`). Raw envelope; check `result` yourself.
    pub async fn unlock(&self, device_id: &str) -> Result<ControlResponse, Error> {
        self.control(device_id, DeviceCommand::Open).await
    }

    /// One page of the lock's activity log (pages start at 1).
    ///
    /// `GET /retrieveLog/page/{id}?page=N`.
    pub async fn get_logs(&self, device_id: &str, page: u32) -> Result<Vec<LogEntry>, Error> {
        let mut url = self.endpoint(&["retrieveLog", "page", device_id])?;
        url.query_pairs_mut().append_pair("page", &page.to_string());

        let envelope: Envelope<LogListContents> = self.authed(Method::GET, url, None).await?;
        Ok(envelope.contents.unwrap_or_default().log_list)
    }
}
