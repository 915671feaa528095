// ── Host boundary ──
//
// What a home-automation host calls into: set up one account, register
// its entities, tear it down again. The host owns the HTTP client and the
// entity registry; the integration owns the API session and the poller.

use std::sync::Arc;

use solity_api::{Device, SolityClient, TransportConfig};
use tracing::{debug, info};

use crate::DOMAIN;
use crate::config::IntegrationConfig;
use crate::coordinator::Coordinator;
use crate::entity::{BatterySensor, LockEntity};
use crate::error::CoreError;

/// Callbacks a host provides to receive entities.
pub trait EntityRegistry {
    fn add_locks(&mut self, locks: Vec<LockEntity>);
    fn add_sensors(&mut self, sensors: Vec<BatterySensor>);
}

/// Registry that just collects entities. Used by the CLI and tests.
#[derive(Debug, Default)]
pub struct EntitySet {
    pub locks: Vec<LockEntity>,
    pub sensors: Vec<BatterySensor>,
}

impl EntityRegistry for EntitySet {
    fn add_locks(&mut self, locks: Vec<LockEntity>) {
        self.locks.extend(locks);
    }

    fn add_sensors(&mut self, sensors: Vec<BatterySensor>) {
        self.sensors.extend(sensors);
    }
}

impl EntitySet {
    pub fn lock(&self, device_id: &str) -> Option<&LockEntity> {
        self.locks.iter().find(|l| l.device_id() == device_id)
    }

    pub fn sensor(&self, device_id: &str) -> Option<&BatterySensor> {
        self.sensors.iter().find(|s| s.device_id() == device_id)
    }
}

/// One configured account: client, coordinator and the device list seen
/// at setup.
pub struct Integration {
    config: IntegrationConfig,
    http: reqwest::Client,
    client: Arc<SolityClient>,
    coordinator: Coordinator,
    devices: Vec<Device>,
}

impl Integration {
    /// Log in, list devices, run the first refresh and start polling.
    ///
    /// Any failure aborts setup before a single entity exists. Bad
    /// credentials come back as [`CoreError::AuthenticationFailed`],
    /// anything else as a retryable error.
    pub async fn setup(config: IntegrationConfig, http: reqwest::Client) -> Result<Self, CoreError> {
        let client = Arc::new(
            SolityClient::with_client(http.clone(), config.base_url.clone(), config.credentials.clone())
                .with_timeout(config.timeout),
        );

        client.login().await?;
        let devices = client.get_devices().await?;
        debug!(devices = devices.len(), "initial device list");

        let coordinator = Coordinator::new(DOMAIN, Arc::clone(&client), config.update_interval);
        coordinator.first_refresh().await?;
        coordinator.start().await;

        info!(
            username = client.username(),
            devices = devices.len(),
            "integration set up"
        );

        Ok(Self {
            config,
            http,
            client,
            coordinator,
            devices,
        })
    }

    /// Set up with a private HTTP client built from the config.
    pub async fn connect(config: IntegrationConfig) -> Result<Self, CoreError> {
        let http = TransportConfig::default()
            .with_timeout(config.timeout)
            .build_client()?;
        Self::setup(config, http).await
    }

    /// Register one lock and one battery sensor per device seen at setup.
    pub fn forward_entities(&self, registry: &mut impl EntityRegistry) {
        registry.add_locks(
            self.devices
                .iter()
                .map(|d| LockEntity::new(self.coordinator.clone(), d))
                .collect(),
        );
        registry.add_sensors(
            self.devices
                .iter()
                .map(|d| BatterySensor::new(self.coordinator.clone(), d))
                .collect(),
        );
    }

    /// Convenience wrapper around [`forward_entities`](Self::forward_entities).
    pub fn entities(&self) -> EntitySet {
        let mut set = EntitySet::default();
        self.forward_entities(&mut set);
        set
    }

    /// Stop polling and drop the session.
    pub async fn unload(self) {
        self.coordinator.shutdown().await;
        self.client.logout().await;
        info!(username = self.client.username(), "integration unloaded");
    }

    /// Unload, then set up again with `config` on the same HTTP client.
    pub async fn reload(self, config: IntegrationConfig) -> Result<Self, CoreError> {
        let http = self.http.clone();
        self.unload().await;
        Self::setup(config, http).await
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<SolityClient> {
        &self.client
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Device list from setup. Entities are created from this list only.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }
}
