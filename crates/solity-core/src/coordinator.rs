// ── Update coordinator ──
//
// Owns the polling loop and the canonical snapshot. Each cycle lists the
// account's devices, derives a fresh `Snapshot` and replaces the previous
// one wholesale. Subscribers are notified through a `watch` channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use solity_api::SolityClient;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::CoordinatorError;
use crate::model::{DeviceState, Snapshot};
use crate::stream::SnapshotStream;

// ── RefreshState ─────────────────────────────────────────────────

/// Where the coordinator is in its refresh cycle.
///
/// `Succeeded`, `UpdateFailed` and `AuthFailed` describe the idle period
/// after a cycle, until the next one starts.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
pub enum RefreshState {
    /// No refresh has run yet.
    Idle,
    Refreshing,
    Succeeded,
    UpdateFailed { message: String },
    /// Terminal until the integration is reloaded with new credentials.
    AuthFailed { message: String },
}

// ── Coordinator ──────────────────────────────────────────────────

/// Periodic refresher and single source of truth for entity state.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    name: String,
    client: Arc<SolityClient>,
    update_interval: Duration,
    /// `None` until the first successful refresh.
    snapshot: watch::Sender<Option<Arc<Snapshot>>>,
    refresh_state: watch::Sender<RefreshState>,
    last_update_success: AtomicBool,
    /// Cancellation token and join handle of the running poll task.
    poller: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl Coordinator {
    /// Create a coordinator. Does NOT poll -- call
    /// [`first_refresh()`](Self::first_refresh) then [`start()`](Self::start).
    pub fn new(name: impl Into<String>, client: Arc<SolityClient>, update_interval: Duration) -> Self {
        let (snapshot, _) = watch::channel(None);
        let (refresh_state, _) = watch::channel(RefreshState::Idle);

        Self {
            inner: Arc::new(CoordinatorInner {
                name: name.into(),
                client,
                update_interval,
                snapshot,
                refresh_state,
                last_update_success: AtomicBool::new(false),
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn client(&self) -> &Arc<SolityClient> {
        &self.inner.client
    }

    pub fn update_interval(&self) -> Duration {
        self.inner.update_interval
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// The refresh that gates startup.
    ///
    /// Same as [`refresh()`](Self::refresh); the caller must abort setup on
    /// error so nothing ever observes a coordinator without data.
    pub async fn first_refresh(&self) -> Result<(), CoordinatorError> {
        self.refresh().await.inspect_err(|e| {
            error!(coordinator = %self.inner.name, error = %e, "first refresh failed");
        })
    }

    /// Run one refresh cycle.
    ///
    /// On success the snapshot is replaced wholesale, which drops ids that
    /// left the device list and resets every `is_locked` to unknown. On
    /// failure the previous snapshot is kept.
    pub async fn refresh(&self) -> Result<(), CoordinatorError> {
        self.inner.refresh_state.send_replace(RefreshState::Refreshing);

        match self.inner.client.get_devices().await {
            Ok(devices) => {
                let snapshot = Snapshot::from_devices(devices);
                debug!(devices = snapshot.len(), "snapshot replaced");
                self.inner.snapshot.send_replace(Some(Arc::new(snapshot)));
                self.inner.last_update_success.store(true, Ordering::Release);
                self.inner.refresh_state.send_replace(RefreshState::Succeeded);
                Ok(())
            }
            Err(e) => {
                let err = CoordinatorError::from(e);
                self.inner.last_update_success.store(false, Ordering::Release);
                let state = match &err {
                    CoordinatorError::AuthRequired { source } => RefreshState::AuthFailed {
                        message: source.to_string(),
                    },
                    CoordinatorError::UpdateFailed { source, .. } => RefreshState::UpdateFailed {
                        message: source.to_string(),
                    },
                };
                self.inner.refresh_state.send_replace(state);
                Err(err)
            }
        }
    }

    // ── Polling lifecycle ────────────────────────────────────────

    /// Spawn the polling task. No-op if it is already running.
    pub async fn start(&self) {
        let mut poller = self.inner.poller.lock().await;
        if poller.as_ref().is_some_and(|(_, handle)| !handle.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let span = info_span!("coordinator", name = %self.inner.name);
        let handle = tokio::spawn(
            refresh_task(self.clone(), self.inner.update_interval, cancel.clone()).instrument(span),
        );
        *poller = Some((cancel, handle));
        info!(
            interval_secs = self.inner.update_interval.as_secs(),
            "polling started"
        );
    }

    /// Cancel the polling task and wait for it to finish.
    ///
    /// A refresh in flight is abandoned and commits nothing.
    pub async fn shutdown(&self) {
        let Some((cancel, handle)) = self.inner.poller.lock().await.take() else {
            return;
        };
        cancel.cancel();
        if let Err(e) = handle.await {
            warn!(error = %e, "polling task ended abnormally");
        }
        debug!("polling stopped");
    }

    /// Whether the polling task is alive.
    pub async fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }

    // ── State observation ────────────────────────────────────────

    /// The latest snapshot, or `None` before the first successful refresh.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.borrow().clone()
    }

    /// Current state of one device.
    pub fn device(&self, device_id: &str) -> Option<DeviceState> {
        self.inner
            .snapshot
            .borrow()
            .as_ref()
            .and_then(|snap| snap.get(device_id).cloned())
    }

    /// Unavailable without a snapshot, without an entry, or when the
    /// device's gateway is offline.
    pub fn is_device_available(&self, device_id: &str) -> bool {
        self.inner
            .snapshot
            .borrow()
            .as_ref()
            .and_then(|snap| snap.get(device_id))
            .is_some_and(|d| d.gateway_connected)
    }

    /// Subscribe to snapshot replacements and lock-state updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot.subscribe()
    }

    /// Stream of snapshots, starting with the current one.
    pub fn updates(&self) -> SnapshotStream {
        SnapshotStream::new(self.subscribe())
    }

    /// Subscribe to refresh state changes.
    pub fn refresh_state(&self) -> watch::Receiver<RefreshState> {
        self.inner.refresh_state.subscribe()
    }

    /// Whether the most recent refresh succeeded.
    pub fn last_update_success(&self) -> bool {
        self.inner.last_update_success.load(Ordering::Acquire)
    }

    // ── Optimistic updates ───────────────────────────────────────

    /// Record the outcome of a lock/unlock command in the current snapshot
    /// and notify subscribers. Returns `false` if the device has no entry.
    ///
    /// The next poll replaces the snapshot and forgets this value.
    pub fn record_lock_state(&self, device_id: &str, locked: bool) -> bool {
        self.inner.snapshot.send_if_modified(|slot| {
            let Some(snapshot) = slot.as_mut() else {
                return false;
            };
            let Some(entry) = Arc::make_mut(snapshot).devices.get_mut(device_id) else {
                return false;
            };
            entry.is_locked = Some(locked);
            true
        })
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Refresh every `period` until cancelled or credentials are rejected.
///
/// A failed cycle is not retried; the next tick is the retry.
async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // first refresh already happened during setup

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                coordinator.inner.refresh_state.send_if_modified(|state| {
                    let interrupted = matches!(state, RefreshState::Refreshing);
                    if interrupted {
                        *state = RefreshState::Idle;
                    }
                    interrupted
                });
                break;
            }
            result = coordinator.refresh() => result,
        };

        match result {
            Ok(()) => {}
            Err(e) if e.is_auth_required() => {
                error!(error = %e, "credentials rejected, polling stopped until reload");
                break;
            }
            Err(e) => warn!(error = %e, "periodic refresh failed, keeping last snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solity_api::Credentials;
    use url::Url;

    fn offline_coordinator() -> Coordinator {
        let client = SolityClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/api_v2").expect("url"),
            Credentials::new("a@b.c", "pw"),
        );
        Coordinator::new("test", Arc::new(client), Duration::from_secs(60))
    }

    #[test]
    fn fresh_coordinator_has_no_data() {
        let coordinator = offline_coordinator();
        assert!(coordinator.snapshot().is_none());
        assert!(!coordinator.last_update_success());
        assert!(!coordinator.is_device_available("A1"));
        assert_eq!(*coordinator.refresh_state().borrow(), RefreshState::Idle);
    }

    #[test]
    fn lock_state_needs_a_snapshot_entry() {
        let coordinator = offline_coordinator();
        assert!(!coordinator.record_lock_state("A1", true));

        let device = serde_json::from_value(serde_json::json!({
            "myDeviceId": "A1",
            "gatewayConnectionStatus": "Y"
        }))
        .expect("device");
        coordinator
            .inner
            .snapshot
            .send_replace(Some(Arc::new(Snapshot::from_devices([device]))));

        assert!(coordinator.record_lock_state("A1", true));
        assert!(!coordinator.record_lock_state("B2", true));
        assert_eq!(coordinator.device("A1").and_then(|d| d.is_locked), Some(true));
        assert!(coordinator.is_device_available("A1"));
    }
}
