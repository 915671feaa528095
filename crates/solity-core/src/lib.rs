//! Polling and state layer between `solity-api` and a home-automation host.
//!
//! - **[`Coordinator`]**: owns the polling loop. Each cycle lists the
//!   account's locks, builds a fresh [`Snapshot`], replaces the previous one
//!   wholesale and notifies subscribers through a `watch` channel. Failures
//!   come back as [`CoordinatorError`]: auth-required or update-failed.
//!
//! - **Entities** ([`LockEntity`], [`BatterySensor`]): thin views over the
//!   coordinator's snapshot. The lock also sends commands straight through
//!   the API client and records the optimistic result in the snapshot.
//!
//! - **[`Integration`]**: the host boundary: setup (login, initial device
//!   list, first refresh, start polling), entity registration, unload and
//!   reload.

pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod integration;
pub mod model;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::IntegrationConfig;
pub use coordinator::{Coordinator, RefreshState};
pub use entity::{BatterySensor, DeviceInfo, Entity, LockAttributes, LockEntity, Platform};
pub use error::{CoordinatorError, CoreError};
pub use integration::{EntityRegistry, EntitySet, Integration};
pub use model::{DeviceState, Snapshot};
pub use stream::{SnapshotStream, SnapshotWatchStream};

pub use solity_api::{Credentials, Device, DeviceCommand};

/// Integration domain, used in unique ids and device identifiers.
pub const DOMAIN: &str = "solity";
