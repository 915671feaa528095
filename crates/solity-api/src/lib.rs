// solity-api: Async Rust client for the Solity LAVO cloud API

pub mod auth;
pub mod client;
pub mod command;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{Credentials, Session};
pub use client::SolityClient;
pub use command::DeviceCommand;
pub use error::{Error, ErrorKind};
pub use models::{ControlResponse, Device, Envelope, LogEntry};
pub use transport::TransportConfig;

/// Base URL of the vendor REST API.
pub const API_BASE_URL: &str = "https://www.smartsolity.com/api_v2";

/// User agent the vendor's mobile app sends; the API expects it.
pub const USER_AGENT: &str = "okhttp/4.9.1";
