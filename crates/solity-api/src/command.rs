use serde::{Deserialize, Serialize};

/// Command codes accepted by `PUT /controlDevice/{id}`.
///
/// Only `get_status`, `open` and `close` have dedicated client methods;
/// the rest go through [`SolityClient::control`](crate::SolityClient::control).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceCommand {
    GetStatus,
    Open,
    Close,
    ConnectGateway,
    GetFingerprint,
    #[serde(rename = "get_pwdinfo")]
    #[strum(serialize = "get_pwdinfo")]
    GetPasswordInfo,
}
