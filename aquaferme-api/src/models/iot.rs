use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceRequest {
    /// Device name, unique
    pub nom: String,
    /// Tank the sensor is installed in
    pub bassin_id: Option<Id>,
    /// Probe model or kind
    pub type_capteur: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDeviceRequest {
    pub nom: Option<String>,
    pub bassin_id: Option<Id>,
    pub type_capteur: Option<String>,
    /// Issue a new device key, the previous one stops working
    #[serde(default)]
    pub regenerate_key: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub id: Id,
    pub nom: String,
    pub bassin_id: Option<Id>,
    pub type_capteur: Option<String>,
    pub online: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_seen: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Returned only when a key is issued.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceKeyResponse {
    #[serde(flatten)]
    pub device: DeviceResponse,
    pub device_key: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub device_id: Id,
    pub nom: String,
    pub bassin_id: Option<Id>,
    pub online: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_seen: Option<OffsetDateTime>,
}
