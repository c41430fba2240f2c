use serde::{Deserialize, Serialize};

use crate::models::{AlerteResponse, DeviceStatus, MesureResponse};

/// Push message relayed to dashboards over the live socket.
///
/// Serialized as `{"type": "...", "data": ...}`.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LiveMessage {
    /// A reading was stored.
    Mesure(MesureResponse),
    /// A device changed presence.
    IotStatusUpdate(DeviceStatus),
    /// Presence of every device, sent once on connection.
    IotStatusSnapshot(Vec<DeviceStatus>),
    /// A device came online.
    IotConnected(DeviceStatus),
    /// A device went silent for longer than the offline timeout.
    IotDisconnected(DeviceStatus),
    /// A threshold violation was recorded.
    Alerte(AlerteResponse),
}

impl LiveMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            LiveMessage::Mesure(_) => "mesure",
            LiveMessage::IotStatusUpdate(_) => "iot_status_update",
            LiveMessage::IotStatusSnapshot(_) => "iot_status_snapshot",
            LiveMessage::IotConnected(_) => "iot_connected",
            LiveMessage::IotDisconnected(_) => "iot_disconnected",
            LiveMessage::Alerte(_) => "alerte",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
