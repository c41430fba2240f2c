use aquaferme_api::models::{DeviceResponse, DeviceStatus};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i32,
    pub nom: String,
    pub bassin_id: Option<i32>,
    pub type_capteur: Option<String>,
    pub device_key: String,
    pub online: bool,
    pub last_seen: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl Device {
    pub fn status(&self) -> DeviceStatus {
        DeviceStatus {
            device_id: self.id,
            nom: self.nom.clone(),
            bassin_id: self.bassin_id,
            online: self.online,
            last_seen: self.last_seen,
        }
    }
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        DeviceResponse {
            id: device.id,
            nom: device.nom,
            bassin_id: device.bassin_id,
            type_capteur: device.type_capteur,
            online: device.online,
            last_seen: device.last_seen,
            created_at: device.created_at,
        }
    }
}

#[derive(Clone)]
pub struct DeviceTable;

impl Table for DeviceTable {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nom VARCHAR(255) NOT NULL UNIQUE,
                bassin_id INTEGER,
                type_capteur TEXT,
                device_key TEXT NOT NULL UNIQUE,
                online BOOLEAN NOT NULL DEFAULT FALSE,
                last_seen TIMESTAMP,
                created_at TIMESTAMP NOT NULL,
                FOREIGN KEY (bassin_id) REFERENCES bassins (id) ON DELETE SET NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS devices;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["bassins"]
    }
}
