use aquaferme_api::models::MesureResponse;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Mesure {
    pub id: i32,
    pub bassin_id: i32,
    pub timestamp: OffsetDateTime,
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    pub oxygen: Option<f64>,
    pub salinity: Option<f64>,
    pub turbidity: Option<f64>,
}

impl From<Mesure> for MesureResponse {
    fn from(mesure: Mesure) -> Self {
        MesureResponse {
            id: mesure.id,
            bassin_id: mesure.bassin_id,
            timestamp: mesure.timestamp,
            temperature: mesure.temperature,
            ph: mesure.ph,
            oxygen: mesure.oxygen,
            salinity: mesure.salinity,
            turbidity: mesure.turbidity,
        }
    }
}

#[derive(Clone)]
pub struct MesureTable;

impl Table for MesureTable {
    fn name(&self) -> &'static str {
        "mesures"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS mesures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bassin_id INTEGER NOT NULL,
                timestamp TIMESTAMP NOT NULL,
                temperature REAL,
                ph REAL,
                oxygen REAL,
                salinity REAL,
                turbidity REAL,
                FOREIGN KEY (bassin_id) REFERENCES bassins (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS mesures;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["bassins"]
    }
}
