use aquaferme_api::models::AlerteResponse;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Alerte {
    pub id: i32,
    pub bassin_id: Option<i32>,
    /// Measured parameter that triggered the alert, empty for manual notices
    pub parametre: Option<String>,
    pub message: String,
    pub type_alerte: String,
    pub date: OffsetDateTime,
    pub resolved: bool,
}

impl From<Alerte> for AlerteResponse {
    fn from(alerte: Alerte) -> Self {
        AlerteResponse {
            id: alerte.id,
            bassin_id: alerte.bassin_id,
            parametre: alerte.parametre,
            message: alerte.message,
            alerte_type: alerte.type_alerte.into(),
            date: alerte.date,
            resolved: alerte.resolved,
        }
    }
}

#[derive(Clone)]
pub struct AlerteTable;

impl Table for AlerteTable {
    fn name(&self) -> &'static str {
        "alertes"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS alertes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                bassin_id INTEGER,
                parametre TEXT,
                message TEXT NOT NULL,
                type_alerte TEXT NOT NULL DEFAULT 'info',
                date TIMESTAMP NOT NULL,
                resolved BOOLEAN NOT NULL DEFAULT FALSE,
                FOREIGN KEY (bassin_id) REFERENCES bassins (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS alertes;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["bassins"]
    }
}
