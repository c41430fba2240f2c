use aquaferme_api::models::LotEventResponse;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

/// Entry of the append-only history of a lot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LotEvent {
    pub id: i32,
    pub lot_id: i32,
    pub type_evenement: String,
    pub bassin_source_id: Option<i32>,
    pub bassin_destination_id: Option<i32>,
    pub description: Option<String>,
    pub date: OffsetDateTime,
}

impl From<LotEvent> for LotEventResponse {
    fn from(event: LotEvent) -> Self {
        LotEventResponse {
            id: event.id,
            lot_id: event.lot_id,
            type_evenement: event.type_evenement.into(),
            bassin_source_id: event.bassin_source_id,
            bassin_destination_id: event.bassin_destination_id,
            description: event.description,
            date: event.date,
        }
    }
}

#[derive(Clone)]
pub struct LotEventTable;

impl Table for LotEventTable {
    fn name(&self) -> &'static str {
        "lot_events"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS lot_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lot_id INTEGER NOT NULL,
                type_evenement TEXT NOT NULL,
                bassin_source_id INTEGER,
                bassin_destination_id INTEGER,
                description TEXT,
                date TIMESTAMP NOT NULL,
                FOREIGN KEY (lot_id) REFERENCES lots (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS lot_events;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["lots"]
    }
}
