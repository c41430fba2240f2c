use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::LotEvent;

pub struct LotEventRepository {
    storage: Arc<Storage>,
}

impl LotEventRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl LotEventRepository {
    pub async fn create(
        &self,
        item: &LotEvent,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO lot_events (lot_id, type_evenement, bassin_source_id,
                                    bassin_destination_id, description, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.lot_id)
        .bind(&item.type_evenement)
        .bind(item.bassin_source_id)
        .bind(item.bassin_destination_id)
        .bind(&item.description)
        .bind(item.date)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_lot_id(&self, lot_id: i32) -> Result<Vec<LotEvent>, Error> {
        let events: Vec<LotEvent> = sqlx::query_as(
            "SELECT * FROM lot_events WHERE lot_id = $1 ORDER BY julianday(date), id",
        )
        .bind(lot_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(events)
    }
}
