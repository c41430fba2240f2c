use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::Mesure;

pub struct MesureRepository {
    storage: Arc<Storage>,
}

impl MesureRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl MesureRepository {
    pub async fn create(
        &self,
        item: &Mesure,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO mesures (bassin_id, timestamp, temperature, ph, oxygen, salinity, turbidity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.bassin_id)
        .bind(item.timestamp)
        .bind(item.temperature)
        .bind(item.ph)
        .bind(item.oxygen)
        .bind(item.salinity)
        .bind(item.turbidity)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_latest_by_bassin_id(&self, bassin_id: i32) -> Result<Option<Mesure>, Error> {
        let mesure: Option<Mesure> = sqlx::query_as(
            r#"
            SELECT * FROM mesures WHERE bassin_id = $1
            ORDER BY julianday(timestamp) DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(bassin_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(mesure)
    }

    /// Readings of a bassin inside `[start, end]`, oldest first.
    pub async fn find_by_bassin_in_range(
        &self,
        bassin_id: i32,
        start: OffsetDateTime,
        end: OffsetDateTime,
        limit: Option<i64>,
    ) -> Result<Vec<Mesure>, Error> {
        let mesures: Vec<Mesure> = sqlx::query_as(
            r#"
            SELECT * FROM (
                SELECT * FROM mesures
                WHERE bassin_id = $1
                  AND julianday(timestamp) >= julianday($2)
                  AND julianday(timestamp) <= julianday($3)
                ORDER BY julianday(timestamp) DESC, id DESC
                LIMIT $4
            ) ORDER BY julianday(timestamp), id
            "#,
        )
        .bind(bassin_id)
        .bind(start)
        .bind(end)
        .bind(limit.unwrap_or(-1))
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(mesures)
    }
}
