use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::Device;

pub struct DeviceRepository {
    storage: Arc<Storage>,
}

impl DeviceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl DeviceRepository {
    pub async fn create(
        &self,
        item: &Device,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO devices (nom, bassin_id, type_capteur, device_key, online, last_seen, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&item.nom)
        .bind(item.bassin_id)
        .bind(&item.type_capteur)
        .bind(&item.device_key)
        .bind(item.online)
        .bind(item.last_seen)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    pub async fn find_by_name(&self, nom: &str) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE nom = $1")
            .bind(nom)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    pub async fn find_by_key(&self, device_key: &str) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE device_key = $1")
            .bind(device_key)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    pub async fn find_all(&self) -> Result<Vec<Device>, Error> {
        let devices: Vec<Device> = sqlx::query_as("SELECT * FROM devices ORDER BY nom")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(devices)
    }

    pub async fn update(
        &self,
        id: i32,
        item: &Device,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE devices
            SET nom = $1, bassin_id = $2, type_capteur = $3, device_key = $4
            WHERE id = $5
            "#,
        )
        .bind(&item.nom)
        .bind(item.bassin_id)
        .bind(&item.type_capteur)
        .bind(&item.device_key)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    /// Records traffic from a device and returns it as stored afterwards.
    /// Records traffic from a device. The flag is `true` for the one call
    /// that brought the device back online.
    pub async fn mark_seen(
        &self,
        id: i32,
        seen_at: OffsetDateTime,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(Device, bool), Error> {
        let reconnected: Option<Device> = sqlx::query_as(
            "UPDATE devices SET online = TRUE, last_seen = $1 WHERE id = $2 AND online = FALSE RETURNING *",
        )
        .bind(seen_at)
        .bind(id)
        .fetch_optional(&mut **transaction)
        .await?;

        if let Some(device) = reconnected {
            return Ok((device, true));
        }

        let device: Device =
            sqlx::query_as("UPDATE devices SET last_seen = $1 WHERE id = $2 RETURNING *")
                .bind(seen_at)
                .bind(id)
                .fetch_one(&mut **transaction)
                .await?;

        Ok((device, false))
    }

    /// Flags as offline every online device silent since `cutoff`.
    pub async fn mark_offline_before(
        &self,
        cutoff: OffsetDateTime,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<Vec<Device>, Error> {
        sqlx::query_as(
            r#"
            UPDATE devices SET online = FALSE
            WHERE online = TRUE AND (last_seen IS NULL OR julianday(last_seen) < julianday($1))
            RETURNING *
            "#,
        )
        .bind(cutoff)
        .fetch_all(&mut **transaction)
        .await
    }

    pub async fn delete(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }
}
