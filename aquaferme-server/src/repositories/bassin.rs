use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::Bassin;

pub struct BassinRepository {
    storage: Arc<Storage>,
}

impl BassinRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl BassinRepository {
    pub async fn create(
        &self,
        item: &Bassin,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO bassins (nom, capacite, especes, statut, stade, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&item.nom)
        .bind(item.capacite)
        .bind(&item.especes)
        .bind(&item.statut)
        .bind(&item.stade)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Bassin>, Error> {
        let bassin: Option<Bassin> = sqlx::query_as("SELECT * FROM bassins WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(bassin)
    }

    pub async fn find_by_name(&self, nom: &str) -> Result<Option<Bassin>, Error> {
        let bassin: Option<Bassin> = sqlx::query_as("SELECT * FROM bassins WHERE nom = $1")
            .bind(nom)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(bassin)
    }

    pub async fn find_all(&self) -> Result<Vec<Bassin>, Error> {
        let bassins: Vec<Bassin> = sqlx::query_as("SELECT * FROM bassins ORDER BY nom")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(bassins)
    }

    pub async fn count_lots(&self, id: i32) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM lots WHERE bassin_id = $1")
            .bind(id)
            .fetch_one(self.storage.get_pool())
            .await
    }

    pub async fn update(
        &self,
        id: i32,
        item: &Bassin,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE bassins
            SET nom = $1, capacite = $2, especes = $3, statut = $4, stade = $5
            WHERE id = $6
            "#,
        )
        .bind(&item.nom)
        .bind(item.capacite)
        .bind(&item.especes)
        .bind(&item.statut)
        .bind(&item.stade)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    /// Removes the bassin with its readings and alerts; devices are left unassigned.
    pub async fn delete(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE devices SET bassin_id = NULL WHERE bassin_id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        sqlx::query("DELETE FROM mesures WHERE bassin_id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        sqlx::query("DELETE FROM alertes WHERE bassin_id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        sqlx::query("DELETE FROM bassins WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }
}
