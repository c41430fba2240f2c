use std::sync::Arc;

use aquaferme_api::models::AlerteQuery;
use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::Alerte;

pub struct AlerteRepository {
    storage: Arc<Storage>,
}

impl AlerteRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl AlerteRepository {
    pub async fn create(
        &self,
        item: &Alerte,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO alertes (bassin_id, parametre, message, type_alerte, date, resolved)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.bassin_id)
        .bind(&item.parametre)
        .bind(&item.message)
        .bind(&item.type_alerte)
        .bind(item.date)
        .bind(item.resolved)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Alerte>, Error> {
        let alerte: Option<Alerte> = sqlx::query_as("SELECT * FROM alertes WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(alerte)
    }

    pub async fn find_all(&self, filter: &AlerteQuery) -> Result<Vec<Alerte>, Error> {
        let alertes: Vec<Alerte> = sqlx::query_as(
            r#"
            SELECT * FROM alertes
            WHERE ($1 IS NULL OR resolved = $1)
              AND ($2 IS NULL OR type_alerte = $2)
              AND ($3 IS NULL OR bassin_id = $3)
            ORDER BY julianday(date) DESC, id DESC
            "#,
        )
        .bind(filter.resolved)
        .bind(filter.alerte_type.map(|alerte_type| alerte_type.to_string()))
        .bind(filter.bassin_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(alertes)
    }

    /// Whether an open alert already covers this bassin and parameter.
    pub async fn has_unresolved(
        &self,
        bassin_id: i32,
        parametre: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM alertes
                WHERE bassin_id = $1 AND parametre = $2 AND resolved = FALSE
            )
            "#,
        )
        .bind(bassin_id)
        .bind(parametre)
        .fetch_one(&mut **transaction)
        .await
    }

    pub async fn resolve(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE alertes SET resolved = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }

    pub async fn delete(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM alertes WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }
}
