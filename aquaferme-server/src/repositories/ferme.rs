use std::sync::Arc;

use aquaferme_api::models::DashboardResponse;
use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::Ferme;

pub struct FermeRepository {
    storage: Arc<Storage>,
}

impl FermeRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl FermeRepository {
    pub async fn get(&self) -> Result<Ferme, Error> {
        sqlx::query_as("SELECT * FROM ferme WHERE id = 1")
            .fetch_one(self.storage.get_pool())
            .await
    }

    pub async fn update(
        &self,
        item: &Ferme,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE ferme
            SET nom = $1, adresse = $2, responsable = $3, telephone = $4, email = $5,
                seuils = $6, updated_at = $7
            WHERE id = 1
            "#,
        )
        .bind(&item.nom)
        .bind(&item.adresse)
        .bind(&item.responsable)
        .bind(&item.telephone)
        .bind(&item.email)
        .bind(&item.seuils)
        .bind(item.updated_at)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn dashboard(&self) -> Result<DashboardResponse, Error> {
        let pool = self.storage.get_pool();

        let bassins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bassins")
            .fetch_one(pool)
            .await?;

        let (lots_actifs, poissons_en_stock): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(quantite), 0)
            FROM lots WHERE statut = 'actif'
            "#,
        )
        .fetch_one(pool)
        .await?;

        let (ventes, chiffre_affaires): (i64, f64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(prix_total), 0.0)
            FROM ventes WHERE statut != 'annulee'
            "#,
        )
        .fetch_one(pool)
        .await?;

        let alertes_non_resolues: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alertes WHERE resolved = FALSE")
                .fetch_one(pool)
                .await?;

        let (devices_en_ligne, devices_total): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(CASE WHEN online THEN 1 ELSE 0 END), 0), COUNT(*) FROM devices",
        )
        .fetch_one(pool)
        .await?;

        Ok(DashboardResponse {
            bassins,
            lots_actifs,
            poissons_en_stock,
            ventes,
            chiffre_affaires,
            alertes_non_resolues,
            devices_en_ligne,
            devices_total,
        })
    }
}
