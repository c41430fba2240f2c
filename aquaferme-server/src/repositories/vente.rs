use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::{Vente, VenteRow};

const SELECT_VENTE_ROW: &str = r#"
    SELECT v.*, l.nom AS lot_nom, l.espece AS lot_espece, c.nom AS client_ref_nom
    FROM ventes v
    INNER JOIN lots l ON l.id = v.lot_id
    LEFT JOIN clients c ON c.id = v.client_id
"#;

pub struct VenteRepository {
    storage: Arc<Storage>,
}

impl VenteRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl VenteRepository {
    pub async fn create(
        &self,
        item: &Vente,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO ventes (lot_id, quantite, prix_unitaire, prix_total, client_id, client_nom,
                                statut, date_vente, vendeur_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.lot_id)
        .bind(item.quantite)
        .bind(item.prix_unitaire)
        .bind(item.prix_total)
        .bind(item.client_id)
        .bind(&item.client_nom)
        .bind(&item.statut)
        .bind(item.date_vente)
        .bind(item.vendeur_id)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Vente>, Error> {
        let vente: Option<Vente> = sqlx::query_as("SELECT * FROM ventes WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(vente)
    }

    pub async fn find_row_by_id(&self, id: i32) -> Result<Option<VenteRow>, Error> {
        let row: Option<VenteRow> =
            sqlx::query_as(&format!("{SELECT_VENTE_ROW} WHERE v.id = $1"))
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(row)
    }

    pub async fn find_all(&self) -> Result<Vec<VenteRow>, Error> {
        let rows: Vec<VenteRow> = sqlx::query_as(&format!(
            "{SELECT_VENTE_ROW} ORDER BY julianday(v.date_vente) DESC, v.id DESC"
        ))
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(rows)
    }

    pub async fn find_by_vendeur_id(&self, vendeur_id: i32) -> Result<Vec<VenteRow>, Error> {
        let rows: Vec<VenteRow> = sqlx::query_as(&format!(
            "{SELECT_VENTE_ROW} WHERE v.vendeur_id = $1 ORDER BY julianday(v.date_vente) DESC, v.id DESC"
        ))
        .bind(vendeur_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(rows)
    }

    /// Reads a sale through the open transaction after taking the write lock,
    /// so concurrent edits of the same sale run one after the other.
    pub async fn lock_by_id(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<Option<Vente>, Error> {
        let vente: Option<Vente> =
            sqlx::query_as("UPDATE ventes SET id = id WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&mut **transaction)
                .await?;

        Ok(vente)
    }

    /// Returns `false` when the sale no longer exists.
    pub async fn update(
        &self,
        id: i32,
        item: &Vente,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE ventes
            SET lot_id = $1, quantite = $2, prix_unitaire = $3, prix_total = $4, client_id = $5,
                client_nom = $6, statut = $7, date_vente = $8
            WHERE id = $9
            "#,
        )
        .bind(item.lot_id)
        .bind(item.quantite)
        .bind(item.prix_unitaire)
        .bind(item.prix_total)
        .bind(item.client_id)
        .bind(&item.client_nom)
        .bind(&item.statut)
        .bind(item.date_vente)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes a sale and hands back the row as it was, `None` if another
    /// request removed it first.
    pub async fn delete(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<Option<Vente>, Error> {
        let vente: Option<Vente> = sqlx::query_as("DELETE FROM ventes WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut **transaction)
            .await?;

        Ok(vente)
    }
}
