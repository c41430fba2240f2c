use std::sync::Arc;

use aquaferme_api::models::LotQuery;
use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::{Lot, LotChanges, LotRow};

const SELECT_LOT_ROW: &str = r#"
    SELECT l.*, b.nom AS bassin_nom
    FROM lots l
    LEFT JOIN bassins b ON b.id = l.bassin_id
"#;

pub struct LotRepository {
    storage: Arc<Storage>,
}

impl LotRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl LotRepository {
    pub async fn create(
        &self,
        item: &Lot,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO lots (nom, espece, quantite, bassin_id, stade, statut, poids_moyen,
                              taille_moyenne, date_creation, qr_code_genere)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&item.nom)
        .bind(&item.espece)
        .bind(item.quantite)
        .bind(item.bassin_id)
        .bind(&item.stade)
        .bind(&item.statut)
        .bind(item.poids_moyen)
        .bind(item.taille_moyenne)
        .bind(item.date_creation)
        .bind(item.qr_code_genere)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Lot>, Error> {
        let lot: Option<Lot> = sqlx::query_as("SELECT * FROM lots WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(lot)
    }

    pub async fn find_by_name(&self, nom: &str) -> Result<Option<Lot>, Error> {
        let lot: Option<Lot> = sqlx::query_as("SELECT * FROM lots WHERE nom = $1")
            .bind(nom)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(lot)
    }

    pub async fn find_row_by_id(&self, id: i32) -> Result<Option<LotRow>, Error> {
        let row: Option<LotRow> = sqlx::query_as(&format!("{SELECT_LOT_ROW} WHERE l.id = $1"))
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(row)
    }

    pub async fn find_all(&self, filter: &LotQuery) -> Result<Vec<LotRow>, Error> {
        let rows: Vec<LotRow> = sqlx::query_as(&format!(
            r#"
            {SELECT_LOT_ROW}
            WHERE ($1 IS NULL OR l.bassin_id = $1)
              AND ($2 IS NULL OR l.statut = $2)
              AND ($3 IS NULL OR l.espece = $3)
            ORDER BY julianday(l.date_creation) DESC, l.id DESC
            "#
        ))
        .bind(filter.bassin_id)
        .bind(filter.statut.map(|statut| statut.to_string()))
        .bind(&filter.espece)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(rows)
    }

    pub async fn has_ventes(&self, id: i32) -> Result<bool, Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM ventes WHERE lot_id = $1)")
            .bind(id)
            .fetch_one(self.storage.get_pool())
            .await
    }

    /// Reads a lot through the open transaction after taking the write lock,
    /// so the row cannot change until the transaction ends.
    pub async fn lock_by_id(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<Option<Lot>, Error> {
        let lot: Option<Lot> = sqlx::query_as("UPDATE lots SET id = id WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut **transaction)
            .await?;

        Ok(lot)
    }

    /// Adds `delta` to the stock of a lot unless the result would be negative.
    ///
    /// Returns `false` when the lot is missing or holds too little stock. A lot
    /// emptied by a sale becomes `vendu`, and a `vendu` lot that regains stock
    /// goes back to `actif`.
    pub async fn adjust_stock(
        &self,
        id: i32,
        delta: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET quantite = quantite + $1,
                statut = CASE
                    WHEN quantite + $1 = 0 AND statut = 'actif' THEN 'vendu'
                    WHEN quantite + $1 > 0 AND statut = 'vendu' THEN 'actif'
                    ELSE statut
                END
            WHERE id = $2 AND quantite + $1 >= 0
            "#,
        )
        .bind(delta)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Writes only the columns set in `changes`, leaving stock moved by
    /// concurrent sales untouched. Returns `false` when the lot is missing.
    pub async fn update(
        &self,
        id: i32,
        changes: &LotChanges,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE lots
            SET nom = COALESCE($1, nom),
                espece = COALESCE($2, espece),
                quantite = COALESCE($3, quantite),
                stade = COALESCE($4, stade),
                statut = COALESCE($5, statut),
                poids_moyen = COALESCE($6, poids_moyen),
                taille_moyenne = COALESCE($7, taille_moyenne)
            WHERE id = $8
            "#,
        )
        .bind(&changes.nom)
        .bind(&changes.espece)
        .bind(changes.quantite)
        .bind(&changes.stade)
        .bind(&changes.statut)
        .bind(changes.poids_moyen)
        .bind(changes.taille_moyenne)
        .bind(id)
        .execute(&mut **transaction)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn move_to_bassin(
        &self,
        id: i32,
        bassin_id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE lots SET bassin_id = $1 WHERE id = $2")
            .bind(bassin_id)
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }

    pub async fn mark_qr_code(
        &self,
        id: i32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE lots SET qr_code_genere = TRUE WHERE id = $1")
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
        sqlx::query("DELETE FROM lot_events WHERE lot_id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        sqlx::query("DELETE FROM lots WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aquaferme_api::models::{LotStatut, UserRole};

    use crate::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_find_all_with_filters() {
        let storage = setup_test_db().await;
        let repo = LotRepository::new(storage.clone());
        let nord = create_test_bassin(storage.clone(), "Nord", 1000).await;
        let sud = create_test_bassin(storage.clone(), "Sud", 1000).await;
        create_test_lot(storage.clone(), "L-nord", 100, Some(nord.id)).await;
        create_test_lot(storage.clone(), "L-sud", 80, Some(sud.id)).await;
        create_test_lot(storage.clone(), "L-libre", 10, None).await;

        let all = repo.find_all(&LotQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let in_nord = repo
            .find_all(&LotQuery {
                bassin_id: Some(nord.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_nord.len(), 1);
        assert_eq!(in_nord[0].lot.nom, "L-nord");
        assert_eq!(in_nord[0].bassin_nom.as_deref(), Some("Nord"));

        let free = all.iter().find(|row| row.lot.nom == "L-libre").unwrap();
        assert_eq!(free.bassin_nom, None);

        let sold = repo
            .find_all(&LotQuery {
                statut: Some(LotStatut::Vendu),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(sold.is_empty());
    }

    #[tokio::test]
    async fn test_adjust_stock_never_goes_negative() {
        let storage = setup_test_db().await;
        let repo = LotRepository::new(storage.clone());
        let lot = create_test_lot(storage.clone(), "L-stock", 30, None).await;

        let mut tx = storage.get_pool().begin().await.unwrap();
        assert!(repo.adjust_stock(lot.id, -20, &mut tx).await.unwrap());
        assert!(!repo.adjust_stock(lot.id, -11, &mut tx).await.unwrap());
        assert!(repo.adjust_stock(lot.id, -10, &mut tx).await.unwrap());
        tx.commit().await.unwrap();

        let found = repo.find_by_id(lot.id).await.unwrap().unwrap();
        assert_eq!(found.quantite, 0);
        assert_eq!(found.statut, "vendu");

        let mut tx = storage.get_pool().begin().await.unwrap();
        assert!(repo.adjust_stock(lot.id, 5, &mut tx).await.unwrap());
        tx.commit().await.unwrap();

        let found = repo.find_by_id(lot.id).await.unwrap().unwrap();
        assert_eq!(found.quantite, 5);
        assert_eq!(found.statut, "actif");
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_lot() {
        let storage = setup_test_db().await;
        let repo = LotRepository::new(storage.clone());

        let mut tx = storage.get_pool().begin().await.unwrap();
        assert!(!repo.adjust_stock(404, 1, &mut tx).await.unwrap());
        assert!(repo.lock_by_id(404, &mut tx).await.unwrap().is_none());
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_keeps_unset_columns() {
        let storage = setup_test_db().await;
        let repo = LotRepository::new(storage.clone());
        let lot = create_test_lot(storage.clone(), "L-partiel", 100, None).await;

        let mut tx = storage.get_pool().begin().await.unwrap();
        assert!(repo.adjust_stock(lot.id, -30, &mut tx).await.unwrap());
        assert!(
            repo.update(
                lot.id,
                &LotChanges {
                    stade: Some("juvenile".to_string()),
                    ..Default::default()
                },
                &mut tx,
            )
            .await
            .unwrap()
        );
        assert!(!repo.update(404, &LotChanges::default(), &mut tx).await.unwrap());
        tx.commit().await.unwrap();

        let found = repo.find_by_id(lot.id).await.unwrap().unwrap();
        assert_eq!(found.quantite, 70);
        assert_eq!(found.stade.as_deref(), Some("juvenile"));
        assert_eq!(found.nom, "L-partiel");
    }

    #[tokio::test]
    async fn test_has_ventes() {
        let storage = setup_test_db().await;
        let repo = LotRepository::new(storage.clone());
        let admin =
            create_test_user(storage.clone(), "admin@ferme.test", "secret", &UserRole::Admin).await;
        let sold = create_test_lot(storage.clone(), "L-sold", 30, None).await;
        let kept = create_test_lot(storage.clone(), "L-kept", 30, None).await;
        create_test_vente(storage.clone(), sold.id, 5, 3.0, admin.id, None).await;

        assert!(repo.has_ventes(sold.id).await.unwrap());
        assert!(!repo.has_ventes(kept.id).await.unwrap());
    }
}
