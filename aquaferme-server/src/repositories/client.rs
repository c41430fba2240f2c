use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::Client;

pub struct ClientRepository {
    storage: Arc<Storage>,
}

impl ClientRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl ClientRepository {
    pub async fn create(
        &self,
        item: &Client,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO clients (nom, email, telephone, adresse, distributeur_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&item.nom)
        .bind(&item.email)
        .bind(&item.telephone)
        .bind(&item.adresse)
        .bind(item.distributeur_id)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Client>, Error> {
        let client: Option<Client> = sqlx::query_as("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(client)
    }

    pub async fn find_all(&self) -> Result<Vec<Client>, Error> {
        let clients: Vec<Client> = sqlx::query_as("SELECT * FROM clients ORDER BY nom")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(clients)
    }

    pub async fn find_by_distributeur_id(&self, distributeur_id: i32) -> Result<Vec<Client>, Error> {
        let clients: Vec<Client> =
            sqlx::query_as("SELECT * FROM clients WHERE distributeur_id = $1 ORDER BY nom")
                .bind(distributeur_id)
                .fetch_all(self.storage.get_pool())
                .await?;

        Ok(clients)
    }

    pub async fn has_ventes(&self, id: i32) -> Result<bool, Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM ventes WHERE client_id = $1)")
            .bind(id)
            .fetch_one(self.storage.get_pool())
            .await
    }

    pub async fn update(
        &self,
        id: i32,
        item: &Client,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE clients
            SET nom = $1, email = $2, telephone = $3, adresse = $4, distributeur_id = $5
            WHERE id = $6
            "#,
        )
        .bind(&item.nom)
        .bind(&item.email)
        .bind(&item.telephone)
        .bind(&item.adresse)
        .bind(item.distributeur_id)
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
        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aquaferme_api::models::UserRole;

    use crate::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_find_by_distributeur() {
        let storage = setup_test_db().await;
        let repo = ClientRepository::new(storage.clone());
        let alice = create_test_user(
            storage.clone(),
            "alice@ferme.test",
            "secret",
            &UserRole::Distributeur,
        )
        .await;
        let bob = create_test_user(
            storage.clone(),
            "bob@ferme.test",
            "secret",
            &UserRole::Distributeur,
        )
        .await;
        create_test_client(storage.clone(), "Marche Central", Some(alice.id)).await;
        create_test_client(storage.clone(), "Restaurant", Some(alice.id)).await;
        create_test_client(storage.clone(), "Hotel", Some(bob.id)).await;

        let own = repo.find_by_distributeur_id(alice.id).await.unwrap();
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|c| c.distributeur_id == Some(alice.id)));
        assert_eq!(repo.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_client() {
        let storage = setup_test_db().await;
        let repo = ClientRepository::new(storage.clone());
        let client = create_test_client(storage.clone(), "Ephemere", None).await;

        assert!(!repo.has_ventes(client.id).await.unwrap());

        let mut tx = storage.get_pool().begin().await.unwrap();
        repo.delete(client.id, &mut tx).await.unwrap();
        tx.commit().await.unwrap();

        assert!(repo.find_by_id(client.id).await.unwrap().is_none());
    }
}
