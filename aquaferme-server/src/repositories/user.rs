use std::sync::Arc;

use sqlx::{Error, Sqlite, SqlitePool, Transaction};

use crate::configs::Storage;
use crate::models::User;

pub struct UserRepository {
    storage: Arc<Storage>,
}

impl UserRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &SqlitePool {
        self.storage.get_pool()
    }
}

impl UserRepository {
    pub async fn create(
        &self,
        item: &User,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO users (nom, email, password, role, actif, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&item.nom)
        .bind(&item.email)
        .bind(&item.password)
        .bind(&item.role)
        .bind(item.actif)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, Error> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(user)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, Error> {
        let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(users)
    }

    pub async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.storage.get_pool())
            .await
    }

    /// Whether clients or sales still point at this user.
    pub async fn is_referenced(&self, id: i32) -> Result<bool, Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM clients WHERE distributeur_id = $1)
                OR EXISTS (SELECT 1 FROM ventes WHERE vendeur_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(self.storage.get_pool())
        .await
    }

    pub async fn update(
        &self,
        id: i32,
        item: &User,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET nom = $1, email = $2, password = $3, role = $4, actif = $5
            WHERE id = $6
            "#,
        )
        .bind(&item.nom)
        .bind(&item.email)
        .bind(&item.password)
        .bind(&item.role)
        .bind(item.actif)
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
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }
}
