use aquaferme_api::models::ClientResponse;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    pub id: i32,
    pub nom: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub distributeur_id: Option<i32>,
    pub created_at: OffsetDateTime,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        ClientResponse {
            id: client.id,
            nom: client.nom,
            email: client.email,
            telephone: client.telephone,
            adresse: client.adresse,
            distributeur_id: client.distributeur_id,
            created_at: client.created_at,
        }
    }
}

#[derive(Clone)]
pub struct ClientTable;

impl Table for ClientTable {
    fn name(&self) -> &'static str {
        "clients"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nom TEXT NOT NULL,
                email TEXT,
                telephone TEXT,
                adresse TEXT,
                distributeur_id INTEGER,
                created_at TIMESTAMP NOT NULL,
                FOREIGN KEY (distributeur_id) REFERENCES users (id)
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS clients;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["users"]
    }
}
