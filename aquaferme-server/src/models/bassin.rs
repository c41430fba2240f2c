use aquaferme_api::models::{BassinResponse, BassinSummary};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bassin {
    pub id: i32,
    pub nom: String,
    pub capacite: i32,
    pub especes: Json<Vec<String>>,
    pub statut: String,
    pub stade: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Bassin {
    pub fn summary(&self) -> BassinSummary {
        BassinSummary {
            id: self.id,
            nom: self.nom.clone(),
        }
    }
}

impl From<Bassin> for BassinResponse {
    fn from(bassin: Bassin) -> Self {
        BassinResponse {
            id: bassin.id,
            nom: bassin.nom,
            capacite: bassin.capacite,
            especes: bassin.especes.0,
            statut: bassin.statut.into(),
            stade: bassin.stade,
            created_at: bassin.created_at,
        }
    }
}

#[derive(Clone)]
pub struct BassinTable;

impl Table for BassinTable {
    fn name(&self) -> &'static str {
        "bassins"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS bassins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nom TEXT NOT NULL UNIQUE,
                capacite INTEGER NOT NULL CHECK (capacite > 0),
                especes JSON NOT NULL DEFAULT '[]',
                statut TEXT NOT NULL DEFAULT 'actif',
                stade TEXT,
                created_at TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS bassins;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
