use aquaferme_api::models::{FermeResponse, Seuils};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use time::OffsetDateTime;

use crate::models::Table;

/// The farm profile. The table always holds exactly one row with id 1.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ferme {
    pub id: i32,
    pub nom: String,
    pub adresse: Option<String>,
    pub responsable: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub seuils: Json<Seuils>,
    pub updated_at: OffsetDateTime,
}

impl From<Ferme> for FermeResponse {
    fn from(ferme: Ferme) -> Self {
        FermeResponse {
            nom: ferme.nom,
            adresse: ferme.adresse,
            responsable: ferme.responsable,
            telephone: ferme.telephone,
            email: ferme.email,
            seuils: ferme.seuils.0,
            updated_at: ferme.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct FermeTable;

impl Table for FermeTable {
    fn name(&self) -> &'static str {
        "ferme"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS ferme (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                nom TEXT NOT NULL,
                adresse TEXT,
                responsable TEXT,
                telephone TEXT,
                email TEXT,
                seuils JSON NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS ferme;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }

    fn seed(&self) -> Option<String> {
        let seuils = serde_json::to_string(&Seuils::default()).ok()?;

        Some(format!(
            r#"
            INSERT OR IGNORE INTO ferme (id, nom, seuils, updated_at)
            VALUES (1, 'Ferme aquacole', '{seuils}', strftime('%Y-%m-%dT%H:%M:%SZ', 'now'));
            "#
        ))
    }
}
