use aquaferme_api::models::{BassinSummary, LotResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lot {
    pub id: i32,
    pub nom: String,
    pub espece: String,
    pub quantite: i32,
    pub bassin_id: Option<i32>,
    pub stade: Option<String>,
    pub statut: String,
    pub poids_moyen: Option<f64>,
    pub taille_moyenne: Option<f64>,
    pub date_creation: OffsetDateTime,
    pub qr_code_genere: bool,
}

/// Columns written by a partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct LotChanges {
    pub nom: Option<String>,
    pub espece: Option<String>,
    pub quantite: Option<i32>,
    pub stade: Option<String>,
    pub statut: Option<String>,
    pub poids_moyen: Option<f64>,
    pub taille_moyenne: Option<f64>,
}

/// A lot joined with the name of its bassin.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LotRow {
    #[sqlx(flatten)]
    pub lot: Lot,
    pub bassin_nom: Option<String>,
}

impl From<LotRow> for LotResponse {
    fn from(row: LotRow) -> Self {
        let lot = row.lot;
        let bassin = match (lot.bassin_id, row.bassin_nom) {
            (Some(id), Some(nom)) => Some(BassinSummary { id, nom }),
            _ => None,
        };

        LotResponse {
            id: lot.id,
            nom: lot.nom,
            espece: lot.espece,
            quantite: lot.quantite,
            bassin_id: lot.bassin_id,
            bassin,
            stade: lot.stade,
            statut: lot.statut.into(),
            poids_moyen: lot.poids_moyen,
            taille_moyenne: lot.taille_moyenne,
            date_creation: lot.date_creation,
            qr_code_genere: lot.qr_code_genere,
        }
    }
}

#[derive(Clone)]
pub struct LotTable;

impl Table for LotTable {
    fn name(&self) -> &'static str {
        "lots"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS lots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nom TEXT NOT NULL UNIQUE,
                espece TEXT NOT NULL,
                quantite INTEGER NOT NULL CHECK (quantite >= 0),
                bassin_id INTEGER,
                stade TEXT,
                statut TEXT NOT NULL DEFAULT 'actif',
                poids_moyen REAL,
                taille_moyenne REAL,
                date_creation TIMESTAMP NOT NULL,
                qr_code_genere BOOLEAN NOT NULL DEFAULT FALSE,
                FOREIGN KEY (bassin_id) REFERENCES bassins (id)
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS lots;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["bassins"]
    }
}
