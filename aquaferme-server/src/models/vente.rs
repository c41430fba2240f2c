use aquaferme_api::models::{ClientSummary, LotSummary, VenteResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vente {
    pub id: i32,
    pub lot_id: i32,
    pub quantite: i32,
    pub prix_unitaire: f64,
    pub prix_total: f64,
    pub client_id: Option<i32>,
    pub client_nom: Option<String>,
    pub statut: String,
    pub date_vente: OffsetDateTime,
    pub vendeur_id: i32,
}

/// A sale joined with its lot and, when referenced, its client.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VenteRow {
    #[sqlx(flatten)]
    pub vente: Vente,
    pub lot_nom: String,
    pub lot_espece: String,
    pub client_ref_nom: Option<String>,
}

impl From<VenteRow> for VenteResponse {
    fn from(row: VenteRow) -> Self {
        let vente = row.vente;
        let client = match (vente.client_id, row.client_ref_nom) {
            (Some(id), Some(nom)) => Some(ClientSummary { id, nom }),
            _ => None,
        };

        VenteResponse {
            id: vente.id,
            lot: LotSummary {
                id: vente.lot_id,
                nom: row.lot_nom,
                espece: row.lot_espece,
            },
            quantite: vente.quantite,
            prix_unitaire: vente.prix_unitaire,
            prix_total: vente.prix_total,
            client,
            client_nom: vente.client_nom,
            statut: vente.statut.into(),
            date_vente: vente.date_vente,
            vendeur_id: vente.vendeur_id,
        }
    }
}

#[derive(Clone)]
pub struct VenteTable;

impl Table for VenteTable {
    fn name(&self) -> &'static str {
        "ventes"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS ventes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lot_id INTEGER NOT NULL,
                quantite INTEGER NOT NULL CHECK (quantite > 0),
                prix_unitaire REAL NOT NULL CHECK (prix_unitaire >= 0),
                prix_total REAL NOT NULL,
                client_id INTEGER,
                client_nom TEXT,
                statut TEXT NOT NULL DEFAULT 'en_attente',
                date_vente TIMESTAMP NOT NULL,
                vendeur_id INTEGER NOT NULL,
                FOREIGN KEY (lot_id) REFERENCES lots (id),
                FOREIGN KEY (client_id) REFERENCES clients (id),
                FOREIGN KEY (vendeur_id) REFERENCES users (id)
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS ventes;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["lots", "clients", "users"]
    }
}
