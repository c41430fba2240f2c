use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{BassinSummary, Id, MesureStatistics};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotStatut {
    #[default]
    Actif,
    /// Whole stock sold
    Vendu,
    Archive,
}

impl From<String> for LotStatut {
    fn from(value: String) -> Self {
        match value.as_str() {
            "vendu" => LotStatut::Vendu,
            "archive" => LotStatut::Archive,
            _ => LotStatut::Actif,
        }
    }
}

impl Display for LotStatut {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LotStatut::Actif => write!(f, "actif"),
            LotStatut::Vendu => write!(f, "vendu"),
            LotStatut::Archive => write!(f, "archive"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotEventType {
    Creation,
    Transfert,
}

impl From<String> for LotEventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "transfert" => LotEventType::Transfert,
            _ => LotEventType::Creation,
        }
    }
}

impl Display for LotEventType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            LotEventType::Creation => write!(f, "creation"),
            LotEventType::Transfert => write!(f, "transfert"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLotRequest {
    /// Batch name, unique
    pub nom: String,
    /// Fish species
    pub espece: String,
    /// Number of fish
    pub quantite: i32,
    /// Hosting tank
    pub bassin_id: Option<Id>,
    pub stade: Option<String>,
    /// Average weight in grams
    pub poids_moyen: Option<f64>,
    /// Average length in centimeters
    pub taille_moyenne: Option<f64>,
    /// Defaults to the creation time
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_creation: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLotRequest {
    pub nom: Option<String>,
    pub espece: Option<String>,
    /// Inventory correction, never below zero
    pub quantite: Option<i32>,
    /// A different tank records a transfer event
    pub bassin_id: Option<Id>,
    pub stade: Option<String>,
    pub statut: Option<LotStatut>,
    pub poids_moyen: Option<f64>,
    pub taille_moyenne: Option<f64>,
}

/// Filters accepted by the lot listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LotQuery {
    pub bassin_id: Option<Id>,
    pub statut: Option<LotStatut>,
    pub espece: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransfertLotRequest {
    /// Destination tank
    pub bassin_id: Id,
    pub description: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotEventResponse {
    pub id: Id,
    pub lot_id: Id,
    pub type_evenement: LotEventType,
    pub bassin_source_id: Option<Id>,
    pub bassin_destination_id: Option<Id>,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotResponse {
    pub id: Id,
    pub nom: String,
    pub espece: String,
    pub quantite: i32,
    pub bassin_id: Option<Id>,
    /// Joined hosting tank
    pub bassin: Option<BassinSummary>,
    pub stade: Option<String>,
    pub statut: LotStatut,
    pub poids_moyen: Option<f64>,
    pub taille_moyenne: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub date_creation: OffsetDateTime,
    pub qr_code_genere: bool,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotDetailResponse {
    #[serde(flatten)]
    pub info: LotResponse,
    pub historique: Vec<LotEventResponse>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotHistoriqueResponse {
    pub lot: LotResponse,
    pub historique: Vec<LotEventResponse>,
    /// Statistics of the hosting tank over the trailing window, none without a tank
    pub statistiques: Option<MesureStatistics>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCodeResponse {
    pub lot_id: Id,
    /// Text to encode in the label
    pub contenu: String,
}
