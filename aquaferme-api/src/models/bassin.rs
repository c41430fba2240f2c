use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Id, LotResponse, MesureResponse};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BassinStatut {
    #[default]
    Actif,
    Inactif,
    Maintenance,
}

impl From<String> for BassinStatut {
    fn from(value: String) -> Self {
        match value.as_str() {
            "inactif" => BassinStatut::Inactif,
            "maintenance" => BassinStatut::Maintenance,
            _ => BassinStatut::Actif,
        }
    }
}

impl Display for BassinStatut {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BassinStatut::Actif => write!(f, "actif"),
            BassinStatut::Inactif => write!(f, "inactif"),
            BassinStatut::Maintenance => write!(f, "maintenance"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBassinRequest {
    /// Tank name, unique
    pub nom: String,
    /// Capacity in number of fish
    pub capacite: i32,
    /// Species the tank is fit for
    #[serde(default)]
    pub especes: Vec<String>,
    pub statut: Option<BassinStatut>,
    /// Growth stage hosted by the tank
    pub stade: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBassinRequest {
    pub nom: Option<String>,
    pub capacite: Option<i32>,
    pub especes: Option<Vec<String>>,
    pub statut: Option<BassinStatut>,
    pub stade: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BassinSummary {
    pub id: Id,
    pub nom: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BassinResponse {
    pub id: Id,
    pub nom: String,
    pub capacite: i32,
    pub especes: Vec<String>,
    pub statut: BassinStatut,
    pub stade: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BassinDetailResponse {
    #[serde(flatten)]
    pub info: BassinResponse,
    /// Lots currently hosted
    pub lots: Vec<LotResponse>,
    /// Most recent reading, if any
    pub derniere_mesure: Option<MesureResponse>,
}
