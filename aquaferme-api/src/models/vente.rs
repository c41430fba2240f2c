use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenteStatut {
    #[default]
    EnAttente,
    Payee,
    Livree,
    /// Cancelled sales hold no stock
    Annulee,
}

impl VenteStatut {
    pub fn holds_stock(&self) -> bool {
        !matches!(self, VenteStatut::Annulee)
    }
}

impl From<String> for VenteStatut {
    fn from(value: String) -> Self {
        match value.as_str() {
            "payee" => VenteStatut::Payee,
            "livree" => VenteStatut::Livree,
            "annulee" => VenteStatut::Annulee,
            _ => VenteStatut::EnAttente,
        }
    }
}

impl Display for VenteStatut {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            VenteStatut::EnAttente => write!(f, "en_attente"),
            VenteStatut::Payee => write!(f, "payee"),
            VenteStatut::Livree => write!(f, "livree"),
            VenteStatut::Annulee => write!(f, "annulee"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVenteRequest {
    /// Lot the fish are taken from
    pub lot_id: Id,
    /// Number of fish sold
    pub quantite: i32,
    /// Price per fish
    pub prix_unitaire: f64,
    /// Registered client
    pub client_id: Option<Id>,
    /// Free text buyer name when no client record exists
    pub client_nom: Option<String>,
    pub statut: Option<VenteStatut>,
    /// Defaults to the creation time
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_vente: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVenteRequest {
    pub lot_id: Option<Id>,
    pub quantite: Option<i32>,
    pub prix_unitaire: Option<f64>,
    pub client_id: Option<Id>,
    pub client_nom: Option<String>,
    pub statut: Option<VenteStatut>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_vente: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotSummary {
    pub id: Id,
    pub nom: String,
    pub espece: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: Id,
    pub nom: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenteResponse {
    pub id: Id,
    /// Joined lot
    pub lot: LotSummary,
    pub quantite: i32,
    pub prix_unitaire: f64,
    /// Always prix_unitaire times quantite
    pub prix_total: f64,
    /// Joined client, if registered
    pub client: Option<ClientSummary>,
    pub client_nom: Option<String>,
    pub statut: VenteStatut,
    #[serde(with = "time::serde::rfc3339")]
    pub date_vente: OffsetDateTime,
    /// User who recorded the sale
    pub vendeur_id: Id,
}
