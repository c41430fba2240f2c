use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{BassinSummary, Id, MesureResponse, MesureStatistics};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoriqueQuery {
    pub bassin_id: Option<Id>,
    /// Resolved to the tank hosting the lot
    pub lot_id: Option<Id>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoriqueResponse {
    pub bassin: BassinSummary,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
    /// Readings in chronological order
    pub mesures: Vec<MesureResponse>,
    pub statistiques: MesureStatistics,
}
