use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

/// A reading, every parameter is optional since sensors differ per tank.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMesureRequest {
    /// Water temperature in Celsius
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    /// Dissolved oxygen in mg/L
    pub oxygen: Option<f64>,
    /// Salinity in ppt
    pub salinity: Option<f64>,
    /// Turbidity in NTU
    pub turbidity: Option<f64>,
    /// Defaults to the reception time
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl CreateMesureRequest {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.ph.is_none()
            && self.oxygen.is_none()
            && self.salinity.is_none()
            && self.turbidity.is_none()
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MesureResponse {
    pub id: Id,
    pub bassin_id: Id,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    pub oxygen: Option<f64>,
    pub salinity: Option<f64>,
    pub turbidity: Option<f64>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterStatistics {
    pub min: f64,
    pub max: f64,
    pub moyenne: f64,
    /// Number of readings carrying the parameter
    pub count: usize,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MesureStatistics {
    pub temperature: Option<ParameterStatistics>,
    pub ph: Option<ParameterStatistics>,
    pub oxygen: Option<ParameterStatistics>,
    pub salinity: Option<ParameterStatistics>,
    pub turbidity: Option<ParameterStatistics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRangeQuery {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
    /// Keep only the most recent readings
    pub limit: Option<i64>,
}
