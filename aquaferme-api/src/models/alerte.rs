use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlerteType {
    Error,
    Warning,
    #[default]
    Info,
}

impl From<String> for AlerteType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "error" => AlerteType::Error,
            "warning" => AlerteType::Warning,
            _ => AlerteType::Info,
        }
    }
}

impl Display for AlerteType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AlerteType::Error => write!(f, "error"),
            AlerteType::Warning => write!(f, "warning"),
            AlerteType::Info => write!(f, "info"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAlerteRequest {
    pub message: String,
    #[serde(rename = "type", default)]
    pub alerte_type: AlerteType,
    pub bassin_id: Option<Id>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlerteResponse {
    pub id: Id,
    pub bassin_id: Option<Id>,
    /// Measured parameter that raised the alert
    pub parametre: Option<String>,
    pub message: String,
    #[serde(rename = "type")]
    pub alerte_type: AlerteType,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub resolved: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlerteQuery {
    pub resolved: Option<bool>,
    #[serde(rename = "type")]
    pub alerte_type: Option<AlerteType>,
    pub bassin_id: Option<Id>,
}
