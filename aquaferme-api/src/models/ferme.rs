use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Water quality limits used to raise alerts on incoming readings.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seuils {
    /// Minimum water temperature in Celsius
    pub temperature_min: f64,
    /// Maximum water temperature in Celsius
    pub temperature_max: f64,
    pub ph_min: f64,
    pub ph_max: f64,
    /// Minimum dissolved oxygen in mg/L
    pub oxygen_min: f64,
    /// Maximum salinity in ppt
    pub salinity_max: f64,
    /// Maximum turbidity in NTU
    pub turbidity_max: f64,
}

impl Default for Seuils {
    fn default() -> Self {
        Self {
            temperature_min: 18.0,
            temperature_max: 30.0,
            ph_min: 6.5,
            ph_max: 8.5,
            oxygen_min: 5.0,
            salinity_max: 35.0,
            turbidity_max: 50.0,
        }
    }
}

impl Seuils {
    pub fn is_consistent(&self) -> bool {
        self.temperature_min <= self.temperature_max
            && self.ph_min <= self.ph_max
            && self.oxygen_min >= 0.0
            && self.salinity_max >= 0.0
            && self.turbidity_max >= 0.0
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FermeResponse {
    pub nom: String,
    pub adresse: Option<String>,
    pub responsable: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub seuils: Seuils,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFermeRequest {
    pub nom: Option<String>,
    pub adresse: Option<String>,
    pub responsable: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub seuils: Option<Seuils>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub bassins: i64,
    pub lots_actifs: i64,
    /// Sum of the quantities of all lots
    pub poissons_en_stock: i64,
    /// Number of sales, cancelled ones excluded
    pub ventes: i64,
    /// Revenue of non cancelled sales
    pub chiffre_affaires: f64,
    pub alertes_non_resolues: i64,
    pub devices_en_ligne: i64,
    pub devices_total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_consistent() {
        assert!(Seuils::default().is_consistent());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let seuils = Seuils {
            ph_min: 9.0,
            ph_max: 7.0,
            ..Seuils::default()
        };
        assert!(!seuils.is_consistent());
    }
}
