use aquaferme_api::models::{AlerteType, Seuils};

use crate::models::Mesure;

/// A reading outside the farm thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub parametre: &'static str,
    pub alerte_type: AlerteType,
    pub message: String,
}

impl Violation {
    fn warning(parametre: &'static str, message: String) -> Self {
        Self {
            parametre,
            alerte_type: AlerteType::Warning,
            message,
        }
    }
}

/// Checks a reading against the thresholds.
///
/// Low oxygen is an error, every other excursion a warning.
pub fn evaluate_mesure(mesure: &Mesure, seuils: &Seuils) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(temperature) = mesure.temperature {
        if temperature < seuils.temperature_min {
            violations.push(Violation::warning(
                "temperature",
                format!(
                    "Temperature trop basse: {temperature:.1} °C (min {:.1})",
                    seuils.temperature_min
                ),
            ));
        } else if temperature > seuils.temperature_max {
            violations.push(Violation::warning(
                "temperature",
                format!(
                    "Temperature trop elevee: {temperature:.1} °C (max {:.1})",
                    seuils.temperature_max
                ),
            ));
        }
    }

    if let Some(ph) = mesure.ph {
        if ph < seuils.ph_min || ph > seuils.ph_max {
            violations.push(Violation::warning(
                "ph",
                format!(
                    "pH hors plage: {ph:.2} (attendu {:.1} - {:.1})",
                    seuils.ph_min, seuils.ph_max
                ),
            ));
        }
    }

    if let Some(oxygen) = mesure.oxygen {
        if oxygen < seuils.oxygen_min {
            violations.push(Violation {
                parametre: "oxygen",
                alerte_type: AlerteType::Error,
                message: format!(
                    "Oxygene dissous critique: {oxygen:.1} mg/L (min {:.1})",
                    seuils.oxygen_min
                ),
            });
        }
    }

    if let Some(salinity) = mesure.salinity {
        if salinity > seuils.salinity_max {
            violations.push(Violation::warning(
                "salinity",
                format!(
                    "Salinite trop elevee: {salinity:.1} ppt (max {:.1})",
                    seuils.salinity_max
                ),
            ));
        }
    }

    if let Some(turbidity) = mesure.turbidity {
        if turbidity > seuils.turbidity_max {
            violations.push(Violation::warning(
                "turbidity",
                format!(
                    "Turbidite trop elevee: {turbidity:.1} NTU (max {:.1})",
                    seuils.turbidity_max
                ),
            ));
        }
    }

    violations
}
