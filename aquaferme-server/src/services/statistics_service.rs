use aquaferme_api::models::{MesureStatistics, ParameterStatistics};

use crate::models::Mesure;

/// Per-parameter min, max and mean over a set of readings.
///
/// Readings missing a parameter are ignored for that parameter; a parameter
/// absent from every reading yields `None`.
pub fn compute_statistics(mesures: &[Mesure]) -> MesureStatistics {
    MesureStatistics {
        temperature: fold(mesures.iter().filter_map(|m| m.temperature)),
        ph: fold(mesures.iter().filter_map(|m| m.ph)),
        oxygen: fold(mesures.iter().filter_map(|m| m.oxygen)),
        salinity: fold(mesures.iter().filter_map(|m| m.salinity)),
        turbidity: fold(mesures.iter().filter_map(|m| m.turbidity)),
    }
}

fn fold(values: impl Iterator<Item = f64>) -> Option<ParameterStatistics> {
    let (min, max, sum, count) = values.filter(|v| v.is_finite()).fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0, 0usize),
        |(min, max, sum, count), value| (min.min(value), max.max(value), sum + value, count + 1),
    );

    (count > 0).then(|| ParameterStatistics {
        min,
        max,
        moyenne: sum / count as f64,
        count,
    })
}
