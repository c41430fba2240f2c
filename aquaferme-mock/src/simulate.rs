use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Water lags the air, so the peak sits in the late afternoon.
pub fn simulated_temperature(base: f64, day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.375) * 2.0 * PI;

    base + radians.sin() * 1.5
}

/// Photosynthesis pushes oxygen up during daylight.
pub fn simulated_oxygen(day_fraction: f64) -> f64 {
    if (0.25..=0.75).contains(&day_fraction) {
        let radians = (day_fraction - 0.25) * 2.0 * PI;
        6.0 + radians.sin() * 2.0
    } else {
        5.5
    }
}

pub fn simulated_ph(day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.25) * 2.0 * PI;

    7.2 + radians.sin() * 0.3
}

pub fn with_noise<R: Rng + ?Sized>(rng: &mut R, value: f64, std_dev: f64) -> f64 {
    match Normal::new(0.0, std_dev) {
        Ok(normal) => value + normal.sample(rng),
        Err(_) => value,
    }
}
