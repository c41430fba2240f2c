use std::error::Error;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub interval: u64,
    pub day_length: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedDevice {
    pub device_key: String,
    /// Daily mean water temperature in Celsius
    pub base_temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub server: Server,
    pub simulation: Simulation,
    pub devices: Vec<SimulatedDevice>,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/configs/default.toml"
        )))?;

        if settings.simulation.day_length == 0 {
            return Err("simulation.day_length must be positive".into());
        }

        Ok(settings)
    }
}
