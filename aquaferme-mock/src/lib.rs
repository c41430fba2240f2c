use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use aquaferme_api::models::{CreateMesureRequest, DeviceStatus, MesureResponse};
use reqwest::Client;
use tokio::time;

use crate::settings::{Settings, SimulatedDevice};
use crate::simulate::{simulated_oxygen, simulated_ph, simulated_temperature, with_noise};

pub mod settings;
mod simulate;

const DEVICE_KEY_HEADER: &str = "x-device-key";

pub async fn run(settings: &Arc<Settings>) {
    let client = Client::new();
    let mut interval = time::interval(Duration::from_secs(settings.simulation.interval));
    let mut tick: u32 = 0;

    tracing::info!(
        "simulating {} devices against {}",
        settings.devices.len(),
        settings.server.url
    );

    loop {
        interval.tick().await;

        let day_fraction =
            (tick % settings.simulation.day_length) as f64 / settings.simulation.day_length as f64;

        for device in &settings.devices {
            if let Err(e) = heartbeat(&client, &settings.server.url, device).await {
                tracing::warn!("heartbeat failed for {}: {}", device.device_key, e);
                continue;
            }

            let reading = simulate_reading(device, day_fraction);

            match send_reading(&client, &settings.server.url, device, &reading).await {
                Ok(mesure) => tracing::debug!(
                    "bassin {} received mesure {} at {}",
                    mesure.bassin_id,
                    mesure.id,
                    mesure.timestamp
                ),
                Err(e) => tracing::warn!("reading failed for {}: {}", device.device_key, e),
            }
        }

        tick = tick.wrapping_add(1);
    }
}

fn simulate_reading(device: &SimulatedDevice, day_fraction: f64) -> CreateMesureRequest {
    let mut rng = rand::rng();

    CreateMesureRequest {
        temperature: Some(with_noise(
            &mut rng,
            simulated_temperature(device.base_temperature, day_fraction),
            0.2,
        )),
        ph: Some(with_noise(&mut rng, simulated_ph(day_fraction), 0.05)),
        oxygen: Some(with_noise(&mut rng, simulated_oxygen(day_fraction), 0.1).max(0.0)),
        ..Default::default()
    }
}

async fn heartbeat(
    client: &Client,
    base_url: &str,
    device: &SimulatedDevice,
) -> Result<DeviceStatus, Box<dyn Error>> {
    let status = client
        .post(format!("{base_url}/api/iot/heartbeat"))
        .header(DEVICE_KEY_HEADER, &device.device_key)
        .send()
        .await?
        .error_for_status()?
        .json::<DeviceStatus>()
        .await?;

    Ok(status)
}

async fn send_reading(
    client: &Client,
    base_url: &str,
    device: &SimulatedDevice,
    reading: &CreateMesureRequest,
) -> Result<MesureResponse, Box<dyn Error>> {
    let mesure = client
        .post(format!("{base_url}/api/iot/mesures"))
        .header(DEVICE_KEY_HEADER, &device.device_key)
        .json(reading)
        .send()
        .await?
        .error_for_status()?
        .json::<MesureResponse>()
        .await?;

    Ok(mesure)
}
