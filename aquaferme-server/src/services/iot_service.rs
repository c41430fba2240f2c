use std::sync::Arc;
use std::time::Duration;

use aquaferme_api::LiveMessage;
use aquaferme_api::models::DeviceStatus;
use sqlx::Error;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::models::Device;
use crate::repositories::DeviceRepository;
use crate::services::LiveRouter;

/// Tracks device presence and announces transitions on the live channel.
pub struct IotService {
    device_repository: Arc<DeviceRepository>,
    live_router: Arc<LiveRouter>,
    offline_timeout: Duration,
}

impl IotService {
    pub fn new(
        device_repository: Arc<DeviceRepository>,
        live_router: Arc<LiveRouter>,
        offline_timeout: Duration,
    ) -> Self {
        Self {
            device_repository,
            live_router,
            offline_timeout,
        }
    }

    /// Records traffic from a device, announcing it when this call brought it
    /// back online.
    pub async fn touch(&self, device: &Device) -> Result<Device, Error> {
        let mut tx = self.device_repository.get_pool().begin().await?;
        let (updated, reconnected) = self
            .device_repository
            .mark_seen(device.id, OffsetDateTime::now_utc(), &mut tx)
            .await?;
        tx.commit().await?;

        if reconnected {
            tracing::info!("device {} ({}) is online", updated.id, updated.nom);

            let status = updated.status();
            self.live_router
                .publish(LiveMessage::IotConnected(status.clone()))
                .await;
            self.live_router
                .publish(LiveMessage::IotStatusUpdate(status))
                .await;
        }

        Ok(updated)
    }

    /// Marks silent devices offline and returns them.
    pub async fn sweep(&self) -> Result<Vec<Device>, Error> {
        let cutoff = OffsetDateTime::now_utc() - self.offline_timeout;

        let mut tx = self.device_repository.get_pool().begin().await?;
        let devices = self
            .device_repository
            .mark_offline_before(cutoff, &mut tx)
            .await?;
        tx.commit().await?;

        for device in &devices {
            tracing::info!("device {} ({}) went offline", device.id, device.nom);

            let status = device.status();
            self.live_router
                .publish(LiveMessage::IotDisconnected(status.clone()))
                .await;
            self.live_router
                .publish(LiveMessage::IotStatusUpdate(status))
                .await;
        }

        Ok(devices)
    }

    pub async fn snapshot(&self) -> Result<Vec<DeviceStatus>, Error> {
        let devices = self.device_repository.find_all().await?;

        Ok(devices.iter().map(Device::status).collect())
    }

    pub fn start_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            loop {
                interval.tick().await;

                if let Err(e) = self.sweep().await {
                    tracing::error!("device presence sweep failed: {}", e);
                }
            }
        })
    }
}
