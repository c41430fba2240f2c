use std::sync::Arc;

use aquaferme_api::LiveMessage;
use aquaferme_api::models::CreateMesureRequest;
use sqlx::Error;
use time::OffsetDateTime;

use crate::models::{Alerte, Mesure};
use crate::repositories::{AlerteRepository, FermeRepository, MesureRepository};
use crate::services::{LiveRouter, evaluate_mesure};

/// Stores readings, raises threshold alerts and relays both to dashboards.
pub struct MesureService {
    mesure_repository: Arc<MesureRepository>,
    alerte_repository: Arc<AlerteRepository>,
    ferme_repository: Arc<FermeRepository>,
    live_router: Arc<LiveRouter>,
}

impl MesureService {
    pub fn new(
        mesure_repository: Arc<MesureRepository>,
        alerte_repository: Arc<AlerteRepository>,
        ferme_repository: Arc<FermeRepository>,
        live_router: Arc<LiveRouter>,
    ) -> Self {
        Self {
            mesure_repository,
            alerte_repository,
            ferme_repository,
            live_router,
        }
    }

    pub async fn record(
        &self,
        bassin_id: i32,
        request: &CreateMesureRequest,
    ) -> Result<(Mesure, Vec<Alerte>), Error> {
        let seuils = self.ferme_repository.get().await?.seuils.0;

        let mut mesure = Mesure {
            id: 0,
            bassin_id,
            timestamp: request.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
            temperature: request.temperature,
            ph: request.ph,
            oxygen: request.oxygen,
            salinity: request.salinity,
            turbidity: request.turbidity,
        };

        let mut tx = self.mesure_repository.get_pool().begin().await?;

        mesure.id = self.mesure_repository.create(&mesure, &mut tx).await?;

        let mut alertes = Vec::new();
        for violation in evaluate_mesure(&mesure, &seuils) {
            if self
                .alerte_repository
                .has_unresolved(bassin_id, violation.parametre, &mut tx)
                .await?
            {
                continue;
            }

            let mut alerte = Alerte {
                id: 0,
                bassin_id: Some(bassin_id),
                parametre: Some(violation.parametre.to_string()),
                message: violation.message,
                type_alerte: violation.alerte_type.to_string(),
                date: mesure.timestamp,
                resolved: false,
            };
            alerte.id = self.alerte_repository.create(&alerte, &mut tx).await?;
            alertes.push(alerte);
        }

        tx.commit().await?;

        self.live_router
            .publish(LiveMessage::Mesure(mesure.clone().into()))
            .await;

        for alerte in &alertes {
            tracing::info!(
                "alert raised on bassin {}: {}",
                bassin_id,
                alerte.message
            );
            self.live_router
                .publish(LiveMessage::Alerte(alerte.clone().into()))
                .await;
        }

        Ok((mesure, alertes))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::*;

    use super::*;

    fn service(storage: Arc<crate::configs::Storage>, live_router: Arc<LiveRouter>) -> MesureService {
        MesureService::new(
            Arc::new(MesureRepository::new(storage.clone())),
            Arc::new(AlerteRepository::new(storage.clone())),
            Arc::new(FermeRepository::new(storage.clone())),
            live_router,
        )
    }

    #[tokio::test]
    async fn test_record_raises_alert_once() {
        let storage = setup_test_db().await;
        let live_router = Arc::new(LiveRouter::new());
        let service = service(storage.clone(), live_router.clone());
        let bassin = create_test_bassin(storage.clone(), "B-record", 800).await;
        let (_, mut receiver) = live_router.subscribe().await;

        let low_oxygen = CreateMesureRequest {
            temperature: Some(25.0),
            oxygen: Some(3.0),
            ..Default::default()
        };

        let (mesure, alertes) = service.record(bassin.id, &low_oxygen).await.unwrap();
        assert!(mesure.id > 0);
        assert_eq!(alertes.len(), 1);
        assert_eq!(alertes[0].type_alerte, "error");

        assert_eq!(receiver.recv().await.unwrap().kind(), "mesure");
        assert_eq!(receiver.recv().await.unwrap().kind(), "alerte");

        let (_, alertes) = service.record(bassin.id, &low_oxygen).await.unwrap();
        assert!(alertes.is_empty());
    }
}
