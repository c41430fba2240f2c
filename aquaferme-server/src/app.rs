use std::sync::Arc;
use std::time::Duration;

use aquaferme_api::models::UserRole;
use anyhow::Context;
use axum::Router;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{AdminSeed, SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::middlewares::TokenState;
use crate::models::User;
use crate::repositories::*;
use crate::services::{AuthService, IotService, LiveRouter, MesureService, StockService, TokenService};

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .context("failed to open the database")?,
    );

    let user_repository = Arc::new(UserRepository::new(storage.clone()));
    let ferme_repository = Arc::new(FermeRepository::new(storage.clone()));
    let bassin_repository = Arc::new(BassinRepository::new(storage.clone()));
    let lot_repository = Arc::new(LotRepository::new(storage.clone()));
    let lot_event_repository = Arc::new(LotEventRepository::new(storage.clone()));
    let vente_repository = Arc::new(VenteRepository::new(storage.clone()));
    let client_repository = Arc::new(ClientRepository::new(storage.clone()));
    let device_repository = Arc::new(DeviceRepository::new(storage.clone()));
    let mesure_repository = Arc::new(MesureRepository::new(storage.clone()));
    let alerte_repository = Arc::new(AlerteRepository::new(storage.clone()));

    let live_router = Arc::new(LiveRouter::new());
    let auth_service = Arc::new(AuthService::new());
    let token_service = Arc::new(TokenService::new(settings.auth.clone()));
    let stock_service = Arc::new(StockService::new(lot_repository.clone()));
    let mesure_service = Arc::new(MesureService::new(
        mesure_repository.clone(),
        alerte_repository.clone(),
        ferme_repository.clone(),
        live_router.clone(),
    ));
    let iot_service = Arc::new(IotService::new(
        device_repository.clone(),
        live_router.clone(),
        Duration::from_secs(settings.iot.offline_timeout),
    ));

    if let Some(admin) = &settings.auth.admin {
        seed_admin(&user_repository, &auth_service, admin).await?;
    }

    iot_service
        .clone()
        .start_sweeper(Duration::from_secs(settings.iot.sweep_interval));

    let window = time::Duration::days(settings.historique.window_days);

    let token_state = TokenState {
        token_service: token_service.clone(),
        user_repository: user_repository.clone(),
    };

    let app = Router::new()
        .merge(auth_router(
            AuthState {
                auth_service: auth_service.clone(),
                token_service: token_service.clone(),
                user_repository: user_repository.clone(),
            },
            token_state.clone(),
        ))
        .merge(user_router(
            UserState {
                auth_service: auth_service.clone(),
                user_repository: user_repository.clone(),
            },
            token_state.clone(),
        ))
        .merge(ferme_router(
            FermeState {
                ferme_repository: ferme_repository.clone(),
            },
            token_state.clone(),
        ))
        .merge(bassin_router(
            BassinState {
                bassin_repository: bassin_repository.clone(),
                lot_repository: lot_repository.clone(),
                mesure_repository: mesure_repository.clone(),
                mesure_service: mesure_service.clone(),
                window,
            },
            token_state.clone(),
        ))
        .merge(lot_router(
            LotState {
                lot_repository: lot_repository.clone(),
                lot_event_repository: lot_event_repository.clone(),
                bassin_repository: bassin_repository.clone(),
                mesure_repository: mesure_repository.clone(),
                window,
            },
            token_state.clone(),
        ))
        .merge(vente_router(
            VenteState {
                vente_repository: vente_repository.clone(),
                lot_repository: lot_repository.clone(),
                client_repository: client_repository.clone(),
                stock_service: stock_service.clone(),
            },
            token_state.clone(),
        ))
        .merge(client_router(
            ClientState {
                client_repository: client_repository.clone(),
                user_repository: user_repository.clone(),
            },
            token_state.clone(),
        ))
        .merge(iot_router(
            IotState {
                device_repository: device_repository.clone(),
                bassin_repository: bassin_repository.clone(),
                iot_service: iot_service.clone(),
                mesure_service: mesure_service.clone(),
                live_router: live_router.clone(),
            },
            token_state.clone(),
        ))
        .merge(alerte_router(
            AlerteState {
                alerte_repository: alerte_repository.clone(),
                bassin_repository: bassin_repository.clone(),
                live_router: live_router.clone(),
            },
            token_state.clone(),
        ))
        .merge(historique_router(
            HistoriqueState {
                bassin_repository,
                lot_repository,
                mesure_repository,
                window,
            },
            token_state,
        ))
        .merge(docs_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}

/// Creates the first administrator when the user table is empty.
async fn seed_admin(
    user_repository: &UserRepository,
    auth_service: &AuthService,
    admin: &AdminSeed,
) -> anyhow::Result<()> {
    if user_repository.count().await? > 0 {
        return Ok(());
    }

    let password = auth_service
        .hash(&admin.password)
        .map_err(|e| anyhow::anyhow!("failed to hash the admin password: {e}"))?;

    let user = User {
        id: 0,
        nom: admin.nom.clone(),
        email: admin.email.clone(),
        password,
        role: UserRole::Admin.to_string(),
        actif: true,
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = user_repository.get_pool().begin().await?;
    let id = user_repository.create(&user, &mut tx).await?;
    tx.commit().await?;

    tracing::warn!("seeded administrator {} ({}), change its password", id, admin.email);

    Ok(())
}
