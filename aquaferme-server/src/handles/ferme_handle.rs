use std::sync::Arc;

use aquaferme_api::models::*;
use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use sqlx::types::Json as SqlJson;
use time::OffsetDateTime;

use crate::errors::{ApiError, BassinError};
use crate::middlewares::{TokenState, auth};
use crate::models::User;
use crate::repositories::FermeRepository;
use crate::services::{Permission, require_permission};

#[derive(Clone)]
pub struct FermeState {
    pub ferme_repository: Arc<FermeRepository>,
}

pub fn ferme_router(ferme_state: FermeState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/ferme", get(get_ferme).put(update_ferme))
        .route("/api/ferme/dashboard", get(get_dashboard))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(ferme_state)
}

#[utoipa::path(
    get,
    path = "/api/ferme",
    tag = "ferme",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Farm profile and alert thresholds", body = FermeResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_ferme(
    Extension(user): Extension<User>,
    State(state): State<FermeState>,
) -> Result<Json<FermeResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let ferme = state.ferme_repository.get().await?;

    Ok(Json(ferme.into()))
}

#[utoipa::path(
    put,
    path = "/api/ferme",
    tag = "ferme",
    request_body = UpdateFermeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Farm updated successfully", body = FermeResponse),
        (status = 400, description = "Invalid name or inconsistent thresholds"),
        (status = 403, description = "Insufficient permission")
    )
)]
pub async fn update_ferme(
    Extension(user): Extension<User>,
    State(state): State<FermeState>,
    Json(body): Json<UpdateFermeRequest>,
) -> Result<Json<FermeResponse>, ApiError> {
    require_permission(user.role(), Permission::MANAGE_FARM)?;

    let mut ferme = state.ferme_repository.get().await?;

    if let Some(nom) = body.nom {
        if nom.trim().is_empty() {
            return Err(BassinError::InvalidRequest.into());
        }
        ferme.nom = nom.trim().to_string();
    }

    if let Some(seuils) = body.seuils {
        if !seuils.is_consistent() {
            return Err(BassinError::InvalidSeuils.into());
        }
        ferme.seuils = SqlJson(seuils);
    }

    ferme.adresse = body.adresse.or(ferme.adresse);
    ferme.responsable = body.responsable.or(ferme.responsable);
    ferme.telephone = body.telephone.or(ferme.telephone);
    ferme.email = body.email.or(ferme.email);
    ferme.updated_at = OffsetDateTime::now_utc();

    let mut tx = state.ferme_repository.get_pool().begin().await?;

    state.ferme_repository.update(&ferme, &mut tx).await?;

    tx.commit().await?;

    tracing::info!("farm profile updated by user {}", user.id);

    Ok(Json(ferme.into()))
}

#[utoipa::path(
    get,
    path = "/api/ferme/dashboard",
    tag = "ferme",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Farm wide counters", body = DashboardResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_dashboard(
    Extension(user): Extension<User>,
    State(state): State<FermeState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let dashboard = state.ferme_repository.dashboard().await?;

    Ok(Json(dashboard))
}
