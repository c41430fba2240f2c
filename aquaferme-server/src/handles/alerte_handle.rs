use std::sync::Arc;

use aquaferme_api::LiveMessage;
use aquaferme_api::models::*;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Extension, Json, Router, middleware};
use time::OffsetDateTime;

use crate::errors::{AlerteError, ApiError};
use crate::middlewares::{TokenState, auth};
use crate::models::{Alerte, User};
use crate::repositories::{AlerteRepository, BassinRepository};
use crate::services::{LiveRouter, Permission, require_permission};

#[derive(Clone)]
pub struct AlerteState {
    pub alerte_repository: Arc<AlerteRepository>,
    pub bassin_repository: Arc<BassinRepository>,
    pub live_router: Arc<LiveRouter>,
}

pub fn alerte_router(alerte_state: AlerteState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/alertes", get(get_alertes).post(create_alerte))
        .route("/api/alertes/:alerte_id/resolve", put(resolve_alerte))
        .route("/api/alertes/:alerte_id", delete(delete_alerte))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(alerte_state)
}

#[utoipa::path(
    get,
    path = "/api/alertes",
    tag = "alerte",
    params(
        ("resolved" = Option<bool>, Query, description = "Filter on resolution"),
        ("type" = Option<AlerteType>, Query, description = "Filter on severity"),
        ("bassin_id" = Option<i32>, Query, description = "Filter on bassin")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Alerts, most recent first", body = Vec<AlerteResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_alertes(
    Extension(user): Extension<User>,
    State(state): State<AlerteState>,
    Query(query): Query<AlerteQuery>,
) -> Result<Json<Vec<AlerteResponse>>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let alertes = state.alerte_repository.find_all(&query).await?;

    Ok(Json(alertes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/alertes",
    tag = "alerte",
    request_body = CreateAlerteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Notice recorded and broadcast", body = AlerteResponse),
        (status = 400, description = "Empty message or unknown bassin"),
        (status = 403, description = "Insufficient permission")
    )
)]
pub async fn create_alerte(
    Extension(user): Extension<User>,
    State(state): State<AlerteState>,
    Json(body): Json<CreateAlerteRequest>,
) -> Result<(StatusCode, Json<AlerteResponse>), ApiError> {
    require_permission(user.role(), Permission::MANAGE_ALERTES)?;

    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(AlerteError::InvalidRequest.into());
    }

    if let Some(bassin_id) = body.bassin_id {
        state
            .bassin_repository
            .find_by_id(bassin_id)
            .await?
            .ok_or(AlerteError::InvalidRequest)?;
    }

    let mut alerte = Alerte {
        id: 0,
        bassin_id: body.bassin_id,
        parametre: None,
        message,
        type_alerte: body.alerte_type.to_string(),
        date: OffsetDateTime::now_utc(),
        resolved: false,
    };

    let mut tx = state.alerte_repository.get_pool().begin().await?;

    alerte.id = state.alerte_repository.create(&alerte, &mut tx).await?;

    tx.commit().await?;

    let response: AlerteResponse = alerte.into();
    state
        .live_router
        .publish(LiveMessage::Alerte(response.clone()))
        .await;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/alertes/{alerte_id}/resolve",
    tag = "alerte",
    params(
        ("alerte_id" = i32, Path, description = "Alert ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Alert marked as resolved", body = AlerteResponse),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Alert not found")
    )
)]
pub async fn resolve_alerte(
    Extension(user): Extension<User>,
    State(state): State<AlerteState>,
    Path(alerte_id): Path<i32>,
) -> Result<Json<AlerteResponse>, ApiError> {
    require_permission(user.role(), Permission::MANAGE_ALERTES)?;

    let mut alerte = state
        .alerte_repository
        .find_by_id(alerte_id)
        .await?
        .ok_or(AlerteError::AlerteNotFound)?;

    let mut tx = state.alerte_repository.get_pool().begin().await?;

    state.alerte_repository.resolve(alerte_id, &mut tx).await?;

    tx.commit().await?;

    alerte.resolved = true;

    Ok(Json(alerte.into()))
}

#[utoipa::path(
    delete,
    path = "/api/alertes/{alerte_id}",
    tag = "alerte",
    params(
        ("alerte_id" = i32, Path, description = "Alert ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Alert deleted successfully"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Alert not found")
    )
)]
pub async fn delete_alerte(
    Extension(user): Extension<User>,
    State(state): State<AlerteState>,
    Path(alerte_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    require_permission(user.role(), Permission::MANAGE_ALERTES)?;

    state
        .alerte_repository
        .find_by_id(alerte_id)
        .await?
        .ok_or(AlerteError::AlerteNotFound)?;

    let mut tx = state.alerte_repository.get_pool().begin().await?;

    state.alerte_repository.delete(alerte_id, &mut tx).await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
