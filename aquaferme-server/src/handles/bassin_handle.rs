use std::sync::Arc;

use aquaferme_api::models::*;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use sqlx::types::Json as SqlJson;
use time::{Duration, OffsetDateTime};

use crate::errors::{ApiError, BassinError, IotError};
use crate::middlewares::{TokenState, auth};
use crate::models::{Bassin, User};
use crate::repositories::{BassinRepository, LotRepository, MesureRepository};
use crate::services::{MesureService, Permission, require_permission};

#[derive(Clone)]
pub struct BassinState {
    pub bassin_repository: Arc<BassinRepository>,
    pub lot_repository: Arc<LotRepository>,
    pub mesure_repository: Arc<MesureRepository>,
    pub mesure_service: Arc<MesureService>,
    /// Default lookback of reading listings.
    pub window: Duration,
}

pub fn bassin_router(bassin_state: BassinState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/bassins", get(get_bassins).post(create_bassin))
        .route(
            "/api/bassins/:bassin_id",
            get(get_bassin_by_id).put(update_bassin).delete(delete_bassin),
        )
        .route(
            "/api/bassins/:bassin_id/mesures",
            get(get_bassin_mesures).post(create_bassin_mesure),
        )
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(bassin_state)
}

fn validate_name(nom: &str) -> Result<String, BassinError> {
    let nom = nom.trim();
    if nom.is_empty() {
        return Err(BassinError::InvalidRequest);
    }
    Ok(nom.to_string())
}

#[utoipa::path(
    get,
    path = "/api/bassins",
    tag = "bassin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Successfully retrieved bassins", body = Vec<BassinResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_bassins(
    Extension(user): Extension<User>,
    State(state): State<BassinState>,
) -> Result<Json<Vec<BassinResponse>>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let bassins = state.bassin_repository.find_all().await?;

    Ok(Json(bassins.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/bassins",
    tag = "bassin",
    request_body = CreateBassinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Bassin created successfully", body = BassinResponse),
        (status = 400, description = "Empty name or non positive capacity"),
        (status = 403, description = "Insufficient permission"),
        (status = 409, description = "Bassin name already exists")
    )
)]
pub async fn create_bassin(
    Extension(user): Extension<User>,
    State(state): State<BassinState>,
    Json(body): Json<CreateBassinRequest>,
) -> Result<(StatusCode, Json<BassinResponse>), ApiError> {
    require_permission(user.role(), Permission::MANAGE_BASSINS)?;

    let nom = validate_name(&body.nom)?;

    if body.capacite <= 0 {
        return Err(BassinError::InvalidRequest.into());
    }

    if state.bassin_repository.find_by_name(&nom).await?.is_some() {
        return Err(BassinError::BassinNameExists.into());
    }

    let mut bassin = Bassin {
        id: 0,
        nom,
        capacite: body.capacite,
        especes: SqlJson(body.especes),
        statut: body.statut.unwrap_or_default().to_string(),
        stade: body.stade,
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = state.bassin_repository.get_pool().begin().await?;

    bassin.id = state
        .bassin_repository
        .create(&bassin, &mut tx)
        .await
        .map_err(ApiError::unique_as(BassinError::BassinNameExists))?;

    tx.commit().await?;

    tracing::info!("bassin {} ({}) created", bassin.id, bassin.nom);

    Ok((StatusCode::CREATED, Json(bassin.into())))
}

#[utoipa::path(
    get,
    path = "/api/bassins/{bassin_id}",
    tag = "bassin",
    params(
        ("bassin_id" = i32, Path, description = "Bassin ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bassin with its lots and latest reading", body = BassinDetailResponse),
        (status = 404, description = "Bassin not found")
    )
)]
pub async fn get_bassin_by_id(
    Extension(user): Extension<User>,
    State(state): State<BassinState>,
    Path(bassin_id): Path<i32>,
) -> Result<Json<BassinDetailResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let bassin = state
        .bassin_repository
        .find_by_id(bassin_id)
        .await?
        .ok_or(BassinError::BassinNotFound)?;

    let lots = state
        .lot_repository
        .find_all(&LotQuery {
            bassin_id: Some(bassin_id),
            ..Default::default()
        })
        .await?;

    let derniere_mesure = state
        .mesure_repository
        .find_latest_by_bassin_id(bassin_id)
        .await?;

    Ok(Json(BassinDetailResponse {
        info: bassin.into(),
        lots: lots.into_iter().map(Into::into).collect(),
        derniere_mesure: derniere_mesure.map(Into::into),
    }))
}

#[utoipa::path(
    put,
    path = "/api/bassins/{bassin_id}",
    tag = "bassin",
    params(
        ("bassin_id" = i32, Path, description = "Bassin ID")
    ),
    request_body = UpdateBassinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bassin updated successfully", body = BassinResponse),
        (status = 400, description = "Invalid request parameters"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Bassin not found"),
        (status = 409, description = "Bassin name already exists")
    )
)]
pub async fn update_bassin(
    Extension(user): Extension<User>,
    State(state): State<BassinState>,
    Path(bassin_id): Path<i32>,
    Json(body): Json<UpdateBassinRequest>,
) -> Result<Json<BassinResponse>, ApiError> {
    require_permission(user.role(), Permission::MANAGE_BASSINS)?;

    let mut bassin = state
        .bassin_repository
        .find_by_id(bassin_id)
        .await?
        .ok_or(BassinError::BassinNotFound)?;

    if let Some(nom) = &body.nom {
        let nom = validate_name(nom)?;
        if let Some(other) = state.bassin_repository.find_by_name(&nom).await? {
            if other.id != bassin_id {
                return Err(BassinError::BassinNameExists.into());
            }
        }
        bassin.nom = nom;
    }

    if let Some(capacite) = body.capacite {
        if capacite <= 0 {
            return Err(BassinError::InvalidRequest.into());
        }
        bassin.capacite = capacite;
    }

    if let Some(especes) = body.especes {
        bassin.especes = SqlJson(especes);
    }

    if let Some(statut) = body.statut {
        bassin.statut = statut.to_string();
    }

    bassin.stade = body.stade.or(bassin.stade);

    let mut tx = state.bassin_repository.get_pool().begin().await?;

    state
        .bassin_repository
        .update(bassin_id, &bassin, &mut tx)
        .await
        .map_err(ApiError::unique_as(BassinError::BassinNameExists))?;

    tx.commit().await?;

    Ok(Json(bassin.into()))
}

#[utoipa::path(
    delete,
    path = "/api/bassins/{bassin_id}",
    tag = "bassin",
    params(
        ("bassin_id" = i32, Path, description = "Bassin ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Bassin deleted successfully"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Bassin not found"),
        (status = 409, description = "Bassin still holds lots")
    )
)]
pub async fn delete_bassin(
    Extension(user): Extension<User>,
    State(state): State<BassinState>,
    Path(bassin_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    require_permission(user.role(), Permission::MANAGE_BASSINS)?;

    state
        .bassin_repository
        .find_by_id(bassin_id)
        .await?
        .ok_or(BassinError::BassinNotFound)?;

    if state.bassin_repository.count_lots(bassin_id).await? > 0 {
        return Err(BassinError::BassinNotEmpty.into());
    }

    let mut tx = state.bassin_repository.get_pool().begin().await?;

    state.bassin_repository.delete(bassin_id, &mut tx).await?;

    tx.commit().await?;

    tracing::info!("bassin {} deleted by user {}", bassin_id, user.id);

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/bassins/{bassin_id}/mesures",
    tag = "bassin",
    params(
        ("bassin_id" = i32, Path, description = "Bassin ID"),
        ("start" = Option<String>, Query, description = "RFC 3339 lower bound, defaults to the history window"),
        ("end" = Option<String>, Query, description = "RFC 3339 upper bound, defaults to now"),
        ("limit" = Option<i64>, Query, description = "Keep only the most recent readings")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Readings in chronological order", body = Vec<MesureResponse>),
        (status = 400, description = "Invalid time range"),
        (status = 404, description = "Bassin not found")
    )
)]
pub async fn get_bassin_mesures(
    Extension(user): Extension<User>,
    State(state): State<BassinState>,
    Path(bassin_id): Path<i32>,
    Query(query): Query<TimeRangeQuery>,
) -> Result<Json<Vec<MesureResponse>>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    state
        .bassin_repository
        .find_by_id(bassin_id)
        .await?
        .ok_or(BassinError::BassinNotFound)?;

    let end = query.end.unwrap_or_else(OffsetDateTime::now_utc);
    let start = query.start.unwrap_or(end - state.window);

    if start > end || query.limit.is_some_and(|limit| limit <= 0) {
        return Err(BassinError::InvalidTimeRange.into());
    }

    let mesures = state
        .mesure_repository
        .find_by_bassin_in_range(bassin_id, start, end, query.limit)
        .await?;

    Ok(Json(mesures.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/bassins/{bassin_id}/mesures",
    tag = "bassin",
    params(
        ("bassin_id" = i32, Path, description = "Bassin ID")
    ),
    request_body = CreateMesureRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Reading stored and checked against thresholds", body = MesureResponse),
        (status = 400, description = "Reading carries no value"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Bassin not found")
    )
)]
pub async fn create_bassin_mesure(
    Extension(user): Extension<User>,
    State(state): State<BassinState>,
    Path(bassin_id): Path<i32>,
    Json(body): Json<CreateMesureRequest>,
) -> Result<(StatusCode, Json<MesureResponse>), ApiError> {
    require_permission(user.role(), Permission::RECORD_MESURES)?;

    if body.is_empty() {
        return Err(IotError::EmptyMesure.into());
    }

    state
        .bassin_repository
        .find_by_id(bassin_id)
        .await?
        .ok_or(BassinError::BassinNotFound)?;

    let (mesure, _) = state.mesure_service.record(bassin_id, &body).await?;

    Ok((StatusCode::CREATED, Json(mesure.into())))
}
