use std::sync::Arc;

use aquaferme_api::models::*;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use time::{Duration, OffsetDateTime};

use crate::errors::{ApiError, BassinError, LotError};
use crate::middlewares::{TokenState, auth};
use crate::models::User;
use crate::repositories::{BassinRepository, LotRepository, MesureRepository};
use crate::services::{Permission, compute_statistics, require_permission};

#[derive(Clone)]
pub struct HistoriqueState {
    pub bassin_repository: Arc<BassinRepository>,
    pub lot_repository: Arc<LotRepository>,
    pub mesure_repository: Arc<MesureRepository>,
    /// Lookback used when no start is given.
    pub window: Duration,
}

pub fn historique_router(historique_state: HistoriqueState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/historique", get(get_historique))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(historique_state)
}

#[utoipa::path(
    get,
    path = "/api/historique",
    tag = "historique",
    params(
        ("bassin_id" = Option<i32>, Query, description = "Bassin to report on"),
        ("lot_id" = Option<i32>, Query, description = "Report on the bassin hosting this lot"),
        ("start" = Option<String>, Query, description = "RFC 3339 lower bound, defaults to the history window"),
        ("end" = Option<String>, Query, description = "RFC 3339 upper bound, defaults to now")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Readings and per parameter statistics", body = HistoriqueResponse),
        (status = 400, description = "No target, lot without bassin or invalid range"),
        (status = 404, description = "Bassin or lot not found")
    )
)]
pub async fn get_historique(
    Extension(user): Extension<User>,
    State(state): State<HistoriqueState>,
    Query(query): Query<HistoriqueQuery>,
) -> Result<Json<HistoriqueResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let bassin_id = match (query.bassin_id, query.lot_id) {
        (Some(bassin_id), _) => bassin_id,
        (None, Some(lot_id)) => state
            .lot_repository
            .find_by_id(lot_id)
            .await?
            .ok_or(LotError::LotNotFound)?
            .bassin_id
            .ok_or(LotError::NoBassin)?,
        (None, None) => return Err(BassinError::InvalidRequest.into()),
    };

    let end = query.end.unwrap_or_else(OffsetDateTime::now_utc);
    let start = query.start.unwrap_or(end - state.window);

    if start > end {
        return Err(BassinError::InvalidTimeRange.into());
    }

    let bassin = state
        .bassin_repository
        .find_by_id(bassin_id)
        .await?
        .ok_or(BassinError::BassinNotFound)?;

    let mesures = state
        .mesure_repository
        .find_by_bassin_in_range(bassin_id, start, end, None)
        .await?;

    let statistiques = compute_statistics(&mesures);

    Ok(Json(HistoriqueResponse {
        bassin: bassin.summary(),
        start,
        end,
        mesures: mesures.into_iter().map(Into::into).collect(),
        statistiques,
    }))
}
