use std::sync::Arc;

use aquaferme_api::models::*;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use serde_json::json;
use sqlx::{Sqlite, Transaction};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::errors::{ApiError, LotError};
use crate::middlewares::{TokenState, auth};
use crate::models::{Lot, LotChanges, LotEvent, User};
use crate::repositories::{BassinRepository, LotEventRepository, LotRepository, MesureRepository};
use crate::services::{Permission, compute_statistics, require_permission};

#[derive(Clone)]
pub struct LotState {
    pub lot_repository: Arc<LotRepository>,
    pub lot_event_repository: Arc<LotEventRepository>,
    pub bassin_repository: Arc<BassinRepository>,
    pub mesure_repository: Arc<MesureRepository>,
    /// Lookback of the tank statistics attached to a lot history.
    pub window: Duration,
}

pub fn lot_router(lot_state: LotState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/lots", get(get_lots).post(create_lot))
        .route(
            "/api/lots/:lot_id",
            get(get_lot_by_id).put(update_lot).delete(delete_lot),
        )
        .route("/api/lots/:lot_id/transfert", post(transfer_lot))
        .route("/api/lots/:lot_id/qrcode", post(generate_qr_code))
        .route("/api/lots/:lot_id/historique", get(get_lot_historique))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(lot_state)
}

impl LotState {
    async fn ensure_bassin(&self, bassin_id: i32) -> Result<(), ApiError> {
        self.bassin_repository
            .find_by_id(bassin_id)
            .await?
            .ok_or(LotError::UnknownBassin)?;

        Ok(())
    }

    async fn load_response(&self, lot_id: i32) -> Result<LotResponse, ApiError> {
        let row = self
            .lot_repository
            .find_row_by_id(lot_id)
            .await?
            .ok_or(LotError::LotNotFound)?;

        Ok(row.into())
    }

    async fn load_events(&self, lot_id: i32) -> Result<Vec<LotEventResponse>, ApiError> {
        let events = self.lot_event_repository.find_by_lot_id(lot_id).await?;

        Ok(events.into_iter().map(Into::into).collect())
    }

    async fn record_transfer(
        &self,
        lot_id: i32,
        source: Option<i32>,
        destination: i32,
        description: Option<String>,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), ApiError> {
        self.lot_repository
            .move_to_bassin(lot_id, destination, transaction)
            .await?;

        let event = LotEvent {
            id: 0,
            lot_id,
            type_evenement: LotEventType::Transfert.to_string(),
            bassin_source_id: source,
            bassin_destination_id: Some(destination),
            description,
            date: OffsetDateTime::now_utc(),
        };
        self.lot_event_repository.create(&event, transaction).await?;

        tracing::info!("lot {} moved from {:?} to bassin {}", lot_id, source, destination);

        Ok(())
    }
}

#[utoipa::path(
    get,
    path = "/api/lots",
    tag = "lot",
    params(
        ("bassin_id" = Option<i32>, Query, description = "Only lots hosted by this bassin"),
        ("statut" = Option<LotStatut>, Query, description = "Only lots with this status"),
        ("espece" = Option<String>, Query, description = "Only lots of this species")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Lots with their bassin", body = Vec<LotResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_lots(
    Extension(user): Extension<User>,
    State(state): State<LotState>,
    Query(query): Query<LotQuery>,
) -> Result<Json<Vec<LotResponse>>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let rows = state.lot_repository.find_all(&query).await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/lots",
    tag = "lot",
    request_body = CreateLotRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Lot created with its creation event", body = LotResponse),
        (status = 400, description = "Invalid request or unknown bassin"),
        (status = 403, description = "Insufficient permission"),
        (status = 409, description = "Lot name already exists")
    )
)]
pub async fn create_lot(
    Extension(user): Extension<User>,
    State(state): State<LotState>,
    Json(body): Json<CreateLotRequest>,
) -> Result<(StatusCode, Json<LotResponse>), ApiError> {
    require_permission(user.role(), Permission::MANAGE_LOTS)?;

    let nom = body.nom.trim().to_string();
    let espece = body.espece.trim().to_string();

    if nom.is_empty() || espece.is_empty() || body.quantite < 0 {
        return Err(LotError::InvalidRequest.into());
    }

    if state.lot_repository.find_by_name(&nom).await?.is_some() {
        return Err(LotError::LotNameExists.into());
    }

    if let Some(bassin_id) = body.bassin_id {
        state.ensure_bassin(bassin_id).await?;
    }

    let date_creation = body.date_creation.unwrap_or_else(OffsetDateTime::now_utc);
    let lot = Lot {
        id: 0,
        nom,
        espece,
        quantite: body.quantite,
        bassin_id: body.bassin_id,
        stade: body.stade,
        statut: LotStatut::Actif.to_string(),
        poids_moyen: body.poids_moyen,
        taille_moyenne: body.taille_moyenne,
        date_creation,
        qr_code_genere: false,
    };

    let mut tx = state.lot_repository.get_pool().begin().await?;

    let lot_id = state
        .lot_repository
        .create(&lot, &mut tx)
        .await
        .map_err(ApiError::unique_as(LotError::LotNameExists))?;

    let event = LotEvent {
        id: 0,
        lot_id,
        type_evenement: LotEventType::Creation.to_string(),
        bassin_source_id: None,
        bassin_destination_id: lot.bassin_id,
        description: Some(format!("Creation du lot avec {} poissons", lot.quantite)),
        date: date_creation,
    };
    state.lot_event_repository.create(&event, &mut tx).await?;

    tx.commit().await?;

    tracing::info!("lot {} ({}) created by user {}", lot_id, lot.nom, user.id);

    let response = state.load_response(lot_id).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/lots/{lot_id}",
    tag = "lot",
    params(
        ("lot_id" = i32, Path, description = "Lot ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Lot with its event log", body = LotDetailResponse),
        (status = 404, description = "Lot not found")
    )
)]
pub async fn get_lot_by_id(
    Extension(user): Extension<User>,
    State(state): State<LotState>,
    Path(lot_id): Path<i32>,
) -> Result<Json<LotDetailResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let info = state.load_response(lot_id).await?;
    let historique = state.load_events(lot_id).await?;

    Ok(Json(LotDetailResponse { info, historique }))
}

#[utoipa::path(
    put,
    path = "/api/lots/{lot_id}",
    tag = "lot",
    params(
        ("lot_id" = i32, Path, description = "Lot ID")
    ),
    request_body = UpdateLotRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Lot updated successfully", body = LotResponse),
        (status = 400, description = "Invalid request or unknown bassin"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Lot not found"),
        (status = 409, description = "Lot name already exists")
    )
)]
pub async fn update_lot(
    Extension(user): Extension<User>,
    State(state): State<LotState>,
    Path(lot_id): Path<i32>,
    Json(body): Json<UpdateLotRequest>,
) -> Result<Json<LotResponse>, ApiError> {
    require_permission(user.role(), Permission::MANAGE_LOTS)?;

    state
        .lot_repository
        .find_by_id(lot_id)
        .await?
        .ok_or(LotError::LotNotFound)?;

    let mut changes = LotChanges::default();

    if let Some(nom) = &body.nom {
        let nom = nom.trim();
        if nom.is_empty() {
            return Err(LotError::InvalidRequest.into());
        }
        if let Some(other) = state.lot_repository.find_by_name(nom).await? {
            if other.id != lot_id {
                return Err(LotError::LotNameExists.into());
            }
        }
        changes.nom = Some(nom.to_string());
    }

    if let Some(espece) = &body.espece {
        if espece.trim().is_empty() {
            return Err(LotError::InvalidRequest.into());
        }
        changes.espece = Some(espece.trim().to_string());
    }

    if let Some(quantite) = body.quantite {
        if quantite < 0 {
            return Err(LotError::InvalidRequest.into());
        }
        changes.quantite = Some(quantite);
    }

    if let Some(bassin_id) = body.bassin_id {
        state.ensure_bassin(bassin_id).await?;
    }

    changes.statut = body.statut.map(|statut| statut.to_string());
    changes.stade = body.stade;
    changes.poids_moyen = body.poids_moyen;
    changes.taille_moyenne = body.taille_moyenne;

    let mut tx = state.lot_repository.get_pool().begin().await?;

    let current = state
        .lot_repository
        .lock_by_id(lot_id, &mut tx)
        .await?
        .ok_or(LotError::LotNotFound)?;

    state
        .lot_repository
        .update(lot_id, &changes, &mut tx)
        .await
        .map_err(ApiError::unique_as(LotError::LotNameExists))?;

    if let Some(destination) = body
        .bassin_id
        .filter(|bassin_id| current.bassin_id != Some(*bassin_id))
    {
        state
            .record_transfer(lot_id, current.bassin_id, destination, None, &mut tx)
            .await?;
    }

    tx.commit().await?;

    let response = state.load_response(lot_id).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/lots/{lot_id}/transfert",
    tag = "lot",
    params(
        ("lot_id" = i32, Path, description = "Lot ID")
    ),
    request_body = TransfertLotRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Lot moved and transfer recorded", body = LotDetailResponse),
        (status = 400, description = "Unknown or identical bassin"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Lot not found")
    )
)]
pub async fn transfer_lot(
    Extension(user): Extension<User>,
    State(state): State<LotState>,
    Path(lot_id): Path<i32>,
    Json(body): Json<TransfertLotRequest>,
) -> Result<Json<LotDetailResponse>, ApiError> {
    require_permission(user.role(), Permission::MANAGE_LOTS)?;

    state
        .lot_repository
        .find_by_id(lot_id)
        .await?
        .ok_or(LotError::LotNotFound)?;

    state.ensure_bassin(body.bassin_id).await?;

    let mut tx = state.lot_repository.get_pool().begin().await?;

    let lot = state
        .lot_repository
        .lock_by_id(lot_id, &mut tx)
        .await?
        .ok_or(LotError::LotNotFound)?;

    if lot.bassin_id == Some(body.bassin_id) {
        return Err(LotError::SameBassin.into());
    }

    state
        .record_transfer(lot_id, lot.bassin_id, body.bassin_id, body.description, &mut tx)
        .await?;

    tx.commit().await?;

    let info = state.load_response(lot_id).await?;
    let historique = state.load_events(lot_id).await?;

    Ok(Json(LotDetailResponse { info, historique }))
}

#[utoipa::path(
    post,
    path = "/api/lots/{lot_id}/qrcode",
    tag = "lot",
    params(
        ("lot_id" = i32, Path, description = "Lot ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Label payload of the lot", body = QrCodeResponse),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Lot not found")
    )
)]
pub async fn generate_qr_code(
    Extension(user): Extension<User>,
    State(state): State<LotState>,
    Path(lot_id): Path<i32>,
) -> Result<Json<QrCodeResponse>, ApiError> {
    require_permission(user.role(), Permission::MANAGE_LOTS)?;

    let lot = state
        .lot_repository
        .find_by_id(lot_id)
        .await?
        .ok_or(LotError::LotNotFound)?;

    let date_creation = lot
        .date_creation
        .format(&Rfc3339)
        .map_err(|e| anyhow::anyhow!("Failed to format creation date: {}", e))?;

    let contenu = json!({
        "lot_id": lot.id,
        "nom": lot.nom,
        "espece": lot.espece,
        "bassin_id": lot.bassin_id,
        "date_creation": date_creation,
    })
    .to_string();

    let mut tx = state.lot_repository.get_pool().begin().await?;

    state.lot_repository.mark_qr_code(lot_id, &mut tx).await?;

    tx.commit().await?;

    Ok(Json(QrCodeResponse { lot_id, contenu }))
}

#[utoipa::path(
    get,
    path = "/api/lots/{lot_id}/historique",
    tag = "lot",
    params(
        ("lot_id" = i32, Path, description = "Lot ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Event log and statistics of the hosting bassin", body = LotHistoriqueResponse),
        (status = 404, description = "Lot not found")
    )
)]
pub async fn get_lot_historique(
    Extension(user): Extension<User>,
    State(state): State<LotState>,
    Path(lot_id): Path<i32>,
) -> Result<Json<LotHistoriqueResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let lot = state.load_response(lot_id).await?;
    let historique = state.load_events(lot_id).await?;

    let statistiques = match lot.bassin_id {
        Some(bassin_id) => {
            let end = OffsetDateTime::now_utc();
            let mesures = state
                .mesure_repository
                .find_by_bassin_in_range(bassin_id, end - state.window, end, None)
                .await?;

            Some(compute_statistics(&mesures))
        }
        None => None,
    };

    Ok(Json(LotHistoriqueResponse {
        lot,
        historique,
        statistiques,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/lots/{lot_id}",
    tag = "lot",
    params(
        ("lot_id" = i32, Path, description = "Lot ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Lot deleted successfully"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Lot not found"),
        (status = 409, description = "Lot is still referenced by sales")
    )
)]
pub async fn delete_lot(
    Extension(user): Extension<User>,
    State(state): State<LotState>,
    Path(lot_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    require_permission(user.role(), Permission::MANAGE_LOTS)?;

    state
        .lot_repository
        .find_by_id(lot_id)
        .await?
        .ok_or(LotError::LotNotFound)?;

    if state.lot_repository.has_ventes(lot_id).await? {
        return Err(LotError::LotInUse.into());
    }

    let mut tx = state.lot_repository.get_pool().begin().await?;

    state.lot_repository.delete(lot_id, &mut tx).await?;

    tx.commit().await?;

    tracing::info!("lot {} deleted by user {}", lot_id, user.id);

    Ok(StatusCode::NO_CONTENT)
}
