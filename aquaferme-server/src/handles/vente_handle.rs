use std::sync::Arc;

use aquaferme_api::models::*;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use time::OffsetDateTime;

use crate::errors::{ApiError, VenteError};
use crate::middlewares::{TokenState, auth};
use crate::models::{User, Vente};
use crate::repositories::{ClientRepository, LotRepository, VenteRepository};
use crate::services::{
    Permission, StockHold, StockService, is_restricted_to_own, plan_adjustments,
    require_permission,
};

#[derive(Clone)]
pub struct VenteState {
    pub vente_repository: Arc<VenteRepository>,
    pub lot_repository: Arc<LotRepository>,
    pub client_repository: Arc<ClientRepository>,
    pub stock_service: Arc<StockService>,
}

pub fn vente_router(vente_state: VenteState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/ventes", get(get_ventes).post(create_vente))
        .route(
            "/api/ventes/:vente_id",
            get(get_vente_by_id).put(update_vente).delete(delete_vente),
        )
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(vente_state)
}

fn hold_of(vente: &Vente) -> StockHold {
    StockHold::of(
        vente.lot_id,
        vente.quantite,
        VenteStatut::from(vente.statut.clone()),
    )
}

fn validate_amounts(quantite: i32, prix_unitaire: f64) -> Result<(), VenteError> {
    if quantite <= 0 || !prix_unitaire.is_finite() || prix_unitaire < 0.0 {
        return Err(VenteError::InvalidRequest);
    }
    Ok(())
}

impl VenteState {
    async fn load_owned(&self, user: &User, vente_id: i32) -> Result<Vente, ApiError> {
        let vente = self
            .vente_repository
            .find_by_id(vente_id)
            .await?
            .ok_or(VenteError::VenteNotFound)?;

        if is_restricted_to_own(user.role()) && vente.vendeur_id != user.id {
            return Err(VenteError::InsufficientPermission.into());
        }

        Ok(vente)
    }

    async fn ensure_lot(&self, lot_id: i32) -> Result<(), ApiError> {
        self.lot_repository
            .find_by_id(lot_id)
            .await?
            .ok_or(VenteError::LotNotFound)?;

        Ok(())
    }

    /// Distributors may only sell to their own clients.
    async fn ensure_client(&self, user: &User, client_id: i32) -> Result<(), ApiError> {
        let client = self
            .client_repository
            .find_by_id(client_id)
            .await?
            .ok_or(VenteError::ClientNotFound)?;

        if is_restricted_to_own(user.role()) && client.distributeur_id != Some(user.id) {
            return Err(VenteError::InsufficientPermission.into());
        }

        Ok(())
    }

    async fn load_response(&self, vente_id: i32) -> Result<VenteResponse, ApiError> {
        let row = self
            .vente_repository
            .find_row_by_id(vente_id)
            .await?
            .ok_or(VenteError::VenteNotFound)?;

        Ok(row.into())
    }
}

#[utoipa::path(
    get,
    path = "/api/ventes",
    tag = "vente",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Sales visible to the caller", body = Vec<VenteResponse>),
        (status = 403, description = "Insufficient permission")
    )
)]
pub async fn get_ventes(
    Extension(user): Extension<User>,
    State(state): State<VenteState>,
) -> Result<Json<Vec<VenteResponse>>, ApiError> {
    require_permission(user.role(), Permission::VIEW_SALES)?;

    let rows = if is_restricted_to_own(user.role()) {
        state.vente_repository.find_by_vendeur_id(user.id).await?
    } else {
        state.vente_repository.find_all().await?
    };

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/ventes",
    tag = "vente",
    request_body = CreateVenteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Sale recorded and stock taken from the lot", body = VenteResponse),
        (status = 400, description = "Invalid request, unknown client or insufficient stock"),
        (status = 403, description = "Insufficient permission or foreign client"),
        (status = 404, description = "Lot not found")
    )
)]
pub async fn create_vente(
    Extension(user): Extension<User>,
    State(state): State<VenteState>,
    Json(body): Json<CreateVenteRequest>,
) -> Result<(StatusCode, Json<VenteResponse>), ApiError> {
    require_permission(user.role(), Permission::MANAGE_SALES)?;

    validate_amounts(body.quantite, body.prix_unitaire)?;

    let client_nom = body
        .client_nom
        .map(|nom| nom.trim().to_string())
        .filter(|nom| !nom.is_empty());

    match body.client_id {
        Some(client_id) => state.ensure_client(&user, client_id).await?,
        None if client_nom.is_none() => return Err(VenteError::InvalidRequest.into()),
        None => {}
    }

    state.ensure_lot(body.lot_id).await?;

    let mut vente = Vente {
        id: 0,
        lot_id: body.lot_id,
        quantite: body.quantite,
        prix_unitaire: body.prix_unitaire,
        prix_total: body.prix_unitaire * f64::from(body.quantite),
        client_id: body.client_id,
        client_nom,
        statut: body.statut.unwrap_or_default().to_string(),
        date_vente: body.date_vente.unwrap_or_else(OffsetDateTime::now_utc),
        vendeur_id: user.id,
    };

    let adjustments = plan_adjustments(None, Some(hold_of(&vente)));

    let mut tx = state.vente_repository.get_pool().begin().await?;

    state.stock_service.apply(&adjustments, &mut tx).await?;

    vente.id = state.vente_repository.create(&vente, &mut tx).await?;

    tx.commit().await?;

    tracing::info!(
        "sale {} of {} fish from lot {} by user {}",
        vente.id,
        vente.quantite,
        vente.lot_id,
        user.id
    );

    let response = state.load_response(vente.id).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/ventes/{vente_id}",
    tag = "vente",
    params(
        ("vente_id" = i32, Path, description = "Sale ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Successfully retrieved sale", body = VenteResponse),
        (status = 403, description = "Sale recorded by another distributor"),
        (status = 404, description = "Sale not found")
    )
)]
pub async fn get_vente_by_id(
    Extension(user): Extension<User>,
    State(state): State<VenteState>,
    Path(vente_id): Path<i32>,
) -> Result<Json<VenteResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_SALES)?;

    state.load_owned(&user, vente_id).await?;

    let response = state.load_response(vente_id).await?;

    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/api/ventes/{vente_id}",
    tag = "vente",
    params(
        ("vente_id" = i32, Path, description = "Sale ID")
    ),
    request_body = UpdateVenteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Sale updated and stock reconciled", body = VenteResponse),
        (status = 400, description = "Invalid request, unknown client or insufficient stock"),
        (status = 403, description = "Sale recorded by another distributor"),
        (status = 404, description = "Sale or lot not found")
    )
)]
pub async fn update_vente(
    Extension(user): Extension<User>,
    State(state): State<VenteState>,
    Path(vente_id): Path<i32>,
    Json(body): Json<UpdateVenteRequest>,
) -> Result<Json<VenteResponse>, ApiError> {
    require_permission(user.role(), Permission::MANAGE_SALES)?;

    let before = state.load_owned(&user, vente_id).await?;

    if let Some(lot_id) = body.lot_id {
        if lot_id != before.lot_id {
            state.ensure_lot(lot_id).await?;
        }
    }

    if let Some(client_id) = body.client_id {
        if Some(client_id) != before.client_id {
            state.ensure_client(&user, client_id).await?;
        }
    }

    let mut tx = state.vente_repository.get_pool().begin().await?;

    let current = state
        .vente_repository
        .lock_by_id(vente_id, &mut tx)
        .await?
        .ok_or(VenteError::VenteNotFound)?;

    let vente = apply_changes(&current, &body)?;

    let adjustments = plan_adjustments(Some(hold_of(&current)), Some(hold_of(&vente)));

    state.stock_service.apply(&adjustments, &mut tx).await?;

    if !state
        .vente_repository
        .update(vente_id, &vente, &mut tx)
        .await?
    {
        return Err(VenteError::VenteNotFound.into());
    }

    tx.commit().await?;

    let response = state.load_response(vente_id).await?;

    Ok(Json(response))
}

/// Sale as it becomes once `body` is applied on top of `current`.
fn apply_changes(current: &Vente, body: &UpdateVenteRequest) -> Result<Vente, VenteError> {
    let mut vente = current.clone();

    vente.lot_id = body.lot_id.unwrap_or(vente.lot_id);
    vente.client_id = body.client_id.or(vente.client_id);

    if let Some(client_nom) = &body.client_nom {
        let client_nom = client_nom.trim();
        vente.client_nom = (!client_nom.is_empty()).then(|| client_nom.to_string());
    }

    if vente.client_id.is_none() && vente.client_nom.is_none() {
        return Err(VenteError::InvalidRequest);
    }

    vente.quantite = body.quantite.unwrap_or(vente.quantite);
    vente.prix_unitaire = body.prix_unitaire.unwrap_or(vente.prix_unitaire);
    validate_amounts(vente.quantite, vente.prix_unitaire)?;
    vente.prix_total = vente.prix_unitaire * f64::from(vente.quantite);

    if let Some(statut) = body.statut {
        vente.statut = statut.to_string();
    }

    vente.date_vente = body.date_vente.unwrap_or(vente.date_vente);

    Ok(vente)
}

#[utoipa::path(
    delete,
    path = "/api/ventes/{vente_id}",
    tag = "vente",
    params(
        ("vente_id" = i32, Path, description = "Sale ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Sale deleted and its stock restored"),
        (status = 403, description = "Sale recorded by another distributor"),
        (status = 404, description = "Sale not found")
    )
)]
pub async fn delete_vente(
    Extension(user): Extension<User>,
    State(state): State<VenteState>,
    Path(vente_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    require_permission(user.role(), Permission::MANAGE_SALES)?;

    state.load_owned(&user, vente_id).await?;

    let mut tx = state.vente_repository.get_pool().begin().await?;

    let vente = state
        .vente_repository
        .delete(vente_id, &mut tx)
        .await?
        .ok_or(VenteError::VenteNotFound)?;

    let adjustments = plan_adjustments(Some(hold_of(&vente)), None);

    state.stock_service.apply(&adjustments, &mut tx).await?;

    tx.commit().await?;

    tracing::info!("sale {} deleted, {} fish back in lot {}", vente_id, vente.quantite, vente.lot_id);

    Ok(StatusCode::NO_CONTENT)
}
