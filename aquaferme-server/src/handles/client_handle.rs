use std::sync::Arc;

use aquaferme_api::models::*;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use time::OffsetDateTime;

use crate::errors::{ApiError, ClientError};
use crate::middlewares::{TokenState, auth};
use crate::models::{Client, User};
use crate::repositories::{ClientRepository, UserRepository};
use crate::services::{Permission, is_restricted_to_own, require_permission};

#[derive(Clone)]
pub struct ClientState {
    pub client_repository: Arc<ClientRepository>,
    pub user_repository: Arc<UserRepository>,
}

pub fn client_router(client_state: ClientState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/clients", get(get_clients).post(create_client))
        .route(
            "/api/clients/:client_id",
            get(get_client_by_id).put(update_client).delete(delete_client),
        )
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(client_state)
}

impl ClientState {
    /// Loads a client the caller is allowed to see.
    async fn load_owned(&self, user: &User, client_id: i32) -> Result<Client, ApiError> {
        let client = self
            .client_repository
            .find_by_id(client_id)
            .await?
            .ok_or(ClientError::ClientNotFound)?;

        if is_restricted_to_own(user.role()) && client.distributeur_id != Some(user.id) {
            return Err(ClientError::InsufficientPermission.into());
        }

        Ok(client)
    }

    /// Only administrators choose the owner, and it must be a distributor account.
    async fn resolve_owner(
        &self,
        user: &User,
        requested: Option<i32>,
        current: Option<i32>,
    ) -> Result<Option<i32>, ApiError> {
        if is_restricted_to_own(user.role()) {
            return match requested {
                Some(id) if id != user.id => Err(ClientError::InsufficientPermission.into()),
                _ => Ok(Some(user.id)),
            };
        }

        let Some(distributeur_id) = requested else {
            return Ok(current);
        };

        let owner = self
            .user_repository
            .find_by_id(distributeur_id)
            .await?
            .ok_or(ClientError::UnknownDistributeur)?;

        if owner.role() != UserRole::Distributeur {
            return Err(ClientError::UnknownDistributeur.into());
        }

        Ok(Some(distributeur_id))
    }
}

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "client",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Clients visible to the caller", body = Vec<ClientResponse>),
        (status = 403, description = "Insufficient permission")
    )
)]
pub async fn get_clients(
    Extension(user): Extension<User>,
    State(state): State<ClientState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    require_permission(user.role(), Permission::VIEW_CLIENTS)?;

    let clients = if is_restricted_to_own(user.role()) {
        state.client_repository.find_by_distributeur_id(user.id).await?
    } else {
        state.client_repository.find_all().await?
    };

    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "client",
    request_body = CreateClientRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Client created successfully", body = ClientResponse),
        (status = 400, description = "Missing name or unknown distributor"),
        (status = 403, description = "Insufficient permission")
    )
)]
pub async fn create_client(
    Extension(user): Extension<User>,
    State(state): State<ClientState>,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    require_permission(user.role(), Permission::MANAGE_CLIENTS)?;

    let nom = body.nom.trim().to_string();
    if nom.is_empty() {
        return Err(ClientError::InvalidRequest.into());
    }

    let distributeur_id = state
        .resolve_owner(&user, body.distributeur_id, None)
        .await?;

    let mut client = Client {
        id: 0,
        nom,
        email: body.email,
        telephone: body.telephone,
        adresse: body.adresse,
        distributeur_id,
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = state.client_repository.get_pool().begin().await?;

    client.id = state.client_repository.create(&client, &mut tx).await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(client.into())))
}

#[utoipa::path(
    get,
    path = "/api/clients/{client_id}",
    tag = "client",
    params(
        ("client_id" = i32, Path, description = "Client ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Successfully retrieved client", body = ClientResponse),
        (status = 403, description = "Client belongs to another distributor"),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_client_by_id(
    Extension(user): Extension<User>,
    State(state): State<ClientState>,
    Path(client_id): Path<i32>,
) -> Result<Json<ClientResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_CLIENTS)?;

    let client = state.load_owned(&user, client_id).await?;

    Ok(Json(client.into()))
}

#[utoipa::path(
    put,
    path = "/api/clients/{client_id}",
    tag = "client",
    params(
        ("client_id" = i32, Path, description = "Client ID")
    ),
    request_body = UpdateClientRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Client updated successfully", body = ClientResponse),
        (status = 400, description = "Invalid request or unknown distributor"),
        (status = 403, description = "Client belongs to another distributor"),
        (status = 404, description = "Client not found")
    )
)]
pub async fn update_client(
    Extension(user): Extension<User>,
    State(state): State<ClientState>,
    Path(client_id): Path<i32>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    require_permission(user.role(), Permission::MANAGE_CLIENTS)?;

    let mut client = state.load_owned(&user, client_id).await?;

    if let Some(nom) = &body.nom {
        if nom.trim().is_empty() {
            return Err(ClientError::InvalidRequest.into());
        }
        client.nom = nom.trim().to_string();
    }

    client.distributeur_id = state
        .resolve_owner(&user, body.distributeur_id, client.distributeur_id)
        .await?;
    client.email = body.email.or(client.email);
    client.telephone = body.telephone.or(client.telephone);
    client.adresse = body.adresse.or(client.adresse);

    let mut tx = state.client_repository.get_pool().begin().await?;

    state
        .client_repository
        .update(client_id, &client, &mut tx)
        .await?;

    tx.commit().await?;

    Ok(Json(client.into()))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{client_id}",
    tag = "client",
    params(
        ("client_id" = i32, Path, description = "Client ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Client deleted successfully"),
        (status = 403, description = "Client belongs to another distributor"),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client is still referenced by sales")
    )
)]
pub async fn delete_client(
    Extension(user): Extension<User>,
    State(state): State<ClientState>,
    Path(client_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    require_permission(user.role(), Permission::MANAGE_CLIENTS)?;

    state.load_owned(&user, client_id).await?;

    if state.client_repository.has_ventes(client_id).await? {
        return Err(ClientError::ClientInUse.into());
    }

    let mut tx = state.client_repository.get_pool().begin().await?;

    state.client_repository.delete(client_id, &mut tx).await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
