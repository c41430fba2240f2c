use std::sync::Arc;

use anyhow::anyhow;
use aquaferme_api::models::*;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use time::OffsetDateTime;

use crate::errors::{ApiError, AuthError};
use crate::middlewares::{TokenState, auth};
use crate::models::User;
use crate::repositories::UserRepository;
use crate::services::{AuthService, Permission, require_permission};

#[derive(Clone)]
pub struct UserState {
    pub auth_service: Arc<AuthService>,
    pub user_repository: Arc<UserRepository>,
}

pub fn user_router(user_state: UserState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/utilisateurs", get(get_users).post(create_user))
        .route(
            "/api/utilisateurs/:user_id",
            get(get_user_by_id).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .with_state(user_state)
}

#[utoipa::path(
    get,
    path = "/api/utilisateurs",
    tag = "utilisateur",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Successfully retrieved users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient permission")
    )
)]
pub async fn get_users(
    Extension(current): Extension<User>,
    State(state): State<UserState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_permission(current.role(), Permission::MANAGE_USERS)?;

    let users = state.user_repository.find_all().await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/utilisateurs",
    tag = "utilisateur",
    request_body = CreateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid request parameters"),
        (status = 403, description = "Insufficient permission"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    Extension(current): Extension<User>,
    State(state): State<UserState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    require_permission(current.role(), Permission::MANAGE_USERS)?;

    if body.nom.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AuthError::InvalidRequest.into());
    }

    if state.user_repository.find_by_email(&body.email).await?.is_some() {
        return Err(AuthError::EmailExists.into());
    }

    let password = state
        .auth_service
        .hash(&body.password)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;

    let mut user = User {
        id: 0,
        nom: body.nom.trim().to_string(),
        email: body.email.trim().to_string(),
        password,
        role: body.role.to_string(),
        actif: body.actif.unwrap_or(true),
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = state.user_repository.get_pool().begin().await?;

    user.id = state
        .user_repository
        .create(&user, &mut tx)
        .await
        .map_err(ApiError::unique_as(AuthError::EmailExists))?;

    tx.commit().await?;

    tracing::info!("user {} created {} as {}", current.id, user.email, user.role);

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/utilisateurs/{user_id}",
    tag = "utilisateur",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Successfully retrieved user", body = UserResponse),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_by_id(
    Extension(current): Extension<User>,
    State(state): State<UserState>,
    Path(user_id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    require_permission(current.role(), Permission::MANAGE_USERS)?;

    let user = state
        .user_repository
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/utilisateurs/{user_id}",
    tag = "utilisateur",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Invalid request or self demotion"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update_user(
    Extension(current): Extension<User>,
    State(state): State<UserState>,
    Path(user_id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require_permission(current.role(), Permission::MANAGE_USERS)?;

    let mut user = state
        .user_repository
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if user_id == current.id
        && (body.actif == Some(false) || body.role.is_some_and(|role| role != UserRole::Admin))
    {
        return Err(AuthError::SelfModification.into());
    }

    if let Some(nom) = &body.nom {
        if nom.trim().is_empty() {
            return Err(AuthError::InvalidRequest.into());
        }
        user.nom = nom.trim().to_string();
    }

    if let Some(email) = &body.email {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::InvalidRequest.into());
        }
        if let Some(other) = state.user_repository.find_by_email(email).await? {
            if other.id != user_id {
                return Err(AuthError::EmailExists.into());
            }
        }
        user.email = email.to_string();
    }

    if let Some(password) = &body.password {
        if password.is_empty() {
            return Err(AuthError::InvalidRequest.into());
        }
        user.password = state
            .auth_service
            .hash(password)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    }

    if let Some(role) = body.role {
        user.role = role.to_string();
    }

    if let Some(actif) = body.actif {
        user.actif = actif;
    }

    let mut tx = state.user_repository.get_pool().begin().await?;

    state
        .user_repository
        .update(user_id, &user, &mut tx)
        .await
        .map_err(ApiError::unique_as(AuthError::EmailExists))?;

    tx.commit().await?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/api/utilisateurs/{user_id}",
    tag = "utilisateur",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 400, description = "Cannot delete own account"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User is still referenced")
    )
)]
pub async fn delete_user(
    Extension(current): Extension<User>,
    State(state): State<UserState>,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    require_permission(current.role(), Permission::MANAGE_USERS)?;

    if user_id == current.id {
        return Err(AuthError::SelfModification.into());
    }

    state
        .user_repository
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if state.user_repository.is_referenced(user_id).await? {
        return Err(AuthError::UserInUse.into());
    }

    let mut tx = state.user_repository.get_pool().begin().await?;

    state.user_repository.delete(user_id, &mut tx).await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
