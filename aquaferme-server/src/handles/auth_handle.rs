use std::sync::Arc;

use anyhow::anyhow;
use aquaferme_api::models::*;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use time::OffsetDateTime;

use crate::errors::{ApiError, AuthError};
use crate::middlewares::{TokenState, auth};
use crate::models::User;
use crate::repositories::UserRepository;
use crate::services::{AuthService, TokenService};

#[derive(Clone)]
pub struct AuthState {
    pub auth_service: Arc<AuthService>,
    pub token_service: Arc<TokenService>,
    pub user_repository: Arc<UserRepository>,
}

pub fn auth_router(auth_state: AuthState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route(
            "/api/auth/refresh",
            post(refresh_token)
                .route_layer(middleware::from_fn_with_state(token_state.clone(), auth)),
        )
        .route(
            "/api/auth/me",
            get(get_current_user)
                .route_layer(middleware::from_fn_with_state(token_state.clone(), auth)),
        )
        .with_state(auth_state)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration successful, return user token", body = String),
        (status = 400, description = "Missing name, email or password"),
        (status = 409, description = "Email already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register(
    State(state): State<AuthState>,
    Json(body): Json<RegisterRequest>,
) -> Result<String, ApiError> {
    if body.nom.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AuthError::InvalidRequest.into());
    }

    if state.user_repository.find_by_email(&body.email).await?.is_some() {
        return Err(AuthError::EmailExists.into());
    }

    let hash_password = state
        .auth_service
        .hash(&body.password)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;

    let user = User {
        id: 0,
        nom: body.nom.trim().to_string(),
        email: body.email.trim().to_string(),
        password: hash_password,
        role: UserRole::Observateur.to_string(),
        actif: true,
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = state.user_repository.get_pool().begin().await?;

    let id = state
        .user_repository
        .create(&user, &mut tx)
        .await
        .map_err(ApiError::unique_as(AuthError::EmailExists))?;

    tx.commit().await?;

    tracing::info!("registered user {} ({})", id, user.email);

    let token = state
        .token_service
        .generate_token(&User { id, ..user })
        .map_err(|e| anyhow!("Failed to generate token: {}", e))?
        .token;

    Ok(token)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, return user token", body = String),
        (status = 401, description = "Invalid password"),
        (status = 403, description = "Account is disabled"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    Json(body): Json<LoginRequest>,
) -> Result<String, ApiError> {
    let user = state
        .user_repository
        .find_by_email(&body.email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let result = state
        .auth_service
        .verify(&user, &body.password)
        .map_err(|e| anyhow!("Failed to verify password: {}", e))?;

    if !result {
        tracing::warn!("failed login for {}", body.email);
        return Err(AuthError::InvalidPassword.into());
    }

    if !user.actif {
        return Err(AuthError::AccountDisabled.into());
    }

    let token = state
        .token_service
        .generate_token(&user)
        .map_err(|e| anyhow!("Failed to generate token: {}", e))?
        .token;

    Ok(token)
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Refresh token successful", body = String),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn refresh_token(
    Extension(user): Extension<User>,
    State(state): State<AuthState>,
) -> Result<String, ApiError> {
    let token = state
        .token_service
        .generate_token(&user)
        .map_err(|e| anyhow!("Failed to generate token: {}", e))?
        .token;

    Ok(token)
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Get current user information successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account is disabled")
    )
)]
pub async fn get_current_user(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(user.into())
}
