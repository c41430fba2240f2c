use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, Header};
use serde::Deserialize;

use crate::errors::{ApiError, AuthError};
use crate::repositories::UserRepository;
use crate::services::TokenService;

#[derive(Clone)]
pub struct TokenState {
    pub token_service: Arc<TokenService>,
    pub user_repository: Arc<UserRepository>,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Bearer header first, then `?token=` for clients that cannot set headers.
fn extract_token(req: &Request<Body>) -> Option<String> {
    let mut headers = req.headers().get_all(header::AUTHORIZATION).iter();

    if let Ok(header) = Authorization::<Bearer>::decode(&mut headers) {
        return Some(header.token().to_string());
    }

    Query::<TokenQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

pub async fn auth(
    State(state): State<TokenState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_token(&req).ok_or(AuthError::MissingToken)?;

    let token_data = state
        .token_service
        .retrieve_token_claims(&token)
        .map_err(|_| AuthError::InvalidToken)?;

    let user = state
        .user_repository
        .find_by_id(token_data.claims.sub)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if !user.actif {
        tracing::warn!("rejected token of disabled account {}", user.id);
        return Err(AuthError::AccountDisabled.into());
    }

    req.extensions_mut().insert(token_data.claims);
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use aquaferme_api::models::UserRole;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Extension, Router, middleware};
    use tower::ServiceExt;

    use crate::configs::Auth;
    use crate::models::User;
    use crate::tests::*;

    use super::*;

    async fn whoami(Extension(user): Extension<User>) -> String {
        user.email
    }

    async fn setup() -> (Router, String, i32) {
        let storage = setup_test_db().await;
        let token_service = Arc::new(TokenService::new(Auth {
            secret: String::from("test"),
            expiration: 1000,
            admin: None,
        }));
        let user = create_test_user(storage.clone(), "op@ferme.test", "secret", &UserRole::Operateur)
            .await;
        let token = token_service.generate_token(&user).unwrap().token;

        let state = TokenState {
            token_service,
            user_repository: Arc::new(UserRepository::new(storage.clone())),
        };
        let router = Router::new()
            .route("/whoami", get(whoami))
            .route_layer(middleware::from_fn_with_state(state, auth));

        (router, token, user.id)
    }

    #[tokio::test]
    async fn test_header_and_query_tokens() {
        let (router, token, _) = setup().await;

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/whoami?token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"op@ferme.test");
    }

    #[tokio::test]
    async fn test_missing_and_invalid_tokens() {
        let (router, _, _) = setup().await;

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", "Bearer garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
