pub mod alerte;
pub mod api;
pub mod auth;
pub mod bassin;
pub mod client;
pub mod iot;
pub mod lot;
pub mod vente;

pub use alerte::AlerteError;
pub use api::ApiError;
pub use auth::AuthError;
pub use bassin::BassinError;
pub use client::ClientError;
pub use iot::IotError;
pub use lot::LotError;
pub use vente::VenteError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use uuid::Uuid;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details: Option<Value> = None;

        let (status, error_message, log_message) = match self {
            ApiError::AuthError(e) => (e.status_code(), e.to_string(), None),
            ApiError::BassinError(e) => (e.status_code(), e.to_string(), None),
            ApiError::LotError(e) => (e.status_code(), e.to_string(), None),
            ApiError::VenteError(e) => {
                if let VenteError::InsufficientStock {
                    lot_id,
                    available,
                    requested,
                } = &e
                {
                    details = Some(json!({
                        "lot_id": lot_id,
                        "available": available,
                        "requested": requested,
                    }));
                }
                (e.status_code(), e.to_string(), None)
            }
            ApiError::ClientError(e) => (e.status_code(), e.to_string(), None),
            ApiError::IotError(e) => (e.status_code(), e.to_string(), None),
            ApiError::AlerteError(e) => (e.status_code(), e.to_string(), None),
            ApiError::DatabaseError(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tracing::warn!("Unique constraint violated: {}", e);
                (StatusCode::CONFLICT, "Resource already exists".to_string(), None)
            }
            ApiError::DatabaseError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
            ApiError::InternalError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        if let Some(error_id) = log_message {
            error_obj["error_id"] = json!(error_id);
        }

        if let Some(details) = details {
            error_obj["details"] = details;
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_domain_error_keeps_status() {
        let response = ApiError::from(LotError::LotInUse).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_of(response).await;
        assert_eq!(body["error"]["code"], 409);
        assert!(body["error"].get("error_id").is_none());
    }

    #[tokio::test]
    async fn test_insufficient_stock_carries_quantities() {
        let response = ApiError::from(VenteError::InsufficientStock {
            lot_id: 4,
            available: 10,
            requested: 25,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_of(response).await;
        assert_eq!(body["error"]["details"]["available"], 10);
        assert_eq!(body["error"]["details"]["requested"], 25);
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        let storage = crate::tests::setup_test_db().await;
        let pool = storage.get_pool();

        crate::tests::create_test_bassin(storage.clone(), "Nord", 100).await;
        let duplicate = sqlx::query(
            "INSERT INTO bassins (nom, capacite, created_at) VALUES ('Nord', 100, CURRENT_TIMESTAMP)",
        )
        .execute(pool)
        .await
        .unwrap_err();

        let error = ApiError::unique_as(BassinError::BassinNameExists)(duplicate);
        assert!(matches!(
            error,
            ApiError::BassinError(BassinError::BassinNameExists)
        ));

        let other = ApiError::unique_as(BassinError::BassinNameExists)(sqlx::Error::RowNotFound);
        assert!(matches!(other, ApiError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_unmapped_unique_violation_is_conflict() {
        let storage = crate::tests::setup_test_db().await;
        let pool = storage.get_pool();

        crate::tests::create_test_bassin(storage.clone(), "Sud", 100).await;
        let duplicate = sqlx::query(
            "INSERT INTO bassins (nom, capacite, created_at) VALUES ('Sud', 100, CURRENT_TIMESTAMP)",
        )
        .execute(pool)
        .await
        .unwrap_err();

        let response = ApiError::from(duplicate).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_internal_error_is_masked() {
        let response = ApiError::from(anyhow::anyhow!("disk on fire")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body["error"]["message"], "Internal server error");
        assert!(body["error"]["error_id"].is_string());
    }
}
