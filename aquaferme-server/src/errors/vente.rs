use axum::http::StatusCode;

use aquaferme_api::models::Id;

#[derive(Debug, thiserror::Error)]
pub enum VenteError {
    #[error("Sale not found")]
    VenteNotFound,

    #[error("Lot not found")]
    LotNotFound,

    #[error("Client not found")]
    ClientNotFound,

    #[error("Insufficient stock in lot {lot_id}: {available} available, {requested} requested")]
    InsufficientStock {
        lot_id: Id,
        available: i32,
        requested: i32,
    },

    #[error("Invalid request parameters")]
    InvalidRequest,

    #[error("Insufficient permission")]
    InsufficientPermission,
}

impl VenteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VenteError::VenteNotFound => StatusCode::NOT_FOUND,
            VenteError::LotNotFound => StatusCode::NOT_FOUND,
            VenteError::ClientNotFound => StatusCode::BAD_REQUEST,
            VenteError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            VenteError::InvalidRequest => StatusCode::BAD_REQUEST,
            VenteError::InsufficientPermission => StatusCode::FORBIDDEN,
        }
    }
}
