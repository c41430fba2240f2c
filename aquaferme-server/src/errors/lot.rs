use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum LotError {
    #[error("Lot not found")]
    LotNotFound,

    #[error("Lot name already exists")]
    LotNameExists,

    #[error("Invalid request parameters")]
    InvalidRequest,

    #[error("Target bassin does not exist")]
    UnknownBassin,

    #[error("Lot is already in this bassin")]
    SameBassin,

    #[error("Lot is not assigned to a bassin")]
    NoBassin,

    #[error("Lot is still referenced by sales")]
    LotInUse,
}

impl LotError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LotError::LotNotFound => StatusCode::NOT_FOUND,
            LotError::LotNameExists => StatusCode::CONFLICT,
            LotError::InvalidRequest => StatusCode::BAD_REQUEST,
            LotError::UnknownBassin => StatusCode::BAD_REQUEST,
            LotError::SameBassin => StatusCode::BAD_REQUEST,
            LotError::NoBassin => StatusCode::BAD_REQUEST,
            LotError::LotInUse => StatusCode::CONFLICT,
        }
    }
}
