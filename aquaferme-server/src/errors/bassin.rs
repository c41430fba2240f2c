use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum BassinError {
    #[error("Bassin not found")]
    BassinNotFound,

    #[error("Bassin name already exists")]
    BassinNameExists,

    #[error("Invalid request parameters")]
    InvalidRequest,

    #[error("Bassin still holds lots")]
    BassinNotEmpty,

    #[error("Invalid farm thresholds")]
    InvalidSeuils,

    #[error("Invalid time range")]
    InvalidTimeRange,
}

impl BassinError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BassinError::BassinNotFound => StatusCode::NOT_FOUND,
            BassinError::BassinNameExists => StatusCode::CONFLICT,
            BassinError::InvalidRequest => StatusCode::BAD_REQUEST,
            BassinError::BassinNotEmpty => StatusCode::CONFLICT,
            BassinError::InvalidSeuils => StatusCode::BAD_REQUEST,
            BassinError::InvalidTimeRange => StatusCode::BAD_REQUEST,
        }
    }
}
