use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AlerteError {
    #[error("Alert not found")]
    AlerteNotFound,

    #[error("Invalid request parameters")]
    InvalidRequest,
}

impl AlerteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AlerteError::AlerteNotFound => StatusCode::NOT_FOUND,
            AlerteError::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}
