use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Client not found")]
    ClientNotFound,

    #[error("Invalid request parameters")]
    InvalidRequest,

    #[error("Distributor does not exist")]
    UnknownDistributeur,

    #[error("Insufficient permission")]
    InsufficientPermission,

    #[error("Client is still referenced by sales")]
    ClientInUse,
}

impl ClientError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClientError::ClientNotFound => StatusCode::NOT_FOUND,
            ClientError::InvalidRequest => StatusCode::BAD_REQUEST,
            ClientError::UnknownDistributeur => StatusCode::BAD_REQUEST,
            ClientError::InsufficientPermission => StatusCode::FORBIDDEN,
            ClientError::ClientInUse => StatusCode::CONFLICT,
        }
    }
}
