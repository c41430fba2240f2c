use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already exists")]
    EmailExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Insufficient permission")]
    InsufficientPermission,

    #[error("Invalid request parameters")]
    InvalidRequest,

    #[error("An administrator cannot remove their own access")]
    SelfModification,

    #[error("User is still referenced by clients or sales")]
    UserInUse,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmailExists => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidPassword => StatusCode::UNAUTHORIZED,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled => StatusCode::FORBIDDEN,
            AuthError::InsufficientPermission => StatusCode::FORBIDDEN,
            AuthError::InvalidRequest => StatusCode::BAD_REQUEST,
            AuthError::SelfModification => StatusCode::BAD_REQUEST,
            AuthError::UserInUse => StatusCode::CONFLICT,
        }
    }
}
