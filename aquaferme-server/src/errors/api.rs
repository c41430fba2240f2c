use super::{AlerteError, AuthError, BassinError, ClientError, IotError, LotError, VenteError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Bassin error: {0}")]
    BassinError(#[from] BassinError),

    #[error("Lot error: {0}")]
    LotError(#[from] LotError),

    #[error("Sale error: {0}")]
    VenteError(#[from] VenteError),

    #[error("Client error: {0}")]
    ClientError(#[from] ClientError),

    #[error("IoT error: {0}")]
    IotError(#[from] IotError),

    #[error("Alert error: {0}")]
    AlerteError(#[from] AlerteError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl ApiError {
    /// Maps a unique constraint violation raised by a write to `conflict`.
    pub fn unique_as<E: Into<ApiError>>(conflict: E) -> impl FnOnce(sqlx::Error) -> ApiError {
        move |e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return conflict.into();
                }
            }
            ApiError::DatabaseError(e)
        }
    }
}
