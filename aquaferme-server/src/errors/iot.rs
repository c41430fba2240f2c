use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum IotError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("Device name already exists")]
    DeviceNameExists,

    #[error("Missing device key")]
    MissingDeviceKey,

    #[error("Unknown device key")]
    InvalidDeviceKey,

    #[error("Device is not assigned to a bassin")]
    DeviceUnassigned,

    #[error("Reading carries no value")]
    EmptyMesure,

    #[error("Invalid request parameters")]
    InvalidRequest,
}

impl IotError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IotError::DeviceNotFound => StatusCode::NOT_FOUND,
            IotError::DeviceNameExists => StatusCode::CONFLICT,
            IotError::MissingDeviceKey => StatusCode::UNAUTHORIZED,
            IotError::InvalidDeviceKey => StatusCode::UNAUTHORIZED,
            IotError::DeviceUnassigned => StatusCode::BAD_REQUEST,
            IotError::EmptyMesure => StatusCode::BAD_REQUEST,
            IotError::InvalidRequest => StatusCode::BAD_REQUEST,
        }
    }
}
