use serde::{Deserialize, Serialize};

use super::UserRole;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Display name
    pub nom: String,
    /// Login email, unique
    pub email: String,
    /// Clear text password, hashed before storage
    pub password: String,
    /// Assigned role
    pub role: UserRole,
    /// Whether the account may log in, defaults to true
    pub actif: Option<bool>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub nom: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub actif: Option<bool>,
}
