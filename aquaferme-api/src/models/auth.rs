use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Id;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Operateur,
    #[default]
    Observateur,
    Distributeur,
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => UserRole::Admin,
            "operateur" => UserRole::Operateur,
            "distributeur" => UserRole::Distributeur,
            _ => UserRole::Observateur,
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Operateur => write!(f, "operateur"),
            UserRole::Observateur => write!(f, "observateur"),
            UserRole::Distributeur => write!(f, "distributeur"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub nom: String,
    pub email: String,
    pub password: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Id,
    pub nom: String,
    pub email: String,
    pub role: UserRole,
    pub actif: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_string_round_trip() {
        for role in [
            UserRole::Admin,
            UserRole::Operateur,
            UserRole::Observateur,
            UserRole::Distributeur,
        ] {
            assert_eq!(UserRole::from(role.to_string()), role);
        }
    }

    #[test]
    fn test_unknown_role_falls_back_to_observer() {
        assert_eq!(UserRole::from(String::from("root")), UserRole::Observateur);
    }
}
