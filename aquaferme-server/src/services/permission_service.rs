use aquaferme_api::models::UserRole;

use crate::errors::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission(u32);

impl Permission {
    pub const NONE: Permission = Permission(0);

    // Farm operation (bits 0-7)
    pub const VIEW_FARM: Permission = Permission(1 << 0);
    pub const MANAGE_BASSINS: Permission = Permission(1 << 1);
    pub const MANAGE_LOTS: Permission = Permission(1 << 2);
    pub const RECORD_MESURES: Permission = Permission(1 << 3);
    pub const MANAGE_ALERTES: Permission = Permission(1 << 4);
    pub const MANAGE_DEVICES: Permission = Permission(1 << 5);

    // Commerce (bits 8-15)
    pub const VIEW_SALES: Permission = Permission(1 << 8);
    pub const MANAGE_SALES: Permission = Permission(1 << 9);
    pub const VIEW_CLIENTS: Permission = Permission(1 << 10);
    pub const MANAGE_CLIENTS: Permission = Permission(1 << 11);

    // Administration (bits 16-23)
    pub const MANAGE_USERS: Permission = Permission(1 << 16);
    pub const MANAGE_FARM: Permission = Permission(1 << 17);

    pub const OPERATEUR: Permission = Permission(
        Self::VIEW_FARM.0
            | Self::MANAGE_BASSINS.0
            | Self::MANAGE_LOTS.0
            | Self::RECORD_MESURES.0
            | Self::MANAGE_ALERTES.0
            | Self::MANAGE_DEVICES.0
            | Self::VIEW_SALES.0
            | Self::VIEW_CLIENTS.0,
    );
    pub const DISTRIBUTEUR: Permission = Permission(
        Self::VIEW_FARM.0
            | Self::VIEW_SALES.0
            | Self::MANAGE_SALES.0
            | Self::VIEW_CLIENTS.0
            | Self::MANAGE_CLIENTS.0,
    );
    pub const ADMIN: Permission = Permission(
        Self::OPERATEUR.0
            | Self::DISTRIBUTEUR.0
            | Self::MANAGE_USERS.0
            | Self::MANAGE_FARM.0,
    );

    pub fn has(&self, permission: Permission) -> bool {
        (self.0 & permission.0) == permission.0
    }

    pub fn union(&self, other: Permission) -> Permission {
        Permission(self.0 | other.0)
    }
}

pub fn permissions_for(role: UserRole) -> Permission {
    match role {
        UserRole::Admin => Permission::ADMIN,
        UserRole::Operateur => Permission::OPERATEUR,
        UserRole::Observateur => Permission::VIEW_FARM,
        UserRole::Distributeur => Permission::DISTRIBUTEUR,
    }
}

pub fn require_permission(role: UserRole, required: Permission) -> Result<(), AuthError> {
    if permissions_for(role).has(required) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermission)
    }
}

/// Distributors only reach the records they own.
pub fn is_restricted_to_own(role: UserRole) -> bool {
    role == UserRole::Distributeur
}
