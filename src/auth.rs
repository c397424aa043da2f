//! Actor identity and authorization checks.
//!
//! Session/RBAC middleware proper is an external collaborator; what the
//! service layer enforces here are the authorization decisions themselves:
//! owner-or-admin on auction mutations and admin-only on ledger operations.

use crate::error::{AppError, AppResult};
use uuid::Uuid;

/// Role carried by an authenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Seller,
    Admin,
}

impl Role {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "seller" => Some(Role::Seller),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

/// The authenticated principal behind a request
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admin-only gate
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin role required".into()))
        }
    }

    /// Owner-or-admin gate for resource mutations
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> AppResult<()> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("not the resource owner".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("SELLER"), Some(Role::Seller));
        assert_eq!(Role::from_str("root"), None);
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = Uuid::new_v4();
        let actor = Actor::new(owner, Role::Seller);
        assert!(actor.require_owner_or_admin(owner).is_ok());
        assert!(actor.require_owner_or_admin(Uuid::new_v4()).is_err());

        let admin = Actor::new(Uuid::new_v4(), Role::Admin);
        assert!(admin.require_owner_or_admin(owner).is_ok());
        assert!(admin.require_admin().is_ok());
    }
}
