//! # Roles and Capabilities
//!
//! Permission checks applied at the command boundary.
//!
//! ```text
//! ┌────────────────────────┬─────────┬─────────┐
//! │ Capability             │  admin  │  user   │
//! ├────────────────────────┼─────────┼─────────┤
//! │ ManageVouchers         │   ✅    │   ✅    │
//! │ GenerateInvoices       │   ✅    │   ✅    │
//! │ ViewReports            │   ✅    │   ✅    │
//! │ ChangeOwnPassword      │   ✅    │   ✅    │
//! │ ManageRegistries       │   ✅    │   ❌    │
//! │ ManageTaxSettings      │   ✅    │   ❌    │
//! │ ManageUsers            │   ✅    │   ❌    │
//! └────────────────────────┴─────────┴─────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::{Role, User};

/// An action class a role may or may not perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    ManageVouchers,
    GenerateInvoices,
    ViewReports,
    ChangeOwnPassword,
    ManageRegistries,
    ManageTaxSettings,
    ManageUsers,
}

impl Capability {
    /// Short verb phrase used in permission errors.
    pub const fn action(&self) -> &'static str {
        match self {
            Capability::ManageVouchers => "manage vouchers",
            Capability::GenerateInvoices => "generate invoices",
            Capability::ViewReports => "view reports",
            Capability::ChangeOwnPassword => "change their password",
            Capability::ManageRegistries => "manage restaurants and airlines",
            Capability::ManageTaxSettings => "change tax settings",
            Capability::ManageUsers => "manage users",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

impl Role {
    /// Returns true if this role holds `capability`.
    pub const fn allows(&self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::User => matches!(
                capability,
                Capability::ManageVouchers
                    | Capability::GenerateInvoices
                    | Capability::ViewReports
                    | Capability::ChangeOwnPassword
            ),
        }
    }
}

/// The authenticated user of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn from_user(user: &User) -> Self {
        Session {
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
        }
    }

    /// Fails with [`CoreError::PermissionDenied`] unless the role holds
    /// `capability`.
    pub fn require(&self, capability: Capability) -> CoreResult<()> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                role: self.role.to_string(),
                action: capability.action().to_string(),
            })
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            user_id: "u1".to_string(),
            username: "clerk".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_allows_everything() {
        let admin = session(Role::Admin);
        for cap in [
            Capability::ManageVouchers,
            Capability::ManageRegistries,
            Capability::ManageTaxSettings,
            Capability::ManageUsers,
        ] {
            assert!(admin.require(cap).is_ok());
        }
    }

    #[test]
    fn test_user_capabilities() {
        let user = session(Role::User);
        assert!(user.require(Capability::ManageVouchers).is_ok());
        assert!(user.require(Capability::GenerateInvoices).is_ok());
        assert!(user.require(Capability::ViewReports).is_ok());
        assert!(user.require(Capability::ChangeOwnPassword).is_ok());

        let err = user.require(Capability::ManageUsers).unwrap_err();
        assert_eq!(err.to_string(), "user users are not allowed to manage users");
        assert!(user.require(Capability::ManageRegistries).is_err());
        assert!(user.require(Capability::ManageTaxSettings).is_err());
    }
}
