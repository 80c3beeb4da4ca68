//! Well-known role names and the resolved caller identity.
//!
//! The role names must match the seed data in
//! `20260301000002_create_roles_and_users.sql`.

use std::fmt;

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_HR: &str = "hr";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_EMPLOYEE: &str = "employee";

/// A role the appraisal workflow recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Hr,
    Manager,
    Employee,
}

impl Role {
    /// Parse a role name. Any string outside the four known roles yields `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_HR => Some(Self::Hr),
            ROLE_MANAGER => Some(Self::Manager),
            ROLE_EMPLOYEE => Some(Self::Employee),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Hr => ROLE_HR,
            Self::Manager => ROLE_MANAGER,
            Self::Employee => ROLE_EMPLOYEE,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity on whose behalf an operation runs.
///
/// `role` is `None` when the identity provider supplied a role name this
/// service does not recognize; such callers fail every role-gated check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: DbId,
    pub role: Option<Role>,
}

impl Caller {
    pub fn new(user_id: DbId, role_name: &str) -> Self {
        Self {
            user_id,
            role: Role::parse(role_name),
        }
    }

    pub fn with_role(user_id: DbId, role: Role) -> Self {
        Self {
            user_id,
            role: Some(role),
        }
    }

    /// True when the caller holds any of the given roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.role.is_some_and(|r| roles.contains(&r))
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}
