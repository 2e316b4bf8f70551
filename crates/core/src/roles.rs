//! Account roles and the capability set each one grants.
//!
//! The role is the single source of truth: `is_business` / `is_admin` are
//! derived from it on demand and never stored alongside it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_USER: &str = "user";
pub const ROLE_BUSINESS: &str = "business";
pub const ROLE_ADMIN: &str = "admin";

/// Account role. Stored as lowercase text in the `users.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Business,
    Admin,
}

/// What an account with a given role may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub is_business: bool,
    pub is_admin: bool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Business => ROLE_BUSINESS,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Derive the capability flags for this role.
    ///
    /// Admins are also business accounts; plain users are neither.
    pub fn capabilities(self) -> Capabilities {
        match self {
            Role::User => Capabilities {
                is_business: false,
                is_admin: false,
            },
            Role::Business => Capabilities {
                is_business: true,
                is_admin: false,
            },
            Role::Admin => Capabilities {
                is_business: true,
                is_admin: true,
            },
        }
    }

    pub fn is_business(self) -> bool {
        self.capabilities().is_business
    }

    pub fn is_admin(self) -> bool {
        self.capabilities().is_admin
    }

    /// Roles a visitor may pick for themselves at registration.
    pub fn is_self_assignable(self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            ROLE_USER => Ok(Role::User),
            ROLE_BUSINESS => Ok(Role::Business),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!(
                "Unknown role '{other}'. Expected one of: user, business, admin"
            ))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
