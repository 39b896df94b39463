//! Derived account lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::role::{Role, RoleSet};

/// Where an account sits in its lifecycle.
///
/// Not stored; computed from the `active` flag and the role set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    /// Registered, activation token not yet consumed.
    Pending,
    /// Activated and able to hold sessions.
    Active,
    /// Revoked. Terminal.
    Disabled,
}

impl AccountState {
    /// Derive the state from stored fields.
    pub fn derive(active: bool, roles: RoleSet) -> Self {
        if !active {
            Self::Disabled
        } else if roles.has(Role::ReadActivationToken) {
            Self::Pending
        } else {
            Self::Active
        }
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
