// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Account roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Mediates the marketplace: manages accounts, approves withdrawals
/// - `Buyer` - Posts paid tasks and spends coins
/// - `Worker` - Completes tasks and earns coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Posts tasks, spends coins
    Buyer,
    /// Completes tasks, earns coins
    Worker,
}

impl Default for Role {
    /// Default role is Worker (least privilege, and the fallback the
    /// public role-lookup endpoint reports for unknown emails).
    fn default() -> Self {
        Role::Worker
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Buyer => write!(f, "buyer"),
            Role::Worker => write!(f, "worker"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrips_lowercase() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&Role::Buyer).unwrap(), "\"buyer\"");
        assert!(serde_json::from_str::<Role>("\"unknown\"").is_err());
    }

    #[test]
    fn default_role_is_worker() {
        assert_eq!(Role::default(), Role::Worker);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Buyer.to_string(), "buyer");
        assert_eq!(Role::Worker.to_string(), "worker");
    }
}
