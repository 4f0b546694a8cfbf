//! Security roles granted to users
//!
//! Roles are persisted by the graph store as a single comma-separated list of
//! authority names (e.g. `"ROLE_USER,ROLE_ADMIN"`); `roles_to_string` and
//! `roles_from_string` convert between that form and `SecurityRole` values.

use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Authority granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityRole {
    User,
    Admin,
}

/// Returned when an authority name is not a known role
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown security role: '{0}'. Valid roles: ROLE_USER, ROLE_ADMIN")]
pub struct UnknownRole(pub String);

impl SecurityRole {
    /// Authority name as used by the security layer
    pub fn authority(&self) -> &'static str {
        match self {
            SecurityRole::User => "ROLE_USER",
            SecurityRole::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for SecurityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.authority())
    }
}

impl FromStr for SecurityRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ROLE_USER" => Ok(SecurityRole::User),
            "ROLE_ADMIN" => Ok(SecurityRole::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Joins roles into the comma-separated authority list
pub fn roles_to_string(roles: &[SecurityRole]) -> String {
    roles
        .iter()
        .map(SecurityRole::authority)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a comma-separated authority list; blank entries are skipped
pub fn roles_from_string(s: &str) -> Result<Vec<SecurityRole>, UnknownRole> {
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(SecurityRole::from_str)
        .collect()
}

/// Serde adapter storing a role list as its comma-separated form
pub(crate) mod authorities {
    use super::*;

    pub fn serialize<S: Serializer>(roles: &[SecurityRole], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&roles_to_string(roles))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<SecurityRole>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        roles_from_string(&raw).map_err(serde::de::Error::custom)
    }
}
