//! Capability models: vocabularies of grantable access and how they match.

use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use gatehouse_core::DomainError;

/// How a required capability set is compared against a granted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchRule {
    /// Every required capability must be granted.
    All,
    /// At least one required capability must be granted.
    Any,
}

impl core::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MatchRule::All => f.write_str("ALL"),
            MatchRule::Any => f.write_str("ANY"),
        }
    }
}

/// The authorization strategy used by one route tree.
///
/// A model fixes both the token vocabulary and the match rule. It is a
/// property of the sub-application, never of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityModel {
    /// Coarse role labels (`admin`, `manager`, ...); any one required role suffices.
    HierarchicalRole,
    /// Flat action labels (`read`, `create`, ...); all are required.
    ActionPermission,
    /// Namespaced `<module>:<action>` labels; all are required.
    ModulePermission,
}

impl CapabilityModel {
    pub fn match_rule(self) -> MatchRule {
        match self {
            CapabilityModel::HierarchicalRole => MatchRule::Any,
            CapabilityModel::ActionPermission | CapabilityModel::ModulePermission => MatchRule::All,
        }
    }

    /// Plural noun used in human-readable messages.
    pub fn noun(self) -> &'static str {
        match self {
            CapabilityModel::HierarchicalRole => "roles",
            CapabilityModel::ActionPermission => "permissions",
            CapabilityModel::ModulePermission => "module permissions",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityModel::HierarchicalRole => "hierarchical_role",
            CapabilityModel::ActionPermission => "action_permission",
            CapabilityModel::ModulePermission => "module_permission",
        }
    }
}

impl core::fmt::Display for CapabilityModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability token type belonging to exactly one [`CapabilityModel`].
///
/// Registries, stores and guard chains are generic over this trait, so one
/// route tree can only ever speak one vocabulary.
pub trait Capability:
    Debug
    + Display
    + Clone
    + Eq
    + Ord
    + Hash
    + Serialize
    + DeserializeOwned
    + FromStr<Err = DomainError>
    + Send
    + Sync
    + 'static
{
    const MODEL: CapabilityModel;

    fn as_str(&self) -> &str;
}

/// Shared validation for label-style tokens (`read`, `super_admin`).
pub(crate) fn validate_label(kind: &str, s: &str) -> Result<(), DomainError> {
    if s.is_empty() {
        return Err(DomainError::validation(format!("{kind}: empty token")));
    }
    if s.chars().any(|c| c.is_whitespace() || c == ',') {
        return Err(DomainError::validation(format!(
            "{kind}: '{s}' contains whitespace or ','"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_fix_their_match_rule() {
        assert_eq!(CapabilityModel::HierarchicalRole.match_rule(), MatchRule::Any);
        assert_eq!(CapabilityModel::ActionPermission.match_rule(), MatchRule::All);
        assert_eq!(CapabilityModel::ModulePermission.match_rule(), MatchRule::All);
    }

    #[test]
    fn labels_reject_separators() {
        assert!(validate_label("role", "admin").is_ok());
        assert!(validate_label("role", "").is_err());
        assert!(validate_label("role", "a b").is_err());
        assert!(validate_label("role", "a,b").is_err());
    }
}
