use core::str::FromStr;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use gatehouse_core::DomainError;

use crate::capability::{Capability, CapabilityModel, validate_label};

/// Role token for the hierarchical role model.
///
/// Roles are coarse labels and a caller normally holds several. The
/// "hierarchy" lives in route requirements: a route lists every role that is
/// senior enough, and holding any one of them grants access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const READ: Role = Role(Cow::Borrowed("read"));
    pub const MANAGER: Role = Role(Cow::Borrowed("manager"));
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const SUPER_ADMIN: Role = Role(Cow::Borrowed("super_admin"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Capability for Role {
    const MODEL: CapabilityModel = CapabilityModel::HierarchicalRole;

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_label("role", s)?;
        Ok(Self(Cow::Owned(s.to_string())))
    }
}

impl TryFrom<String> for Role {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_label("role", &value)?;
        Ok(Self(Cow::Owned(value)))
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.0.into_owned()
    }
}
