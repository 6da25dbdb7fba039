use core::str::FromStr;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use gatehouse_core::DomainError;

use crate::capability::{Capability, CapabilityModel, validate_label};

/// Action permission token (`read`, `create`, `update`, `delete`).
///
/// Permissions are opaque labels; a caller holds a subset and a route lists
/// every action it needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const READ: Permission = Permission(Cow::Borrowed("read"));
    pub const CREATE: Permission = Permission(Cow::Borrowed("create"));
    pub const UPDATE: Permission = Permission(Cow::Borrowed("update"));
    pub const DELETE: Permission = Permission(Cow::Borrowed("delete"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Capability for Permission {
    const MODEL: CapabilityModel = CapabilityModel::ActionPermission;

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_label("permission", s)?;
        Ok(Self(Cow::Owned(s.to_string())))
    }
}

impl TryFrom<String> for Permission {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_label("permission", &value)?;
        Ok(Self(Cow::Owned(value)))
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.0.into_owned()
    }
}
