//! Namespaced `<module>:<action>` permissions.

use core::str::FromStr;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use gatehouse_core::DomainError;

use crate::capability::{Capability, CapabilityModel, validate_label};

const SEPARATOR: char = ':';

/// Module-scoped permission token such as `users:list` or `orders:refund`.
///
/// Stored as the full token so comparisons and ordering are plain string
/// comparisons; `module()`/`action()` slice it on the separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModulePermission {
    token: Cow<'static, str>,
    split: usize,
}

impl ModulePermission {
    /// Build from validated parts.
    pub fn new(module: &str, action: &str) -> Result<Self, DomainError> {
        Self::parse(Cow::Owned(format!("{module}{SEPARATOR}{action}")))
    }

    fn parse(token: Cow<'static, str>) -> Result<Self, DomainError> {
        let mut parts = token.split(SEPARATOR);
        let (Some(module), Some(action), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(DomainError::validation(format!(
                "module permission: '{token}' must have the form <module>:<action>"
            )));
        };
        validate_label("module permission module", module)?;
        validate_label("module permission action", action)?;

        let split = module.len();
        Ok(Self { token, split })
    }

    pub fn module(&self) -> &str {
        &self.token[..self.split]
    }

    pub fn action(&self) -> &str {
        &self.token[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl Capability for ModulePermission {
    const MODEL: CapabilityModel = CapabilityModel::ModulePermission;

    fn as_str(&self) -> &str {
        &self.token
    }
}

impl core::fmt::Display for ModulePermission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.token)
    }
}

impl FromStr for ModulePermission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(Cow::Owned(s.to_string()))
    }
}

impl TryFrom<String> for ModulePermission {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(Cow::Owned(value))
    }
}

impl From<ModulePermission> for String {
    fn from(value: ModulePermission) -> Self {
        value.token.into_owned()
    }
}
