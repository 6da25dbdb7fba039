use std::collections::BTreeSet;

use serde::Serialize;

use gatehouse_core::SubjectId;

use crate::capability::Capability;

/// A resolved caller for one request.
///
/// Built by the identity resolver from a credential record and dropped with the
/// request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct Identity<C: Capability> {
    pub subject_id: SubjectId,
    pub display_name: String,
    pub granted_capabilities: BTreeSet<C>,
}

impl<C: Capability> Identity<C> {
    pub fn new(
        subject_id: SubjectId,
        display_name: impl Into<String>,
        granted: impl IntoIterator<Item = C>,
    ) -> Self {
        Self {
            subject_id,
            display_name: display_name.into(),
            granted_capabilities: granted.into_iter().collect(),
        }
    }

    pub fn has(&self, capability: &C) -> bool {
        self.granted_capabilities.contains(capability)
    }
}
