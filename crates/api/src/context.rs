use gatehouse_auth::{Capability, Identity};
use gatehouse_core::{RequestId, SubjectId};

/// Per-request correlation context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: RequestId,
}

impl RequestContext {
    pub fn new(request_id: RequestId) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }
}

/// Authenticated caller for a request.
///
/// Only present on protected routes; public routes never see one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext<C: Capability> {
    identity: Identity<C>,
}

impl<C: Capability> CallerContext<C> {
    pub fn new(identity: Identity<C>) -> Self {
        Self { identity }
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.identity.subject_id
    }

    pub fn identity(&self) -> &Identity<C> {
        &self.identity
    }
}
