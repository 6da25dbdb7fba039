//! Guard chain: authentication, then authorization, before a handler runs.

use std::sync::Arc;

use thiserror::Error;

use crate::authenticate::{AuthnError, IdentityResolver};
use crate::authorize::{AuthzError, authorize};
use crate::capability::Capability;
use crate::credentials::TokenLookup;
use crate::identity::Identity;
use crate::registry::{RouteAccess, RouteKey, RouteRegistry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error(transparent)]
    Authentication(#[from] AuthnError),

    #[error(transparent)]
    Authorization(#[from] AuthzError),
}

impl GuardError {
    /// HTTP status this error maps to: 401 for authentication, 403 for authorization.
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::Authentication(_) => 401,
            GuardError::Authorization(_) => 403,
        }
    }

    /// Reason phrase matching [`Self::status_code`].
    pub fn reason(&self) -> &'static str {
        match self {
            GuardError::Authentication(_) => "Unauthorized",
            GuardError::Authorization(_) => "Forbidden",
        }
    }
}

/// Ordered, short-circuiting pipeline for one route tree.
///
/// A failed authentication returns before the requirement is evaluated, so an
/// unauthenticated caller learns nothing about what a route requires.
pub struct GuardChain<C: Capability> {
    registry: Arc<RouteRegistry<C>>,
    resolver: IdentityResolver<C>,
}

impl<C: Capability> Clone for GuardChain<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            resolver: self.resolver.clone(),
        }
    }
}

impl<C: Capability> GuardChain<C> {
    pub fn new(registry: Arc<RouteRegistry<C>>, lookup: Arc<dyn TokenLookup<C>>) -> Self {
        Self {
            registry,
            resolver: IdentityResolver::new(lookup),
        }
    }

    pub fn registry(&self) -> &RouteRegistry<C> {
        &self.registry
    }

    /// Run both stages for `key`.
    ///
    /// Returns the caller's identity for protected routes and `None` for
    /// public ones.
    pub fn check(
        &self,
        key: &RouteKey,
        authorization: Option<&str>,
    ) -> Result<Option<Identity<C>>, GuardError> {
        let access = self.registry.lookup(key);

        let identity = self
            .resolver
            .authenticate(access, authorization)
            .inspect_err(|e| tracing::info!(route = %key, reason = %e, "authentication failed"))?;

        if let RouteAccess::Protected(requirement) = access {
            authorize(identity.as_ref(), requirement).inspect_err(|e| {
                tracing::info!(
                    route = %key,
                    subject_id = identity.as_ref().map(|i| i.subject_id.as_str()).unwrap_or("-"),
                    missing = ?e.missing(),
                    "authorization denied"
                )
            })?;
        }

        if let Some(identity) = &identity {
            tracing::debug!(route = %key, subject_id = %identity.subject_id, "access granted");
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::SubjectId;

    use super::*;
    use crate::{CredentialSeed, CredentialStore, ModulePermission, Permission};

    fn module(token: &str) -> ModulePermission {
        token.parse().unwrap()
    }

    fn chain() -> GuardChain<ModulePermission> {
        let store = CredentialStore::builder()
            .static_token(
                "support-token",
                CredentialSeed::new(
                    SubjectId::new("user-7"),
                    "Support",
                    [module("orders:list"), module("orders:read")],
                ),
            )
            .static_token(
                "empty-token",
                CredentialSeed::new(
                    SubjectId::new("user-8"),
                    "Nobody",
                    Vec::<ModulePermission>::new(),
                ),
            )
            .build()
            .unwrap();

        let registry = RouteRegistry::builder()
            .route("GET", "/modules/public", RouteAccess::public())
            .route("GET", "/modules/orders", RouteAccess::require([module("orders:list")]))
            .route(
                "POST",
                "/modules/orders/:id/refund",
                RouteAccess::require([module("orders:refund")]),
            )
            .build()
            .unwrap();

        GuardChain::new(Arc::new(registry), Arc::new(store))
    }

    #[test]
    fn public_route_needs_no_header_and_yields_no_identity() {
        let chain = chain();
        let key = RouteKey::new("GET", "/modules/public");

        assert_eq!(chain.check(&key, None), Ok(None));
        assert_eq!(chain.check(&key, Some("Basic abc")), Ok(None));
    }

    #[test]
    fn authentication_failures_stop_before_authorization() {
        let chain = chain();
        let key = RouteKey::new("POST", "/modules/orders/:id/refund");

        for header in [None, Some("Basic dXNlcjpwYXNz"), Some("Bearer unknown")] {
            let err = chain.check(&key, header).unwrap_err();
            assert!(matches!(err, GuardError::Authentication(_)), "{header:?}: {err:?}");
            assert_eq!(err.status_code(), 401);
        }
    }

    #[test]
    fn module_refund_is_denied_with_missing_set() {
        let chain = chain();
        let key = RouteKey::new("POST", "/modules/orders/:id/refund");

        let err = chain.check(&key, Some("Bearer support-token")).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.reason(), "Forbidden");
        let GuardError::Authorization(authz) = err else {
            panic!("expected authorization error");
        };
        assert_eq!(authz.missing(), ["orders:refund"]);
    }

    #[test]
    fn granted_route_returns_identity() {
        let chain = chain();
        let key = RouteKey::new("GET", "/modules/orders");

        let identity = chain.check(&key, Some("Bearer support-token")).unwrap().unwrap();
        assert_eq!(identity.subject_id.as_str(), "user-7");
    }

    #[test]
    fn unregistered_route_authenticates_then_allows() {
        let chain = chain();
        let key = RouteKey::new("GET", "/modules/anything");

        assert!(chain.check(&key, Some("Bearer empty-token")).unwrap().is_some());
        assert_eq!(
            chain.check(&key, None),
            Err(GuardError::Authentication(AuthnError::MissingToken))
        );
    }

    #[test]
    fn caller_without_grants_gets_missing_capabilities() {
        let chain = chain();
        let key = RouteKey::new("GET", "/modules/orders");

        let err = chain.check(&key, Some("Bearer empty-token")).unwrap_err();
        assert!(matches!(
            err,
            GuardError::Authorization(AuthzError::MissingCapabilities { .. })
        ));
    }

    #[test]
    fn chains_are_independent_per_vocabulary() {
        let store = CredentialStore::<Permission>::builder().build().unwrap();
        let registry = RouteRegistry::<Permission>::builder().build().unwrap();
        let chain = GuardChain::new(Arc::new(registry), Arc::new(store));

        assert_eq!(
            chain.check(&RouteKey::new("GET", "/x"), Some("Bearer support-token")),
            Err(GuardError::Authentication(AuthnError::InvalidToken))
        );
    }
}
