//! Authentication stage: bearer header → identity.

use std::sync::Arc;

use thiserror::Error;

use crate::capability::Capability;
use crate::credentials::TokenLookup;
use crate::identity::Identity;
use crate::registry::RouteAccess;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthnError {
    /// No `Authorization` header, or not of the form `Bearer <token>`.
    #[error("missing or malformed bearer token")]
    MissingToken,

    /// The token is not known to the credential store.
    #[error("invalid or unknown token")]
    InvalidToken,
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme word is case-sensitive and must be followed by a single space.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthnError> {
    let header = header.ok_or(AuthnError::MissingToken)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthnError::MissingToken)?
        .trim();

    if token.is_empty() {
        return Err(AuthnError::MissingToken);
    }

    Ok(token)
}

/// Resolves bearer tokens through an injected credential lookup.
pub struct IdentityResolver<C: Capability> {
    lookup: Arc<dyn TokenLookup<C>>,
}

impl<C: Capability> Clone for IdentityResolver<C> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<C: Capability> IdentityResolver<C> {
    pub fn new(lookup: Arc<dyn TokenLookup<C>>) -> Self {
        Self { lookup }
    }

    /// Authenticate a request against the matched route's access rule.
    ///
    /// Public routes succeed with no identity and the header is not read at
    /// all. Every other route needs a resolvable bearer token.
    pub fn authenticate(
        &self,
        access: &RouteAccess<C>,
        authorization: Option<&str>,
    ) -> Result<Option<Identity<C>>, AuthnError> {
        if access.is_public() {
            return Ok(None);
        }

        let token = extract_bearer(authorization)?;
        let record = self.lookup.resolve(token).ok_or(AuthnError::InvalidToken)?;

        Ok(Some(record.to_identity()))
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::SubjectId;

    use super::*;
    use crate::{CredentialSeed, CredentialStore, Role};

    fn resolver() -> IdentityResolver<Role> {
        let store = CredentialStore::builder()
            .static_token(
                "admin-token",
                CredentialSeed::new(SubjectId::new("user-2"), "Admin", [Role::ADMIN, Role::READ]),
            )
            .build()
            .unwrap();
        IdentityResolver::new(Arc::new(store))
    }

    #[test]
    fn extract_bearer_accepts_well_formed_header() {
        assert_eq!(extract_bearer(Some("Bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer(Some("Bearer  abc ")), Ok("abc"));
    }

    #[test]
    fn extract_bearer_rejects_other_shapes() {
        for header in [
            None,
            Some(""),
            Some("Bearer"),
            Some("Bearer   "),
            Some("bearer abc"),
            Some("Basic dXNlcjpwYXNz"),
            Some("abc"),
        ] {
            assert_eq!(extract_bearer(header), Err(AuthnError::MissingToken), "{header:?}");
        }
    }

    #[test]
    fn public_routes_skip_the_header() {
        let resolver = resolver();
        assert_eq!(resolver.authenticate(&RouteAccess::public(), None), Ok(None));
        assert_eq!(
            resolver.authenticate(&RouteAccess::public(), Some("Bearer admin-token")),
            Ok(None)
        );
    }

    #[test]
    fn protected_routes_resolve_the_token() {
        let resolver = resolver();

        let identity = resolver
            .authenticate(&RouteAccess::authenticated(), Some("Bearer admin-token"))
            .unwrap()
            .unwrap();
        assert_eq!(identity.subject_id.as_str(), "user-2");
        assert!(identity.has(&Role::ADMIN));

        assert_eq!(
            resolver.authenticate(&RouteAccess::authenticated(), None),
            Err(AuthnError::MissingToken)
        );
        assert_eq!(
            resolver.authenticate(&RouteAccess::authenticated(), Some("Bearer nope")),
            Err(AuthnError::InvalidToken)
        );
    }
}
