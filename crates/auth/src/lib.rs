//! `gatehouse-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it resolves
//! bearer tokens to identities and decides whether an identity satisfies a
//! route's capability requirement. Transport layers feed it header values and
//! route keys and map its typed errors to responses.

pub mod authenticate;
pub mod authorize;
pub mod capability;
pub mod credentials;
pub mod guard;
pub mod identity;
pub mod module_permission;
pub mod permissions;
pub mod registry;
pub mod roles;

pub use authenticate::{AuthnError, IdentityResolver, extract_bearer};
pub use authorize::{
    AuthorizationExplanation, AuthzError, CapabilityRequirement, Denial, authorize, explain,
};
pub use capability::{Capability, CapabilityModel, MatchRule};
pub use credentials::{
    CredentialError, CredentialOrigin, CredentialRecord, CredentialSeed, CredentialStore,
    CredentialStoreBuilder, IssuedToken, PasswordCheck, TokenLookup,
};
pub use guard::{GuardChain, GuardError};
pub use identity::Identity;
pub use module_permission::ModulePermission;
pub use permissions::Permission;
pub use registry::{RegistryError, RouteAccess, RouteKey, RouteRegistry, RouteRegistryBuilder};
pub use roles::Role;
