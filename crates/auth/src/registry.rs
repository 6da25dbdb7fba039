//! Route requirement registry: an explicit table built at startup.
//!
//! Requirements attach either to one route (method + path) or to a path
//! group. Lookup is closest-wins: a route entry beats any group, and a longer
//! group prefix beats a shorter one. Unregistered routes fall back to
//! "authenticated, no capability required".

use std::collections::HashMap;

use thiserror::Error;

use crate::authorize::CapabilityRequirement;
use crate::capability::Capability;

/// Key of one route: upper-cased HTTP method plus the route's path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    method: String,
    path: String,
}

impl RouteKey {
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            path: path.into(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl core::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Declared access rule of a route: public XOR a capability requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess<C: Capability> {
    /// No authentication; requirements do not apply.
    Public,
    /// Authentication required, then the requirement is evaluated.
    Protected(CapabilityRequirement<C>),
}

impl<C: Capability> RouteAccess<C> {
    pub fn public() -> Self {
        RouteAccess::Public
    }

    /// Authenticated-only.
    pub fn authenticated() -> Self {
        RouteAccess::Protected(CapabilityRequirement::none())
    }

    pub fn require(required: impl IntoIterator<Item = C>) -> Self {
        RouteAccess::Protected(CapabilityRequirement::new(required))
    }

    pub fn is_public(&self) -> bool {
        matches!(self, RouteAccess::Public)
    }

    pub fn requirement(&self) -> Option<&CapabilityRequirement<C>> {
        match self {
            RouteAccess::Public => None,
            RouteAccess::Protected(requirement) => Some(requirement),
        }
    }
}

impl<C: Capability> Default for RouteAccess<C> {
    fn default() -> Self {
        Self::authenticated()
    }
}

impl<C: Capability> core::fmt::Display for RouteAccess<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RouteAccess::Public => f.write_str("public"),
            RouteAccess::Protected(req) if req.is_empty() => f.write_str("authenticated"),
            RouteAccess::Protected(req) => {
                let tokens: Vec<&str> = req.required().iter().map(|c| c.as_str()).collect();
                write!(f, "{} of [{}]", req.rule(), tokens.join(", "))
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("route {0} registered twice")]
    DuplicateRoute(RouteKey),

    #[error("group '{0}' registered twice")]
    DuplicateGroup(String),

    #[error("path '{0}' must start with '/'")]
    InvalidPath(String),

    #[error("invalid requirement: {0}")]
    InvalidRequirement(String),
}

/// Immutable requirement table for one route tree.
#[derive(Debug, Clone)]
pub struct RouteRegistry<C: Capability> {
    routes: HashMap<RouteKey, RouteAccess<C>>,
    /// Sorted by prefix length, longest first.
    groups: Vec<(String, RouteAccess<C>)>,
    fallback: RouteAccess<C>,
}

impl<C: Capability> RouteRegistry<C> {
    pub fn builder() -> RouteRegistryBuilder<C> {
        RouteRegistryBuilder::new()
    }

    /// Access rule for `key`, closest declaration first.
    ///
    /// `HEAD` is served by `GET` handlers, so a `HEAD` key without its own
    /// entry takes the `GET` entry for the same path.
    pub fn lookup(&self, key: &RouteKey) -> &RouteAccess<C> {
        if let Some(access) = self.routes.get(key) {
            return access;
        }
        if key.method() == "HEAD" {
            if let Some(access) = self.routes.get(&RouteKey::new("GET", key.path())) {
                return access;
            }
        }

        self.groups
            .iter()
            .find(|(prefix, _)| path_in_group(key.path(), prefix))
            .map(|(_, access)| access)
            .unwrap_or(&self.fallback)
    }

    /// Every route entry, sorted by key.
    pub fn routes(&self) -> Vec<(&RouteKey, &RouteAccess<C>)> {
        let mut entries: Vec<_> = self.routes.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Every group entry, longest prefix first.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &RouteAccess<C>)> {
        self.groups.iter().map(|(p, a)| (p.as_str(), a))
    }
}

/// Segment-aware prefix match: `/admin` covers `/admin` and `/admin/x`, not `/administrator`.
fn path_in_group(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Startup-time builder for a [`RouteRegistry`].
#[derive(Debug)]
pub struct RouteRegistryBuilder<C: Capability> {
    routes: Vec<(RouteKey, RouteAccess<C>)>,
    groups: Vec<(String, RouteAccess<C>)>,
}

impl<C: Capability> RouteRegistryBuilder<C> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Attach `access` to one route.
    pub fn register(mut self, key: RouteKey, access: RouteAccess<C>) -> Self {
        self.routes.push((key, access));
        self
    }

    /// Shorthand for `register(RouteKey::new(method, path), access)`.
    pub fn route(self, method: &str, path: &str, access: RouteAccess<C>) -> Self {
        self.register(RouteKey::new(method, path), access)
    }

    /// Attach `access` to every route under `prefix`, for all methods.
    pub fn group(mut self, prefix: &str, access: RouteAccess<C>) -> Self {
        self.groups.push((prefix.to_string(), access));
        self
    }

    pub fn build(self) -> Result<RouteRegistry<C>, RegistryError> {
        let mut routes = HashMap::with_capacity(self.routes.len());
        for (key, access) in self.routes {
            if !key.path().starts_with('/') {
                return Err(RegistryError::InvalidPath(key.path().to_string()));
            }
            if routes.contains_key(&key) {
                return Err(RegistryError::DuplicateRoute(key));
            }
            routes.insert(key, access);
        }

        let mut groups: Vec<(String, RouteAccess<C>)> = Vec::with_capacity(self.groups.len());
        for (prefix, access) in self.groups {
            if !prefix.starts_with('/') {
                return Err(RegistryError::InvalidPath(prefix));
            }
            let prefix = normalize_prefix(&prefix);
            if groups.iter().any(|(p, _)| *p == prefix) {
                return Err(RegistryError::DuplicateGroup(prefix));
            }
            groups.push((prefix, access));
        }
        groups.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(RouteRegistry {
            routes,
            groups,
            fallback: RouteAccess::default(),
        })
    }
}

impl<C: Capability> Default for RouteRegistryBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
