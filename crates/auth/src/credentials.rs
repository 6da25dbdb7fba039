//! Credential store: static demo directory, static tokens and minted tokens.
//!
//! The store is an explicit object injected into the identity resolver, so
//! every test can build an isolated one. Minted tokens live until the store
//! is dropped (process lifetime in the server); there is no expiry or
//! revocation.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatehouse_core::SubjectId;

use crate::capability::Capability;
use crate::identity::Identity;

const TOKEN_SUFFIX_LEN: usize = 8;

/// How `validate` treats the supplied password.
///
/// Neither mode is secure: directory passwords are plain demo strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordCheck {
    /// Any non-empty password is accepted.
    #[default]
    PresenceOnly,
    /// The password must equal the directory entry's password.
    Exact,
}

/// Identity data a token is minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSeed<C: Capability> {
    pub subject_id: SubjectId,
    pub display_name: String,
    pub granted: BTreeSet<C>,
}

impl<C: Capability> CredentialSeed<C> {
    pub fn new(
        subject_id: impl Into<SubjectId>,
        display_name: impl Into<String>,
        granted: impl IntoIterator<Item = C>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            display_name: display_name.into(),
            granted: granted.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialOrigin {
    /// Pre-seeded, fixed token string.
    Static,
    /// Minted at login.
    Dynamic,
}

/// Stored mapping from a bearer token to identity data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord<C: Capability> {
    pub token: String,
    pub origin: CredentialOrigin,
    pub subject_id: SubjectId,
    pub display_name: String,
    pub granted: BTreeSet<C>,
}

impl<C: Capability> CredentialRecord<C> {
    fn from_seed(token: String, origin: CredentialOrigin, seed: &CredentialSeed<C>) -> Self {
        Self {
            token,
            origin,
            subject_id: seed.subject_id.clone(),
            display_name: seed.display_name.clone(),
            granted: seed.granted.clone(),
        }
    }

    pub fn to_identity(&self) -> Identity<C> {
        Identity {
            subject_id: self.subject_id.clone(),
            display_name: self.display_name.clone(),
            granted_capabilities: self.granted.clone(),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken<C: Capability> {
    pub token: String,
    pub identity: Identity<C>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("duplicate directory username '{0}'")]
    DuplicateUsername(String),

    #[error("duplicate static token for subject '{0}'")]
    DuplicateToken(SubjectId),

    #[error("static token for subject '{0}' is empty")]
    EmptyToken(SubjectId),
}

/// Token → record lookup used by the identity resolver.
///
/// Lookups never fail: absence is a normal outcome.
pub trait TokenLookup<C: Capability>: Send + Sync {
    fn resolve(&self, token: &str) -> Option<CredentialRecord<C>>;
}

impl<C, S> TokenLookup<C> for Arc<S>
where
    C: Capability,
    S: TokenLookup<C> + ?Sized,
{
    fn resolve(&self, token: &str) -> Option<CredentialRecord<C>> {
        (**self).resolve(token)
    }
}

#[derive(Debug, Clone)]
struct DirectoryEntry<C: Capability> {
    password: String,
    seed: CredentialSeed<C>,
}

/// In-memory credential store for one capability model.
#[derive(Debug)]
pub struct CredentialStore<C: Capability> {
    password_check: PasswordCheck,
    directory: HashMap<String, DirectoryEntry<C>>,
    static_tokens: HashMap<String, CredentialRecord<C>>,
    dynamic: RwLock<HashMap<String, CredentialRecord<C>>>,
    last_issued_ms: AtomicI64,
}

impl<C: Capability> CredentialStore<C> {
    pub fn builder() -> CredentialStoreBuilder<C> {
        CredentialStoreBuilder::new()
    }

    /// Look up a directory user by exact username.
    ///
    /// Returns `None` for unknown users and for passwords rejected by the
    /// configured [`PasswordCheck`].
    pub fn validate(&self, username: &str, password: &str) -> Option<CredentialSeed<C>> {
        let entry = self.directory.get(username)?;

        let accepted = match self.password_check {
            PasswordCheck::PresenceOnly => !password.is_empty(),
            PasswordCheck::Exact => password == entry.password,
        };

        accepted.then(|| entry.seed.clone())
    }

    /// Mint a fresh token for `seed` and store it in the dynamic map.
    ///
    /// Tokens combine the subject id, a strictly increasing millisecond
    /// timestamp and a short random suffix. They are unique within this store
    /// but are not cryptographically unguessable.
    pub fn issue_token(&self, seed: &CredentialSeed<C>) -> String {
        let mut dynamic = self.dynamic.write().unwrap_or_else(PoisonError::into_inner);

        let token = loop {
            let candidate = self.mint(&seed.subject_id);
            if !dynamic.contains_key(&candidate) && !self.static_tokens.contains_key(&candidate) {
                break candidate;
            }
        };

        dynamic.insert(
            token.clone(),
            CredentialRecord::from_seed(token.clone(), CredentialOrigin::Dynamic, seed),
        );
        drop(dynamic);

        tracing::info!(subject_id = %seed.subject_id, model = %C::MODEL, "issued bearer token");
        token
    }

    /// `validate` followed by `issue_token`.
    pub fn login(&self, username: &str, password: &str) -> Option<IssuedToken<C>> {
        let Some(seed) = self.validate(username, password) else {
            tracing::debug!(username, model = %C::MODEL, "login rejected");
            return None;
        };

        let token = self.issue_token(&seed);
        Some(IssuedToken {
            token,
            identity: Identity {
                subject_id: seed.subject_id,
                display_name: seed.display_name,
                granted_capabilities: seed.granted,
            },
        })
    }

    /// Dynamic map first, then the static table.
    pub fn resolve(&self, token: &str) -> Option<CredentialRecord<C>> {
        let dynamic = self.dynamic.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = dynamic.get(token) {
            return Some(record.clone());
        }
        drop(dynamic);

        self.static_tokens.get(token).cloned()
    }

    /// Number of tokens minted so far.
    pub fn issued_count(&self) -> usize {
        self.dynamic
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn mint(&self, subject_id: &SubjectId) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_SUFFIX_LEN)
            .map(char::from)
            .collect();

        format!("tok_{}_{}_{}", subject_id, self.next_timestamp(), suffix)
    }

    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = match self.last_issued_ms.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |last| Some(now.max(last + 1)),
        ) {
            Ok(prev) | Err(prev) => prev,
        };
        now.max(previous + 1)
    }
}

impl<C: Capability> TokenLookup<C> for CredentialStore<C> {
    fn resolve(&self, token: &str) -> Option<CredentialRecord<C>> {
        CredentialStore::resolve(self, token)
    }
}

/// Startup-time builder for a [`CredentialStore`].
#[derive(Debug)]
pub struct CredentialStoreBuilder<C: Capability> {
    password_check: PasswordCheck,
    users: Vec<(String, DirectoryEntry<C>)>,
    static_tokens: Vec<(String, CredentialSeed<C>)>,
}

impl<C: Capability> CredentialStoreBuilder<C> {
    pub fn new() -> Self {
        Self {
            password_check: PasswordCheck::default(),
            users: Vec::new(),
            static_tokens: Vec::new(),
        }
    }

    pub fn password_check(mut self, check: PasswordCheck) -> Self {
        self.password_check = check;
        self
    }

    /// Add a demo directory user.
    pub fn user(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        seed: CredentialSeed<C>,
    ) -> Self {
        self.users.push((
            username.into(),
            DirectoryEntry {
                password: password.into(),
                seed,
            },
        ));
        self
    }

    /// Add a pre-seeded token that resolves without logging in.
    pub fn static_token(mut self, token: impl Into<String>, seed: CredentialSeed<C>) -> Self {
        self.static_tokens.push((token.into(), seed));
        self
    }

    pub fn build(self) -> Result<CredentialStore<C>, CredentialError> {
        let mut directory = HashMap::with_capacity(self.users.len());
        for (username, entry) in self.users {
            if directory.contains_key(&username) {
                return Err(CredentialError::DuplicateUsername(username));
            }
            directory.insert(username, entry);
        }

        let mut static_tokens = HashMap::with_capacity(self.static_tokens.len());
        for (token, seed) in self.static_tokens {
            if token.trim().is_empty() {
                return Err(CredentialError::EmptyToken(seed.subject_id));
            }
            if static_tokens.contains_key(&token) {
                return Err(CredentialError::DuplicateToken(seed.subject_id));
            }
            let record =
                CredentialRecord::from_seed(token.clone(), CredentialOrigin::Static, &seed);
            static_tokens.insert(token, record);
        }

        Ok(CredentialStore {
            password_check: self.password_check,
            directory,
            static_tokens,
            dynamic: RwLock::new(HashMap::new()),
            last_issued_ms: AtomicI64::new(0),
        })
    }
}

impl<C: Capability> Default for CredentialStoreBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::{ModulePermission, Role};

    fn reader_seed() -> CredentialSeed<Role> {
        CredentialSeed::new(SubjectId::new("user-1"), "Reader", [Role::READ])
    }

    fn store(check: PasswordCheck) -> CredentialStore<Role> {
        CredentialStore::builder()
            .password_check(check)
            .user("reader", "reader123", reader_seed())
            .static_token("reader-token", reader_seed())
            .build()
            .unwrap()
    }

    #[test]
    fn presence_only_accepts_any_non_empty_password() {
        let store = store(PasswordCheck::PresenceOnly);

        let seed = store.validate("reader", "anything").unwrap();
        assert_eq!(seed.granted, BTreeSet::from([Role::READ]));
        assert!(store.validate("reader", "").is_none());
    }

    #[test]
    fn exact_requires_directory_password() {
        let store = store(PasswordCheck::Exact);

        assert!(store.validate("reader", "reader123").is_some());
        assert!(store.validate("reader", "wrong").is_none());
    }

    #[test]
    fn username_match_is_exact() {
        let store = store(PasswordCheck::PresenceOnly);

        assert!(store.validate("Reader", "x").is_none());
        assert!(store.validate("reader ", "x").is_none());
        assert!(store.validate("nobody", "x").is_none());
    }

    #[test]
    fn issued_token_resolves_to_seed() {
        let store = store(PasswordCheck::PresenceOnly);

        let issued = store.login("reader", "pw").unwrap();
        let record = store.resolve(&issued.token).unwrap();

        assert_eq!(record.origin, CredentialOrigin::Dynamic);
        assert_eq!(record.subject_id.as_str(), "user-1");
        assert_eq!(record.granted, BTreeSet::from([Role::READ]));
        assert!(issued.token.starts_with("tok_user-1_"));
    }

    #[test]
    fn static_tokens_are_the_fallback() {
        let store = store(PasswordCheck::PresenceOnly);

        let record = store.resolve("reader-token").unwrap();
        assert_eq!(record.origin, CredentialOrigin::Static);
        assert!(store.resolve("unknown-token").is_none());
        assert!(store.resolve("").is_none());
    }

    #[test]
    fn resolving_twice_is_stable() {
        let store = store(PasswordCheck::PresenceOnly);
        let token = store.login("reader", "pw").unwrap().token;

        let first = store.resolve(&token).unwrap().to_identity();
        let second = store.resolve(&token).unwrap().to_identity();
        assert_eq!(first, second);
        assert_eq!(store.issued_count(), 1);
    }

    #[test]
    fn sequential_tokens_for_same_subject_differ() {
        let store = store(PasswordCheck::PresenceOnly);
        let seed = reader_seed();

        let a = store.issue_token(&seed);
        let b = store.issue_token(&seed);
        assert_ne!(a, b);
    }

    #[test]
    fn concurrent_logins_lose_no_updates() {
        const N: usize = 64;

        let mut builder = CredentialStore::<ModulePermission>::builder();
        for i in 0..N {
            builder = builder.user(
                format!("user{i}"),
                "pw",
                CredentialSeed::new(
                    SubjectId::new(format!("user-{i}")),
                    format!("User {i}"),
                    ["users:list".parse::<ModulePermission>().unwrap()],
                ),
            );
        }
        let store = Arc::new(builder.build().unwrap());

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || store.login(&format!("user{i}"), "pw").unwrap())
            })
            .collect();
        let issued: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let distinct: HashSet<_> = issued.iter().map(|t| t.token.clone()).collect();
        assert_eq!(distinct.len(), N);
        assert_eq!(store.issued_count(), N);

        for token in issued {
            let record = store.resolve(&token.token).unwrap();
            assert_eq!(record.subject_id, token.identity.subject_id);
        }
    }

    #[test]
    fn builder_rejects_duplicates() {
        let err = CredentialStore::builder()
            .user("reader", "a", reader_seed())
            .user("reader", "b", reader_seed())
            .build()
            .unwrap_err();
        assert_eq!(err, CredentialError::DuplicateUsername("reader".into()));

        let err = CredentialStore::builder()
            .static_token("t", reader_seed())
            .static_token("t", reader_seed())
            .build()
            .unwrap_err();
        assert!(matches!(err, CredentialError::DuplicateToken(_)));

        let err = CredentialStore::builder()
            .static_token("  ", reader_seed())
            .build()
            .unwrap_err();
        assert!(matches!(err, CredentialError::EmptyToken(_)));
    }
}
