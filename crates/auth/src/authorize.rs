//! Authorization stage: one generic matcher for every capability model.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::capability::{Capability, CapabilityModel, MatchRule};
use crate::identity::Identity;

/// Capabilities a route requires, with the rule used to compare them.
///
/// Required tokens keep declaration order (duplicates dropped) so denial
/// messages list them the way the route declared them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRequirement<C: Capability> {
    required: Vec<C>,
    rule: MatchRule,
}

impl<C: Capability> CapabilityRequirement<C> {
    /// Requirement using the model's own match rule.
    pub fn new(required: impl IntoIterator<Item = C>) -> Self {
        let mut seen = BTreeSet::new();
        let required = required
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();

        Self {
            required,
            rule: C::MODEL.match_rule(),
        }
    }

    /// Authenticated-only: no capability needed.
    pub fn none() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn required(&self) -> &[C] {
        &self.required
    }

    pub fn rule(&self) -> MatchRule {
        self.rule
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }
}

/// Details of a failed match.
///
/// `required` is always echoed. `granted` is only filled for ANY-rule
/// denials, where the caller's own roles are part of the message; ALL-rule
/// denials report only what is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub model: CapabilityModel,
    pub rule: MatchRule,
    pub required: Vec<String>,
    pub missing: Vec<String>,
    pub granted: Vec<String>,
}

impl core::fmt::Display for Denial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let noun = self.model.noun();
        match self.rule {
            MatchRule::Any => write!(
                f,
                "Access denied. Required {noun} (any of): {}. Your {noun}: {}",
                self.required.join(", "),
                self.granted.join(", "),
            ),
            MatchRule::All => write!(
                f,
                "Access denied. Missing {noun}: {}",
                self.missing.join(", "),
            ),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The caller holds no capabilities at all for this model.
    #[error("Access denied. No {} granted", .model.noun())]
    MissingCapabilities { model: CapabilityModel },

    /// The caller's capabilities do not satisfy the match rule.
    #[error("{0}")]
    InsufficientCapabilities(Denial),
}

impl AuthzError {
    /// Missing tokens, for diagnostics. Empty for `MissingCapabilities`.
    pub fn missing(&self) -> &[String] {
        match self {
            AuthzError::MissingCapabilities { .. } => &[],
            AuthzError::InsufficientCapabilities(denial) => &denial.missing,
        }
    }
}

/// Decide whether `identity` satisfies `requirement`.
///
/// - No IO
/// - No panics
/// - Deterministic for the same inputs
pub fn authorize<C: Capability>(
    identity: Option<&Identity<C>>,
    requirement: &CapabilityRequirement<C>,
) -> Result<(), AuthzError> {
    if requirement.is_empty() {
        return Ok(());
    }

    let granted = match identity {
        Some(identity) if !identity.granted_capabilities.is_empty() => {
            &identity.granted_capabilities
        }
        _ => return Err(AuthzError::MissingCapabilities { model: C::MODEL }),
    };

    let required = requirement.required();

    match requirement.rule() {
        MatchRule::Any => {
            if required.iter().any(|c| granted.contains(c)) {
                return Ok(());
            }
            Err(AuthzError::InsufficientCapabilities(Denial {
                model: C::MODEL,
                rule: MatchRule::Any,
                required: labels(required.iter()),
                missing: labels(required.iter()),
                granted: labels(granted.iter()),
            }))
        }
        MatchRule::All => {
            let missing = labels(required.iter().filter(|c| !granted.contains(*c)));
            if missing.is_empty() {
                return Ok(());
            }
            Err(AuthzError::InsufficientCapabilities(Denial {
                model: C::MODEL,
                rule: MatchRule::All,
                required: labels(required.iter()),
                missing,
                granted: Vec::new(),
            }))
        }
    }
}

fn labels<'a, C: Capability>(caps: impl Iterator<Item = &'a C>) -> Vec<String> {
    caps.map(|c| c.as_str().to_string()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Explanation of one authorization decision for the caller's own use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    pub model: CapabilityModel,
    pub rule: MatchRule,
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    pub required: Vec<String>,

    /// Required tokens the caller holds.
    pub matched: Vec<String>,

    /// Required tokens the caller lacks.
    pub missing: Vec<String>,
}

/// Explain how `authorize` decides for this identity and requirement.
///
/// Only the intersection with the required set is reported, never the
/// caller's full grant list.
pub fn explain<C: Capability>(
    identity: &Identity<C>,
    requirement: &CapabilityRequirement<C>,
) -> AuthorizationExplanation {
    let (matched, missing): (Vec<&C>, Vec<&C>) = requirement
        .required()
        .iter()
        .partition(|c| identity.has(c));

    let required = labels(requirement.required().iter());

    let (granted, reason) = match authorize(Some(identity), requirement) {
        Ok(()) if requirement.is_empty() => (true, "No capability required".to_string()),
        Ok(()) => match requirement.rule() {
            MatchRule::Any => (true, "Caller holds at least one required capability".to_string()),
            MatchRule::All => (true, "Caller holds every required capability".to_string()),
        },
        Err(e) => (false, e.to_string()),
    };

    AuthorizationExplanation {
        model: C::MODEL,
        rule: requirement.rule(),
        granted,
        reason,
        required,
        matched: labels(matched.into_iter()),
        missing: labels(missing.into_iter()),
    }
}
