//! Request/response DTOs.

use serde::{Deserialize, Serialize};

use gatehouse_auth::{Capability, Identity};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct LoginResponse<C: Capability> {
    pub message: String,
    pub token: String,
    pub identity: Identity<C>,
}

/// `?capability=a,b`: comma-separated tokens in the sub-application's vocabulary.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplainQuery {
    pub capability: String,
}

impl ExplainQuery {
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.capability
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_query_splits_and_trims() {
        let q = ExplainQuery {
            capability: " users:list, ,orders:refund ".into(),
        };
        assert_eq!(q.tokens().collect::<Vec<_>>(), ["users:list", "orders:refund"]);
    }
}
