use serde::{Deserialize, Serialize};

/// Caller role as asserted by the upstream auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Admin,
}

impl Role {
    /// Privileged callers are exempt from certain return-evidence requirements.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Request-scoped identity threaded into every engine operation.
///
/// The core never reads ambient state to find out who is calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub email: String,
    pub role: Role,
}

impl RequestContext {
    pub fn member(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: Role::Member,
        }
    }

    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: Role::Admin,
        }
    }
}
