use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque owner identifier threaded through every registry call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Owner(Uuid);

impl Owner {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Canonical hyphenated lowercase form; this is the text the code generator hashes.
impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Supplies the owner on whose behalf the caller acts.
pub trait IdentityProvider: Send + Sync {
    fn current_owner(&self) -> Owner;
}

/// One ephemeral identity per session, issued when the session starts.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    owner: Owner,
}

impl SessionIdentity {
    pub fn new() -> Self {
        let owner = Owner::random();
        tracing::info!(%owner, "Issued session identity");
        Self { owner }
    }

    pub fn with_owner(owner: Owner) -> Self {
        Self { owner }
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_owner(&self) -> Owner {
        self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_identity_is_stable() {
        let identity = SessionIdentity::new();
        assert_eq!(identity.current_owner(), identity.current_owner());
    }

    #[test]
    fn sessions_get_distinct_owners() {
        assert_ne!(
            SessionIdentity::new().current_owner(),
            SessionIdentity::new().current_owner()
        );
    }

    #[test]
    fn owner_displays_as_canonical_uuid() {
        let id = Uuid::parse_str("67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        assert_eq!(
            Owner::new(id).to_string(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }
}
