//! Authorization gate — static allow-list of sender handles.
//!
//! Loaded once from config; immutable for the process lifetime.  Handles are
//! compared case-sensitively and without a leading `@`.

use std::collections::BTreeSet;

use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct AuthorizationGate {
    allowed: BTreeSet<String>,
}

impl AuthorizationGate {
    pub fn new(allowed: impl IntoIterator<Item = String>) -> Self {
        let allowed: BTreeSet<String> = allowed.into_iter().collect();
        if allowed.is_empty() {
            warn!("authorized user list is empty — every command will be denied");
        }
        Self { allowed }
    }

    /// `None` (sender without a handle) is never authorized.
    pub fn is_authorized(&self, identity: Option<&str>) -> bool {
        match identity {
            Some(id) => {
                let id = id.strip_prefix('@').unwrap_or(id);
                self.allowed.contains(id)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthorizationGate {
        AuthorizationGate::new(["alice".to_string(), "bob".to_string()])
    }

    #[test]
    fn listed_handles_pass() {
        let g = gate();
        assert!(g.is_authorized(Some("alice")));
        assert!(g.is_authorized(Some("@bob")));
    }

    #[test]
    fn unlisted_or_missing_handles_fail() {
        let g = gate();
        assert!(!g.is_authorized(Some("eve")));
        assert!(!g.is_authorized(Some("Alice")));
        assert!(!g.is_authorized(Some("ali")));
        assert!(!g.is_authorized(Some("")));
        assert!(!g.is_authorized(None));
    }

    #[test]
    fn empty_gate_denies_everyone() {
        let g = AuthorizationGate::new(Vec::new());
        assert!(!g.is_authorized(Some("alice")));
        assert!(!g.is_authorized(Some("")));
    }
}
