//! Credential storage
//!
//! The handshake only ever asks "does this username/secret pair match";
//! the store behind that question is pluggable so storage or hashing can
//! evolve without touching the protocol.

use std::collections::HashMap;

/// Answers authentication queries. Read-only after construction and
/// shared across all connection workers.
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive comparison of the raw submitted secret.
    /// No hashing or normalization is applied.
    fn verify(&self, username: &str, secret: &str) -> bool;
}

/// Static in-memory credential table - in production this would be a
/// proper database.
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        let mut users = HashMap::new();
        users.insert("jonny".to_string(), "jonnyl".to_string());
        users.insert("edwin".to_string(), "edwinm".to_string());
        users.insert("alberto".to_string(), "albertov".to_string());
        Self { users }
    }
}

impl CredentialStore for StaticCredentials {
    fn verify(&self, username: &str, secret: &str) -> bool {
        match self.users.get(username) {
            Some(stored) => stored == secret,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_known_user() {
        let store = StaticCredentials::default();
        assert!(store.verify("jonny", "jonnyl"));
        assert!(store.verify("edwin", "edwinm"));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let store = StaticCredentials::default();
        assert!(!store.verify("jonny", "wrong"));
        assert!(!store.verify("jonny", ""));
    }

    #[test]
    fn test_verify_unknown_user() {
        let store = StaticCredentials::default();
        assert!(!store.verify("mallory", "anything"));
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let store = StaticCredentials::default();
        assert!(!store.verify("Jonny", "jonnyl"));
        assert!(!store.verify("jonny", "JONNYL"));
    }

    #[test]
    fn test_custom_table() {
        let mut users = HashMap::new();
        users.insert("ana".to_string(), "s3cret".to_string());
        let store = StaticCredentials::new(users);
        assert!(store.verify("ana", "s3cret"));
        assert!(!store.verify("jonny", "jonnyl"));
    }
}
