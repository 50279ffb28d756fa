//! Storage backends for the three session values.

use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// The fixed names under which session values are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
    TokenType,
}

impl SessionKey {
    pub const ALL: [SessionKey; 3] = [
        SessionKey::AccessToken,
        SessionKey::RefreshToken,
        SessionKey::TokenType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SessionKey::AccessToken => "accessToken",
            SessionKey::RefreshToken => "refreshToken",
            SessionKey::TokenType => "tokenType",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key/value storage for session values.
///
/// Implementations are shared between clones of the API client and may be
/// called from concurrent requests, so every operation takes `&self`.
/// Removing a key that is not stored must succeed.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError>;

    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError>;

    fn remove(&self, key: SessionKey) -> Result<(), SessionError>;
}

/// In-memory store for tests and sessions that should not outlive the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        Ok(self.values.lock().get(&key).cloned())
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError> {
        self.values.lock().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        self.values.lock().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_are_fixed() {
        assert_eq!(SessionKey::AccessToken.name(), "accessToken");
        assert_eq!(SessionKey::RefreshToken.name(), "refreshToken");
        assert_eq!(SessionKey::TokenType.to_string(), "tokenType");
    }

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemorySessionStore::new();
        assert!(store.is_empty());

        store.set(SessionKey::AccessToken, "a1").unwrap();
        store.set(SessionKey::AccessToken, "a2").unwrap();
        assert_eq!(store.get(SessionKey::AccessToken).unwrap().as_deref(), Some("a2"));
        assert_eq!(store.len(), 1);

        store.remove(SessionKey::AccessToken).unwrap();
        store.remove(SessionKey::RefreshToken).unwrap();
        assert!(store.get(SessionKey::AccessToken).unwrap().is_none());
    }
}
