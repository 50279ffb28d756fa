use std::sync::Arc;

use tracing::warn;

use super::credential::{Credential, TokenResponse, DEFAULT_TOKEN_TYPE};
use super::store::{MemorySessionStore, SessionError, SessionKey, SessionStore};

/// Typed view over a [`SessionStore`].
///
/// Every read goes to the store, so two clones of a `Session` (or two
/// clones of the API client) always observe the latest credential.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Current credential, or `None` when no access token is stored.
    pub fn credential(&self) -> Result<Option<Credential>, SessionError> {
        let Some(access_token) = self.store.get(SessionKey::AccessToken)? else {
            return Ok(None);
        };
        let token_type = self
            .store
            .get(SessionKey::TokenType)?
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());
        Ok(Some(Credential {
            access_token,
            refresh_token: self.store.get(SessionKey::RefreshToken)?,
            token_type,
        }))
    }

    pub fn access_token(&self) -> Result<Option<String>, SessionError> {
        self.store.get(SessionKey::AccessToken)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, SessionError> {
        self.store.get(SessionKey::RefreshToken)
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }

    /// Store a credential from a fresh login. A missing refresh token
    /// leaves any previously stored one in place.
    pub fn store_credential(&self, credential: &Credential) -> Result<(), SessionError> {
        self.store.set(SessionKey::AccessToken, &credential.access_token)?;
        self.store.set(SessionKey::TokenType, &credential.token_type)?;
        if let Some(ref refresh_token) = credential.refresh_token {
            self.store.set(SessionKey::RefreshToken, refresh_token)?;
        }
        Ok(())
    }

    /// Overwrite the stored credential with the result of a token refresh.
    /// The refresh token is only replaced when the server returned one.
    pub fn apply_refresh(&self, response: &TokenResponse) -> Result<(), SessionError> {
        self.store.set(SessionKey::AccessToken, &response.access_token)?;
        self.store.set(SessionKey::TokenType, response.token_type())?;
        if let Some(ref refresh_token) = response.refresh_token {
            self.store.set(SessionKey::RefreshToken, refresh_token)?;
        }
        Ok(())
    }

    /// Store only an access token, as handed back by an OAuth redirect.
    pub fn store_access_token(&self, access_token: &str) -> Result<(), SessionError> {
        self.store.set(SessionKey::AccessToken, access_token)
    }

    /// Remove all three session values. Every key is attempted even if an
    /// earlier removal fails; the first error is returned.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.remove_keys(&SessionKey::ALL)
    }

    /// Drop the access token and token type but keep the refresh token.
    pub fn clear_access(&self) -> Result<(), SessionError> {
        self.remove_keys(&[SessionKey::AccessToken, SessionKey::TokenType])
    }

    fn remove_keys(&self, keys: &[SessionKey]) -> Result<(), SessionError> {
        let mut first_error = None;
        for key in keys {
            if let Err(e) = self.store.remove(*key) {
                warn!(key = %key, error = %e, "Failed to remove session value");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refresh_response(json: &str) -> TokenResponse {
        serde_json::from_str(json).expect("Failed to parse token response")
    }

    #[test]
    fn test_empty_session_has_no_credential() {
        let session = Session::in_memory();
        assert!(session.credential().unwrap().is_none());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_missing_token_type_reads_as_bearer() {
        let session = Session::in_memory();
        session.store_access_token("from-oauth").unwrap();

        let cred = session.credential().unwrap().unwrap();
        assert_eq!(cred.token_type, "Bearer");
        assert_eq!(cred.authorization_value(), "Bearer from-oauth");
    }

    #[test]
    fn test_refresh_without_refresh_token_preserves_stored_one() {
        let session = Session::in_memory();
        session
            .store_credential(&Credential::new("a1").with_refresh_token("r1"))
            .unwrap();

        session
            .apply_refresh(&refresh_response(r#"{"access_token": "a2"}"#))
            .unwrap();

        let cred = session.credential().unwrap().unwrap();
        assert_eq!(cred.access_token, "a2");
        assert_eq!(cred.refresh_token.as_deref(), Some("r1"));
        assert_eq!(cred.token_type, "Bearer");
    }

    #[test]
    fn test_refresh_with_new_refresh_token_rotates_it() {
        let session = Session::in_memory();
        session
            .store_credential(&Credential::new("a1").with_refresh_token("r1"))
            .unwrap();

        session
            .apply_refresh(&refresh_response(
                r#"{"access_token": "a2", "refresh_token": "r2", "token_type": "bearer"}"#,
            ))
            .unwrap();

        let cred = session.credential().unwrap().unwrap();
        assert_eq!(cred.refresh_token.as_deref(), Some("r2"));
        assert_eq!(cred.authorization_value(), "bearer a2");
    }

    #[test]
    fn test_clear_removes_all_values() {
        let store = Arc::new(MemorySessionStore::new());
        let session = Session::new(store.clone());
        session
            .store_credential(&Credential::new("a1").with_refresh_token("r1"))
            .unwrap();
        assert_eq!(store.len(), 3);

        session.clear().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_access_keeps_refresh_token() {
        let session = Session::in_memory();
        session
            .store_credential(&Credential::new("a1").with_refresh_token("r1"))
            .unwrap();

        session.clear_access().unwrap();
        assert!(!session.is_logged_in());
        assert_eq!(session.refresh_token().unwrap().as_deref(), Some("r1"));
    }
}
