use keyring::Entry;

use super::store::{SessionError, SessionKey, SessionStore};

const SERVICE_NAME: &str = "growthcanvas";

/// Session values kept in the OS keychain, one entry per key.
pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a different keychain service name (e.g. one per backend environment)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: SessionKey) -> Result<Entry, SessionError> {
        Ok(Entry::new(&self.service, key.name())?)
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringSessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
