use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::store::{SessionError, SessionKey, SessionStore};

/// Session file name in the data directory
pub const SESSION_FILE: &str = "session.json";

/// Session values in a JSON file, for machines without a usable keychain.
///
/// The file holds a flat object keyed by the session key names and is
/// rewritten on every change. The lock serializes read-modify-write cycles
/// between clones sharing the store.
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(dir: &Path) -> Self {
        Self::with_path(dir.join(SESSION_FILE))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, SessionError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if values.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(values)?;
        let mut file = open_private(&self.path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}

/// Open `path` for writing, readable by the owner only. New files are
/// created with mode 0600; an existing file is narrowed before it is truncated.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    if path.exists() {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        let _guard = self.lock.lock();
        Ok(self.read()?.remove(key.name()))
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionError> {
        let _guard = self.lock.lock();
        let mut values = self.read()?;
        values.insert(key.name().to_string(), value.to_string());
        self.write(&values)
    }

    fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        let _guard = self.lock.lock();
        let mut values = self.read()?;
        if values.remove(key.name()).is_some() {
            self.write(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.set(SessionKey::AccessToken, "a1").unwrap();
        store.set(SessionKey::TokenType, "Bearer").unwrap();

        let reopened = FileSessionStore::new(dir.path());
        assert_eq!(reopened.get(SessionKey::AccessToken).unwrap().as_deref(), Some("a1"));
        assert_eq!(reopened.get(SessionKey::TokenType).unwrap().as_deref(), Some("Bearer"));
        assert!(reopened.get(SessionKey::RefreshToken).unwrap().is_none());
    }

    #[test]
    fn test_file_uses_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.set(SessionKey::RefreshToken, "r1").unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["refreshToken"], "r1");
    }

    #[test]
    fn test_removing_last_value_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.set(SessionKey::AccessToken, "a1").unwrap();
        assert!(store.path().exists());

        store.remove(SessionKey::AccessToken).unwrap();
        assert!(!store.path().exists());

        // Removing again is a no-op
        store.remove(SessionKey::AccessToken).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.set(SessionKey::AccessToken, "a1").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // A file left world-readable is narrowed on the next write
        std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();
        store.set(SessionKey::RefreshToken, "r1").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get(SessionKey::AccessToken).unwrap().as_deref(), Some("a1"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(
            store.get(SessionKey::AccessToken),
            Err(SessionError::Format(_))
        ));
    }
}
