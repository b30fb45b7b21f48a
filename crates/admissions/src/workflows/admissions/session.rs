use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::domain::AccountId;

/// Single source of truth for the active session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<AccountId>, SessionError>;
    fn save(&self, account_id: &AccountId) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session slot io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("session slot holds malformed data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("session slot unavailable: {0}")]
    Unavailable(String),
}

/// Session kept in process memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<AccountId>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<AccountId>, SessionError> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| SessionError::Unavailable("session mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, account_id: &AccountId) -> Result<(), SessionError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| SessionError::Unavailable("session mutex poisoned".to_string()))?;
        *guard = Some(account_id.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| SessionError::Unavailable("session mutex poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    account_id: AccountId,
}

/// Session stored as a small JSON file so it survives a restart.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<AccountId>, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let persisted: PersistedSession = serde_json::from_slice(&bytes)?;
                Ok(Some(persisted.account_id))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, account_id: &AccountId) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let payload = serde_json::to_vec(&PersistedSession {
            account_id: account_id.clone(),
        })?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
