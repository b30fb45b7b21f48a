use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use super::domain::{Account, AccountId, Role};
use super::events::{ChangeBus, ChangeEvent};
use super::session::{SessionError, SessionStore};

/// Registered accounts. Staff are seeded; candidates self-register.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    accounts: Mutex<DirectoryState>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    accounts: Vec<Account>,
    next_candidate: u64,
}

impl AccountDirectory {
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: Mutex::new(DirectoryState {
                accounts: accounts.into_iter().collect(),
                next_candidate: 0,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, DirectoryState>, IdentityError> {
        self.accounts
            .lock()
            .map_err(|_| IdentityError::Unavailable("directory mutex poisoned".to_string()))
    }

    /// Exact, case-sensitive match on both email and password.
    pub fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, IdentityError> {
        let guard = self.lock()?;
        Ok(guard
            .accounts
            .iter()
            .find(|account| account.email == email && account.password == password)
            .cloned())
    }

    pub fn find(&self, id: &AccountId) -> Result<Option<Account>, IdentityError> {
        let guard = self.lock()?;
        Ok(guard.accounts.iter().find(|account| &account.id == id).cloned())
    }

    pub fn accounts(&self) -> Result<Vec<Account>, IdentityError> {
        Ok(self.lock()?.accounts.clone())
    }

    fn register(&self, registration: CandidateRegistration) -> Result<Account, IdentityError> {
        let mut guard = self.lock()?;
        if guard
            .accounts
            .iter()
            .any(|account| account.email == registration.email)
        {
            return Err(IdentityError::DuplicateEmail(registration.email));
        }

        let id = loop {
            guard.next_candidate += 1;
            let candidate = AccountId(format!("candidat-{}", guard.next_candidate));
            if guard.accounts.iter().all(|account| account.id != candidate) {
                break candidate;
            }
        };

        let account = Account {
            id,
            email: registration.email,
            password: registration.password,
            last_name: registration.last_name,
            first_name: registration.first_name,
            role: Role::Candidate,
            school: None,
        };
        guard.accounts.push(account.clone());
        Ok(account)
    }

    /// Undo a registration whose session could not be opened.
    fn remove(&self, id: &AccountId) -> Result<(), IdentityError> {
        self.lock()?.accounts.retain(|account| &account.id != id);
        Ok(())
    }
}

/// Self-service registration payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRegistration {
    pub email: String,
    pub password: String,
    pub last_name: String,
    pub first_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("an account already uses {0}")]
    DuplicateEmail(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Authentication and session handling over the directory.
pub struct IdentityService<S> {
    directory: Arc<AccountDirectory>,
    sessions: Arc<S>,
    events: ChangeBus,
}

impl<S> IdentityService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(directory: Arc<AccountDirectory>, sessions: Arc<S>, events: ChangeBus) -> Self {
        Self {
            directory,
            sessions,
            events,
        }
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    /// Returns `None` for an unknown email or a wrong password alike.
    pub fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, IdentityError> {
        let Some(account) = self.directory.find_by_credentials(email, password)? else {
            return Ok(None);
        };

        self.sessions.save(&account.id)?;
        info!(account_id = %account.id, role = account.role.label(), "session started");
        self.events.publish(ChangeEvent::SessionStarted {
            account_id: account.id.clone(),
        });
        Ok(Some(account))
    }

    pub fn end_session(&self) -> Result<(), IdentityError> {
        self.sessions.clear()?;
        info!("session ended");
        self.events.publish(ChangeEvent::SessionEnded);
        Ok(())
    }

    /// Resolve the stored session against the directory.
    pub fn current_session(&self) -> Result<Option<Account>, IdentityError> {
        match self.sessions.load()? {
            Some(account_id) => self.directory.find(&account_id),
            None => Ok(None),
        }
    }

    /// Create a candidate account and make it the active session. The account
    /// is not kept when the session cannot be saved.
    pub fn register_candidate(
        &self,
        registration: CandidateRegistration,
    ) -> Result<Account, IdentityError> {
        let account = self.directory.register(registration)?;
        if let Err(err) = self.sessions.save(&account.id) {
            warn!(
                account_id = %account.id,
                error = %err,
                "session save failed, registration rolled back"
            );
            self.directory.remove(&account.id)?;
            return Err(err.into());
        }
        info!(account_id = %account.id, "candidate registered");
        self.events.publish(ChangeEvent::AccountRegistered {
            account_id: account.id.clone(),
        });
        Ok(account)
    }
}
