use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    AccountId, Application, ApplicationId, ApplicationStatus, ContactDetails, DocumentSet,
    ItIssuedFields, PersonalDetails, ProgramChoice,
};
use super::scoring::PredictiveScore;

/// Fully prepared record waiting for the repository to assign identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingApplication {
    pub intake_year: i32,
    pub applicant: PersonalDetails,
    pub contact: ContactDetails,
    pub program: ProgramChoice,
    pub documents: DocumentSet,
    pub predictive_score: Option<PredictiveScore>,
    pub alerts: Vec<String>,
    pub candidate_id: Option<AccountId>,
    pub recommended_stream: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl PendingApplication {
    /// Materialize the record with the 1-based position it takes in the collection.
    pub fn assign(self, sequence: usize) -> Application {
        Application {
            id: ApplicationId(format!("app-{sequence:06}")),
            number: format_number(self.intake_year, sequence),
            version: 0,
            applicant: self.applicant,
            contact: self.contact,
            program: self.program,
            documents: self.documents,
            predictive_score: self.predictive_score,
            alerts: self.alerts,
            status: ApplicationStatus::Submitted,
            created_at: self.submitted_at,
            updated_at: self.submitted_at,
            agent_id: None,
            director_id: None,
            history: Vec::new(),
            it: ItIssuedFields::default(),
            candidate_id: self.candidate_id,
            recommended_stream: self.recommended_stream,
        }
    }
}

/// `ISM-<year>-<sequence>` with both parts zero-padded to four digits.
pub fn format_number(year: i32, sequence: usize) -> String {
    format!("ISM-{year:04}-{sequence:04}")
}

/// Storage abstraction so the service can be exercised against other backends.
pub trait ApplicationRepository: Send + Sync {
    /// Assign id and number from the current collection size and store the record.
    fn insert(&self, pending: PendingApplication) -> Result<Application, RepositoryError>;
    /// Store a record that already carries its identity (seed data, migrations).
    fn import(&self, record: Application) -> Result<Application, RepositoryError>;
    /// Replace a record if its `version` still matches; returns the stored copy.
    fn update(&self, record: Application) -> Result<Application, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    /// Owned copy of every record in insertion order.
    fn snapshot(&self) -> Result<Vec<Application>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record {0} already exists")]
    Duplicate(ApplicationId),
    #[error("record {id} changed since version {expected}")]
    Conflict { id: ApplicationId, expected: u64 },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local collection guarded by a single writer lock.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    records: Mutex<Vec<Application>>,
}

impl InMemoryApplicationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<Application>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, pending: PendingApplication) -> Result<Application, RepositoryError> {
        let mut guard = self.lock()?;
        let record = pending.assign(guard.len() + 1);
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Duplicate(record.id));
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn import(&self, record: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Duplicate(record.id));
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update(&self, mut record: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.lock()?;
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or(RepositoryError::NotFound)?;

        if slot.version != record.version {
            return Err(RepositoryError::Conflict {
                id: record.id,
                expected: record.version,
            });
        }

        record.version += 1;
        *slot = record.clone();
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn snapshot(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.lock()?.clone())
    }
}
