use std::sync::Arc;

use tracing::{info, warn};

use super::clock::{Clock, SystemClock};
use super::domain::{
    AccountId, Application, ApplicationDraft, ApplicationFilter, ApplicationId,
    ApplicationStatus, ExtraFields, HistoryEntry,
};
use super::events::{ChangeBus, ChangeEvent};
use super::grades::GradeSource;
use super::lifecycle::{TransitionCheck, TransitionPolicy};
use super::repository::{ApplicationRepository, PendingApplication, RepositoryError};
use super::scoring::{compute_score, recommend_stream, ScoreRequest};
use super::stats::AdmissionStats;

pub const DEFAULT_INTAKE_YEAR: i32 = 2026;

/// Knobs for the admissions service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionsSettings {
    pub intake_year: i32,
    pub transition_policy: TransitionPolicy,
}

impl Default for AdmissionsSettings {
    fn default() -> Self {
        Self {
            intake_year: DEFAULT_INTAKE_YEAR,
            transition_policy: TransitionPolicy::Strict,
        }
    }
}

/// Who performs a status change and what they note on the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub actor_id: AccountId,
    pub actor_name: String,
    pub comment: Option<String>,
    pub extra: Option<ExtraFields>,
}

impl StatusChange {
    pub fn new(
        status: ApplicationStatus,
        actor_id: AccountId,
        actor_name: impl Into<String>,
    ) -> Self {
        Self {
            status,
            actor_id,
            actor_name: actor_name.into(),
            comment: None,
            extra: None,
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn extra(mut self, extra: ExtraFields) -> Self {
        self.extra = Some(extra);
        self
    }
}

/// Service composing the repository, grade source, lifecycle rules and change bus.
pub struct AdmissionsService<R, G> {
    repository: Arc<R>,
    grades: Arc<G>,
    events: ChangeBus,
    clock: Arc<dyn Clock>,
    settings: AdmissionsSettings,
}

impl<R, G> AdmissionsService<R, G>
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
{
    pub fn new(
        repository: Arc<R>,
        grades: Arc<G>,
        events: ChangeBus,
        settings: AdmissionsSettings,
    ) -> Self {
        Self::with_clock(repository, grades, events, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<R>,
        grades: Arc<G>,
        events: ChangeBus,
        settings: AdmissionsSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            grades,
            events,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> AdmissionsSettings {
        self.settings
    }

    pub fn events(&self) -> &ChangeBus {
        &self.events
    }

    /// Register a new application in the `soumise` state.
    pub fn create(&self, draft: ApplicationDraft) -> Result<Application, AdmissionsError> {
        let now = self.clock.now();
        let ApplicationDraft {
            applicant,
            contact,
            program,
            documents,
            predictive_score,
            academic_record,
            alerts,
            candidate_id,
            recommended_stream,
        } = draft;

        let (predictive_score, scored_track) = match (predictive_score, academic_record) {
            (Some(score), _) => (score.normalized(), program.track.clone()),
            (None, Some(record)) => {
                let mut request = ScoreRequest::new(record.average, &record.track, now.date_naive());
                if program.level.is_graduate() {
                    request = request.graduate(record.experience_years);
                }
                (compute_score(&request), Some(record.track))
            }
            (None, None) => {
                let grades = self.grades.synthesize();
                let score = compute_score(&ScoreRequest::new(
                    grades.average,
                    &grades.track,
                    now.date_naive(),
                ));
                (score, Some(grades.track))
            }
        };

        let recommended_stream = recommended_stream.or_else(|| {
            Some(recommend_stream(
                Some(&predictive_score),
                scored_track.as_deref(),
            ))
        });

        let stored = self.repository.insert(PendingApplication {
            intake_year: self.settings.intake_year,
            applicant,
            contact,
            program,
            documents,
            predictive_score: Some(predictive_score),
            alerts,
            candidate_id,
            recommended_stream,
            submitted_at: now,
        })?;

        info!(
            application_id = %stored.id,
            number = %stored.number,
            school = %stored.program.school,
            "application submitted"
        );
        self.events.publish(ChangeEvent::ApplicationCreated {
            id: stored.id.clone(),
            number: stored.number.clone(),
        });
        Ok(stored)
    }

    /// Move an application to a new status. `Ok(None)` when the id is unknown.
    pub fn update_status(
        &self,
        id: &ApplicationId,
        change: StatusChange,
    ) -> Result<Option<Application>, AdmissionsError> {
        let Some(mut record) = self.repository.fetch(id)? else {
            return Ok(None);
        };

        let from = record.status;
        let to = change.status;
        match self.settings.transition_policy.check(from, to) {
            TransitionCheck::Allowed => {}
            TransitionCheck::Tolerated => {
                warn!(application_id = %id, %from, %to, actor = %change.actor_id, "transition outside review table accepted");
            }
            TransitionCheck::Refused => {
                warn!(application_id = %id, %from, %to, actor = %change.actor_id, "transition refused");
                return Err(AdmissionsError::InvalidTransition {
                    id: id.clone(),
                    from,
                    to,
                });
            }
        }

        let now = self.clock.now();
        record.status = to;
        record.updated_at = now;
        if let Some(message) = change.comment.filter(|comment| !comment.trim().is_empty()) {
            record.history.push(HistoryEntry {
                date: now,
                author: change.actor_name,
                message,
            });
        }
        if let Some(extra) = change.extra {
            extra.apply(&mut record);
        }

        let stored = self.repository.update(record)?;
        info!(application_id = %id, %from, %to, actor = %change.actor_id, "application status updated");
        self.events.publish(ChangeEvent::StatusChanged {
            id: id.clone(),
            from,
            to,
        });
        Ok(Some(stored))
    }

    /// Records matching every filter, newest first.
    pub fn list(&self, filter: &ApplicationFilter) -> Result<Vec<Application>, AdmissionsError> {
        let mut records: Vec<Application> = self
            .repository
            .snapshot()?
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.number.cmp(&a.number))
        });
        Ok(records)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<Option<Application>, AdmissionsError> {
        Ok(self.repository.fetch(id)?)
    }

    pub fn get_by_number(&self, number: &str) -> Result<Option<Application>, AdmissionsError> {
        Ok(self
            .repository
            .snapshot()?
            .into_iter()
            .find(|record| record.number == number))
    }

    pub fn by_candidate(
        &self,
        candidate_id: &AccountId,
    ) -> Result<Vec<Application>, AdmissionsError> {
        Ok(self
            .repository
            .snapshot()?
            .into_iter()
            .filter(|record| record.candidate_id.as_ref() == Some(candidate_id))
            .collect())
    }

    pub fn stats(&self) -> Result<AdmissionStats, AdmissionsError> {
        Ok(AdmissionStats::from_records(&self.repository.snapshot()?))
    }

    /// Load records that already carry their identity, e.g. demo data.
    pub fn import(&self, records: Vec<Application>) -> Result<usize, AdmissionsError> {
        let count = records.len();
        for record in records {
            self.repository.import(record)?;
        }
        Ok(count)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdmissionsError {
    #[error("application {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
