use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::admissions::clock::Clock;
use crate::workflows::admissions::domain::{
    AccountId, Application, ApplicationDraft, ApplicationId, ContactDetails, DocumentSet, Level,
    PersonalDetails, ProgramChoice, Sex,
};
use crate::workflows::admissions::events::ChangeBus;
use crate::workflows::admissions::grades::FixedGradeSource;
use crate::workflows::admissions::identity::{AccountDirectory, IdentityService};
use crate::workflows::admissions::lifecycle::TransitionPolicy;
use crate::workflows::admissions::repository::{
    ApplicationRepository, InMemoryApplicationRepository, PendingApplication, RepositoryError,
};
use crate::workflows::admissions::router::{admissions_router, AdmissionsApi};
use crate::workflows::admissions::seed::staff_accounts;
use crate::workflows::admissions::service::{AdmissionsService, AdmissionsSettings};
use crate::workflows::admissions::session::MemorySessionStore;

pub(super) type TestService = AdmissionsService<InMemoryApplicationRepository, FixedGradeSource>;
pub(super) type TestApi =
    AdmissionsApi<InMemoryApplicationRepository, FixedGradeSource, MemorySessionStore>;

/// Advances one minute on every read so records get distinct timestamps.
#[derive(Debug)]
pub(super) struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub(super) fn new() -> Self {
        Self {
            start: Utc
                .with_ymd_and_hms(2026, 2, 1, 8, 0, 0)
                .single()
                .expect("valid start"),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::minutes(tick)
    }
}

pub(super) fn agent() -> AccountId {
    AccountId("2".to_string())
}

pub(super) fn director() -> AccountId {
    AccountId("3".to_string())
}

pub(super) fn it_officer() -> AccountId {
    AccountId("5".to_string())
}

pub(super) fn draft() -> ApplicationDraft {
    ApplicationDraft {
        applicant: PersonalDetails {
            last_name: "Diop".to_string(),
            first_name: "Awa".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2006, 4, 2).expect("valid date"),
            birth_place: "Dakar".to_string(),
            sex: Sex::F,
            nationality: "Sénégalaise".to_string(),
            photo: None,
        },
        contact: ContactDetails {
            phone: "+221 77 000 11 22".to_string(),
            parent_phone: "+221 77 000 33 44".to_string(),
            parent_relation: Some("Mere".to_string()),
            email: "awa.diop@gmail.com".to_string(),
            address: "Sicap Liberté, Dakar".to_string(),
        },
        program: ProgramChoice {
            school: "Ingénieurs".to_string(),
            track: Some("Informatique".to_string()),
            class_name: "Licence 1 Informatique".to_string(),
            level: Level::L1,
        },
        documents: DocumentSet {
            identity_card: Some("/documents/cni-awa.pdf".to_string()),
            ..DocumentSet::default()
        },
        predictive_score: None,
        academic_record: None,
        alerts: Vec::new(),
        candidate_id: None,
        recommended_stream: None,
    }
}

pub(super) fn draft_for(school: &str, class_name: &str, level: Level) -> ApplicationDraft {
    let mut draft = draft();
    draft.program.school = school.to_string();
    draft.program.class_name = class_name.to_string();
    draft.program.level = level;
    draft
}

pub(super) fn build_service(
    policy: TransitionPolicy,
) -> (TestService, Arc<InMemoryApplicationRepository>, ChangeBus) {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let events = ChangeBus::new();
    let service = AdmissionsService::with_clock(
        repository.clone(),
        Arc::new(FixedGradeSource::new(15.0, "S2")),
        events.clone(),
        AdmissionsSettings {
            intake_year: 2026,
            transition_policy: policy,
        },
        Arc::new(SteppingClock::new()),
    );
    (service, repository, events)
}

pub(super) fn build_api() -> Arc<TestApi> {
    let (admissions, _, events) = build_service(TransitionPolicy::Strict);
    let identity = IdentityService::new(
        Arc::new(AccountDirectory::with_accounts(staff_accounts())),
        Arc::new(MemorySessionStore::default()),
        events,
    );
    Arc::new(AdmissionsApi {
        admissions,
        identity,
        email_domain: "ism.sn".to_string(),
    })
}

pub(super) fn router_with_api(api: Arc<TestApi>) -> Router {
    admissions_router(api)
}

pub(super) async fn read_json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Repository whose backing store is always down.
pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _pending: PendingApplication) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn import(&self, _record: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn update(&self, _record: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }

    fn snapshot(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("offline".to_string()))
    }
}
