use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use ism_admissions::config::AdmissionsConfig;
use ism_admissions::error::AppError;
use ism_admissions::workflows::admissions::{
    demo_applications, staff_accounts, AccountDirectory, AccountId, AdmissionsApi,
    AdmissionsService, ChangeBus, FileSessionStore, GradeSource, IdentityService,
    InMemoryApplicationRepository, MemorySessionStore, SessionError, SessionStore,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Session slot picked from configuration at startup.
#[derive(Debug)]
pub(crate) enum SessionBackend {
    Memory(MemorySessionStore),
    File(FileSessionStore),
}

impl SessionBackend {
    pub(crate) fn from_config(config: &AdmissionsConfig) -> Self {
        match &config.session_file {
            Some(path) => SessionBackend::File(FileSessionStore::new(path.clone())),
            None => SessionBackend::Memory(MemorySessionStore::default()),
        }
    }
}

impl SessionStore for SessionBackend {
    fn load(&self) -> Result<Option<AccountId>, SessionError> {
        match self {
            SessionBackend::Memory(store) => store.load(),
            SessionBackend::File(store) => store.load(),
        }
    }

    fn save(&self, account_id: &AccountId) -> Result<(), SessionError> {
        match self {
            SessionBackend::Memory(store) => store.save(account_id),
            SessionBackend::File(store) => store.save(account_id),
        }
    }

    fn clear(&self) -> Result<(), SessionError> {
        match self {
            SessionBackend::Memory(store) => store.clear(),
            SessionBackend::File(store) => store.clear(),
        }
    }
}

pub(crate) type ApiState<G> = AdmissionsApi<InMemoryApplicationRepository, G, SessionBackend>;

/// Wire the repository, directory and session slot around one change bus.
pub(crate) fn build_api<G>(config: &AdmissionsConfig, grades: G) -> Result<Arc<ApiState<G>>, AppError>
where
    G: GradeSource + 'static,
{
    let events = ChangeBus::new();
    let admissions = AdmissionsService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(grades),
        events.clone(),
        config.settings(),
    );

    if config.seed_demo {
        let seeded = admissions.import(demo_applications(config.intake_year)?)?;
        info!(seeded, "demo applications loaded");
    }

    let identity = IdentityService::new(
        Arc::new(AccountDirectory::with_accounts(staff_accounts())),
        Arc::new(SessionBackend::from_config(config)),
        events,
    );

    Ok(Arc::new(AdmissionsApi {
        admissions,
        identity,
        email_domain: config.email_domain.clone(),
    }))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ism_admissions::workflows::admissions::{ApplicationFilter, FixedGradeSource};

    #[test]
    fn seeded_api_holds_demo_files_and_staff() {
        let api = build_api(&AdmissionsConfig::default(), FixedGradeSource::new(12.0, "L2"))
            .expect("api builds");

        let records = api
            .admissions
            .list(&ApplicationFilter::default())
            .expect("list");
        assert_eq!(records.len(), 6);
        assert!(api
            .identity
            .authenticate("superviseur@ism.sn", "sup123")
            .expect("lookup")
            .is_some());
    }

    #[test]
    fn seeding_can_be_disabled() {
        let config = AdmissionsConfig {
            seed_demo: false,
            ..AdmissionsConfig::default()
        };
        let api = build_api(&config, FixedGradeSource::new(12.0, "L2")).expect("api builds");

        let stats = api.admissions.stats().expect("stats");
        assert_eq!(stats.total, 0);
    }

    #[test]
    fn session_backend_follows_config() {
        let memory = SessionBackend::from_config(&AdmissionsConfig::default());
        assert!(matches!(memory, SessionBackend::Memory(_)));

        let path = std::env::temp_dir().join("ism-admissions-api-session.json");
        let config = AdmissionsConfig {
            session_file: Some(path.clone()),
            ..AdmissionsConfig::default()
        };
        let file = SessionBackend::from_config(&config);
        file.save(&AccountId("4".to_string())).expect("save");
        assert_eq!(
            SessionBackend::from_config(&config).load().expect("load"),
            Some(AccountId("4".to_string()))
        );
        file.clear().expect("clear");
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert_eq!(
            parse_date(" 2026-02-03 "),
            Ok(NaiveDate::from_ymd_opt(2026, 2, 3).expect("valid"))
        );
        assert!(parse_date("03/02/2026").is_err());
    }
}
