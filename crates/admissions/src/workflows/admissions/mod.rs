//! Admission applications from submission to student account creation.
//!
//! The service owns the lifecycle rules and publishes a [`ChangeEvent`] after
//! every successful mutation. Identity and sessions live beside it so staff
//! and candidates share one directory.

pub mod catalog;
pub mod clock;
pub mod credentials;
pub mod domain;
pub mod events;
pub mod export;
pub mod grades;
pub mod identity;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod seed;
pub mod service;
pub mod session;
pub mod stats;

#[cfg(test)]
mod tests;

pub use catalog::{school_by_name, schools, School, SchoolClass};
pub use clock::{Clock, SystemClock};
pub use credentials::{propose_credentials, CredentialProposal, DEFAULT_EMAIL_DOMAIN};
pub use domain::{
    AcademicRecord, Account, AccountId, Application, ApplicationDraft, ApplicationFilter,
    ApplicationId, ApplicationStatus, ContactDetails, DocumentSet, ExtraFields, HistoryEntry,
    ItIssuedFields, Level, PersonalDetails, ProgramChoice, Role, Sex,
};
pub use events::{ChangeBus, ChangeEvent, Subscription};
pub use export::{export_filename, render_csv, ExportError, ExportProfile};
pub use grades::{FixedGradeSource, GradeSource, RandomGradeSource, SyntheticGrades};
pub use identity::{AccountDirectory, CandidateRegistration, IdentityError, IdentityService};
pub use lifecycle::{TransitionCheck, TransitionPolicy};
pub use repository::{
    format_number, ApplicationRepository, InMemoryApplicationRepository, RepositoryError,
};
pub use router::{admissions_router, AdmissionsApi};
pub use scoring::{compute_score, recommend_stream, PredictiveScore, ScoreColor, ScoreRequest};
pub use service::{
    AdmissionsError, AdmissionsService, AdmissionsSettings, StatusChange, DEFAULT_INTAKE_YEAR,
};
pub use session::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};
pub use seed::{demo_applications, staff_accounts, SeedError};
pub use stats::AdmissionStats;
