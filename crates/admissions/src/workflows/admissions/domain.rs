use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::PredictiveScore;

/// Identifier wrapper for admission applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for directory accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of roles interacting with the admissions workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(rename = "candidat")]
    Candidate,
    Agent,
    #[serde(rename = "directeur")]
    Director,
    #[serde(rename = "superviseur")]
    Supervisor,
    It,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Candidate => "candidat",
            Role::Agent => "agent",
            Role::Director => "directeur",
            Role::Supervisor => "superviseur",
            Role::It => "it",
            Role::Admin => "admin",
        }
    }
}

/// Registered person. The password is opaque and compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub last_name: String,
    pub first_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
}

impl Account {
    /// Name recorded as the author of history entries.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Review pipeline stage of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "brouillon", alias = "draft")]
    Draft,
    #[serde(rename = "soumise")]
    Submitted,
    #[serde(rename = "en_verification")]
    UnderReview,
    #[serde(rename = "a_completer")]
    NeedsCompletion,
    #[serde(rename = "verifiee")]
    Verified,
    #[serde(rename = "validee")]
    Approved,
    #[serde(rename = "rejetee")]
    Rejected,
    #[serde(rename = "en_attente_it")]
    PendingIt,
    #[serde(rename = "complete")]
    Completed,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 9] = [
        ApplicationStatus::Draft,
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderReview,
        ApplicationStatus::NeedsCompletion,
        ApplicationStatus::Verified,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::PendingIt,
        ApplicationStatus::Completed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "brouillon",
            ApplicationStatus::Submitted => "soumise",
            ApplicationStatus::UnderReview => "en_verification",
            ApplicationStatus::NeedsCompletion => "a_completer",
            ApplicationStatus::Verified => "verifiee",
            ApplicationStatus::Approved => "validee",
            ApplicationStatus::Rejected => "rejetee",
            ApplicationStatus::PendingIt => "en_attente_it",
            ApplicationStatus::Completed => "complete",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized == "draft" {
            return Ok(ApplicationStatus::Draft);
        }
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

/// Degree level code of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    L1,
    L2,
    L3,
    M1,
    M2,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::L1, Level::L2, Level::L3, Level::M1, Level::M2];

    pub const fn code(self) -> &'static str {
        match self {
            Level::L1 => "L1",
            Level::L2 => "L2",
            Level::L3 => "L3",
            Level::M1 => "M1",
            Level::M2 => "M2",
        }
    }

    pub const fn is_graduate(self) -> bool {
        matches!(self, Level::M1 | Level::M2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    pub const fn code(self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub last_name: String,
    pub first_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub sex: Sex,
    pub nationality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub phone: String,
    pub parent_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_relation: Option<String>,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramChoice {
    pub school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    pub class_name: String,
    pub level: Level,
}

/// Four named document slots holding opaque references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_card: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diploma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_certificate: Option<String>,
}

impl DocumentSet {
    /// Fill the slots present in `other`, leaving the rest untouched.
    pub fn merge(&mut self, other: DocumentSet) {
        if other.identity_card.is_some() {
            self.identity_card = other.identity_card;
        }
        if other.diploma.is_some() {
            self.diploma = other.diploma;
        }
        if other.school_certificate.is_some() {
            self.school_certificate = other.school_certificate;
        }
        if other.medical_certificate.is_some() {
            self.medical_certificate = other.medical_certificate;
        }
    }

    pub fn provided(&self) -> usize {
        [
            &self.identity_card,
            &self.diploma,
            &self.school_certificate,
            &self.medical_certificate,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }
}

/// Authored note appended on a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub author: String,
    pub message: String,
}

/// Fields issued by IT when the student account is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItIssuedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institutional_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_card_number: Option<String>,
}

impl ItIssuedFields {
    pub fn is_complete(&self) -> bool {
        self.institutional_email.is_some()
            && self.temporary_password.is_some()
            && self.student_card_number.is_some()
    }
}

/// Grades known for the applicant (e.g. read from a transcript).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicRecord {
    pub average: f64,
    pub track: String,
    #[serde(default)]
    pub experience_years: f64,
}

/// Caller-provided fields for a new application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub applicant: PersonalDetails,
    pub contact: ContactDetails,
    pub program: ProgramChoice,
    #[serde(default)]
    pub documents: DocumentSet,
    #[serde(default)]
    pub predictive_score: Option<PredictiveScore>,
    #[serde(default)]
    pub academic_record: Option<AcademicRecord>,
    #[serde(default)]
    pub alerts: Vec<String>,
    #[serde(default)]
    pub candidate_id: Option<AccountId>,
    #[serde(default)]
    pub recommended_stream: Option<String>,
}

/// One admission case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub number: String,
    pub version: u64,
    pub applicant: PersonalDetails,
    pub contact: ContactDetails,
    pub program: ProgramChoice,
    pub documents: DocumentSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictive_score: Option<PredictiveScore>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director_id: Option<AccountId>,
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub it: ItIssuedFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_stream: Option<String>,
}

impl Application {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.applicant.first_name, self.applicant.last_name)
    }

    /// Trailing sequence part of the number (`0007` for `ISM-2026-0007`).
    pub fn sequence_part(&self) -> &str {
        self.number.rsplit('-').next().unwrap_or(&self.number)
    }
}

/// Extra fields shallow-merged onto a record during a status update.
///
/// The French keys used by the staff dashboards are accepted as aliases.
/// Any other key is refused rather than dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtraFields {
    #[serde(default)]
    pub agent_id: Option<AccountId>,
    #[serde(default, alias = "directeurId")]
    pub director_id: Option<AccountId>,
    #[serde(default)]
    pub documents: Option<DocumentSet>,
    #[serde(default, alias = "emailISM")]
    pub institutional_email: Option<String>,
    #[serde(default, alias = "motDePasseTemp")]
    pub temporary_password: Option<String>,
    #[serde(default, alias = "numeroCarteEtudiant")]
    pub student_card_number: Option<String>,
    #[serde(default)]
    pub alerts: Option<Vec<String>>,
    #[serde(default)]
    pub recommended_stream: Option<String>,
}

impl ExtraFields {
    pub fn apply(self, record: &mut Application) {
        if let Some(agent_id) = self.agent_id {
            record.agent_id = Some(agent_id);
        }
        if let Some(director_id) = self.director_id {
            record.director_id = Some(director_id);
        }
        if let Some(documents) = self.documents {
            record.documents.merge(documents);
        }
        if let Some(email) = self.institutional_email {
            record.it.institutional_email = Some(email);
        }
        if let Some(password) = self.temporary_password {
            record.it.temporary_password = Some(password);
        }
        if let Some(card) = self.student_card_number {
            record.it.student_card_number = Some(card);
        }
        if let Some(alerts) = self.alerts {
            record.alerts = alerts;
        }
        if let Some(stream) = self.recommended_stream {
            record.recommended_stream = Some(stream);
        }
    }
}

/// Exact-match filters combined with AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub level: Option<Level>,
}

impl ApplicationFilter {
    pub fn with_status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &Application) -> bool {
        self.status.map_or(true, |status| record.status == status)
            && self
                .school
                .as_deref()
                .map_or(true, |school| record.program.school == school)
            && self.level.map_or(true, |level| record.program.level == level)
    }
}
