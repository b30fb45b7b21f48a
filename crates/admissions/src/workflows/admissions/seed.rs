//! Staff accounts and demonstration files loaded at startup.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::credentials::DEFAULT_EMAIL_DOMAIN;
use super::domain::{
    Account, AccountId, Application, ApplicationId, ApplicationStatus, ContactDetails,
    DocumentSet, HistoryEntry, ItIssuedFields, Level, PersonalDetails, ProgramChoice, Role, Sex,
};
use super::repository::format_number;
use super::scoring::{PredictiveScore, ScoreBreakdown};

const AGENT_ID: &str = "2";
const DIRECTOR_ID: &str = "3";
const AGENT_NAME: &str = "Fatou Diallo";
const DIRECTOR_NAME: &str = "Moussa Ndiaye";
const IT_NAME: &str = "Ibrahima Fall";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed date '{value}' is malformed: {source}")]
    Malformed {
        value: &'static str,
        source: chrono::ParseError,
    },
}

fn staff(
    id: &str,
    email: &str,
    password: &str,
    last_name: &str,
    first_name: &str,
    role: Role,
    school: Option<&str>,
) -> Account {
    Account {
        id: AccountId(id.to_string()),
        email: email.to_string(),
        password: password.to_string(),
        last_name: last_name.to_string(),
        first_name: first_name.to_string(),
        role,
        school: school.map(str::to_string),
    }
}

/// One account per staff role.
pub fn staff_accounts() -> Vec<Account> {
    vec![
        staff("1", "admin@ism.sn", "admin123", "Admin", "System", Role::Admin, None),
        staff("2", "agent@ism.sn", "agent123", "Diallo", "Fatou", Role::Agent, None),
        staff(
            "3",
            "directeur@ism.sn",
            "dir123",
            "Ndiaye",
            "Moussa",
            Role::Director,
            Some("Ingénieurs"),
        ),
        staff("4", "superviseur@ism.sn", "sup123", "Sall", "Aminata", Role::Supervisor, None),
        staff("5", "it@ism.sn", "it123", "Fall", "Ibrahima", Role::It, None),
    ]
}

struct DemoFile {
    last_name: &'static str,
    first_name: &'static str,
    birth_date: &'static str,
    birth_place: &'static str,
    sex: Sex,
    phone: &'static str,
    parent_phone: &'static str,
    parent_relation: &'static str,
    email: &'static str,
    address: &'static str,
    school: &'static str,
    track: &'static str,
    class_name: &'static str,
    level: Level,
    documents: [Option<&'static str>; 4],
    breakdown: Option<[u8; 4]>,
    status: ApplicationStatus,
    created_at: &'static str,
    updated_at: &'static str,
    reviewed_by_agent: bool,
    reviewed_by_director: bool,
    history: &'static [(&'static str, &'static str, &'static str)],
}

const DEMO_FILES: [DemoFile; 6] = [
    DemoFile {
        last_name: "Diop",
        first_name: "Amadou",
        birth_date: "2005-03-15",
        birth_place: "Dakar",
        sex: Sex::M,
        phone: "+221 77 123 45 67",
        parent_phone: "+221 77 987 65 43",
        parent_relation: "Pere",
        email: "amadou.diop@gmail.com",
        address: "123 Rue Carnot, Dakar",
        school: "Ingénieurs",
        track: "Informatique",
        class_name: "Licence 1 Informatique",
        level: Level::L1,
        documents: [Some("/documents/cni-diop.pdf"), Some("/documents/bac-diop.pdf"), None, None],
        breakdown: None,
        status: ApplicationStatus::Submitted,
        created_at: "2026-01-28T10:30:00",
        updated_at: "2026-01-28T10:30:00",
        reviewed_by_agent: false,
        reviewed_by_director: false,
        history: &[],
    },
    DemoFile {
        last_name: "Faye",
        first_name: "Mariama",
        birth_date: "2004-07-22",
        birth_place: "Thiès",
        sex: Sex::F,
        phone: "+221 76 234 56 78",
        parent_phone: "+221 76 876 54 32",
        parent_relation: "Mere",
        email: "mariama.faye@outlook.com",
        address: "45 Avenue Lamine Gueye, Thiès",
        school: "Managements",
        track: "Gestion",
        class_name: "Licence 2 Gestion",
        level: Level::L2,
        documents: [
            Some("/documents/cni-faye.pdf"),
            Some("/documents/l1-faye.pdf"),
            Some("/documents/scolarite-faye.pdf"),
            None,
        ],
        breakdown: Some([50, 15, 0, 5]),
        status: ApplicationStatus::Verified,
        created_at: "2026-01-27T14:15:00",
        updated_at: "2026-01-28T09:00:00",
        reviewed_by_agent: true,
        reviewed_by_director: false,
        history: &[(
            "2026-01-28T09:00:00",
            AGENT_NAME,
            "Documents vérifiés et conformes",
        )],
    },
    DemoFile {
        last_name: "Sarr",
        first_name: "Ousmane",
        birth_date: "2003-11-08",
        birth_place: "Saint-Louis",
        sex: Sex::M,
        phone: "+221 78 345 67 89",
        parent_phone: "+221 78 765 43 21",
        parent_relation: "Tuteur",
        email: "ousmane.sarr@yahoo.fr",
        address: "78 Rue de la Corniche, Saint-Louis",
        school: "Managements",
        track: "Marketing",
        class_name: "Master 1 Marketing",
        level: Level::M1,
        documents: [
            Some("/documents/cni-sarr.pdf"),
            Some("/documents/licence-sarr.pdf"),
            Some("/documents/scolarite-sarr.pdf"),
            None,
        ],
        breakdown: Some([70, 15, 0, 5]),
        status: ApplicationStatus::Approved,
        created_at: "2026-01-26T11:45:00",
        updated_at: "2026-01-28T16:30:00",
        reviewed_by_agent: true,
        reviewed_by_director: true,
        history: &[
            ("2026-01-27T10:00:00", AGENT_NAME, "Dossier complet"),
            (
                "2026-01-28T16:30:00",
                DIRECTOR_NAME,
                "Candidature validée - Excellent profil",
            ),
        ],
    },
    DemoFile {
        last_name: "Ba",
        first_name: "Aissatou",
        birth_date: "2005-01-20",
        birth_place: "Ziguinchor",
        sex: Sex::F,
        phone: "+221 70 456 78 90",
        parent_phone: "+221 70 654 32 10",
        parent_relation: "Mere",
        email: "aissatou.ba@gmail.com",
        address: "12 Rue du Commerce, Ziguinchor",
        school: "Managements",
        track: "Finance",
        class_name: "Licence 1 Finance",
        level: Level::L1,
        documents: [Some("/documents/cni-ba.pdf"), None, None, None],
        breakdown: None,
        status: ApplicationStatus::NeedsCompletion,
        created_at: "2026-01-29T08:20:00",
        updated_at: "2026-01-29T15:00:00",
        reviewed_by_agent: true,
        reviewed_by_director: false,
        history: &[("2026-01-29T15:00:00", AGENT_NAME, "Document diplôme manquant")],
    },
    DemoFile {
        last_name: "Niang",
        first_name: "Modou",
        birth_date: "2002-05-12",
        birth_place: "Kaolack",
        sex: Sex::M,
        phone: "+221 77 567 89 01",
        parent_phone: "+221 77 543 21 09",
        parent_relation: "Pere",
        email: "modou.niang@gmail.com",
        address: "34 Avenue Senghor, Kaolack",
        school: "Ingénieurs",
        track: "Informatique",
        class_name: "Master 2 Informatique",
        level: Level::M2,
        documents: [
            Some("/documents/cni-niang.pdf"),
            Some("/documents/m1-niang.pdf"),
            Some("/documents/scolarite-niang.pdf"),
            Some("/documents/medical-niang.pdf"),
        ],
        breakdown: Some([70, 5, 0, 5]),
        status: ApplicationStatus::PendingIt,
        created_at: "2026-01-25T09:00:00",
        updated_at: "2026-01-29T11:00:00",
        reviewed_by_agent: true,
        reviewed_by_director: true,
        history: &[
            ("2026-01-26T10:00:00", AGENT_NAME, "Dossier complet et vérifié"),
            (
                "2026-01-27T14:00:00",
                DIRECTOR_NAME,
                "Excellente candidature, validée",
            ),
        ],
    },
    DemoFile {
        last_name: "Gueye",
        first_name: "Fatima",
        birth_date: "2004-09-30",
        birth_place: "Dakar",
        sex: Sex::F,
        phone: "+221 76 678 90 12",
        parent_phone: "+221 76 432 10 98",
        parent_relation: "Mere",
        email: "fatima.gueye@outlook.com",
        address: "56 Boulevard de la République, Dakar",
        school: "Ingénieurs",
        track: "Informatique",
        class_name: "Licence 3 Informatique",
        level: Level::L3,
        documents: [
            Some("/documents/cni-gueye.pdf"),
            Some("/documents/l2-gueye.pdf"),
            Some("/documents/scolarite-gueye.pdf"),
            None,
        ],
        breakdown: Some([50, 5, 0, 5]),
        status: ApplicationStatus::Completed,
        created_at: "2026-01-20T10:00:00",
        updated_at: "2026-01-28T17:00:00",
        reviewed_by_agent: true,
        reviewed_by_director: true,
        history: &[
            ("2026-01-21T09:00:00", AGENT_NAME, "Dossier vérifié"),
            ("2026-01-22T11:00:00", DIRECTOR_NAME, "Validée"),
            ("2026-01-28T17:00:00", IT_NAME, "Compte créé et carte générée"),
        ],
    },
];

fn timestamp(value: &'static str) -> Result<DateTime<Utc>, SeedError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|source| SeedError::Malformed { value, source })
}

fn date(value: &'static str) -> Result<NaiveDate, SeedError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|source| SeedError::Malformed { value, source })
}

fn owned(slot: Option<&'static str>) -> Option<String> {
    slot.map(str::to_string)
}

impl DemoFile {
    fn build(&self, sequence: usize, intake_year: i32) -> Result<Application, SeedError> {
        let history = self
            .history
            .iter()
            .map(|&(at, author, message)| {
                Ok(HistoryEntry {
                    date: timestamp(at)?,
                    author: author.to_string(),
                    message: message.to_string(),
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let number = format_number(intake_year, sequence);
        let it = if self.status == ApplicationStatus::Completed {
            let initials: String = [self.first_name, self.last_name]
                .iter()
                .filter_map(|name| name.chars().next())
                .collect();
            ItIssuedFields {
                institutional_email: Some(format!(
                    "{}.{}@{}",
                    self.first_name.to_lowercase(),
                    self.last_name.to_lowercase(),
                    DEFAULT_EMAIL_DOMAIN
                )),
                temporary_password: Some(format!("ISM{intake_year}{initials}")),
                student_card_number: Some(format!("ETU-{intake_year}-{sequence:04}")),
            }
        } else {
            ItIssuedFields::default()
        };

        let [identity_card, diploma, school_certificate, medical_certificate] = self.documents;

        Ok(Application {
            id: ApplicationId(format!("app-{sequence:06}")),
            number,
            version: 0,
            applicant: PersonalDetails {
                last_name: self.last_name.to_string(),
                first_name: self.first_name.to_string(),
                birth_date: date(self.birth_date)?,
                birth_place: self.birth_place.to_string(),
                sex: self.sex,
                nationality: "Sénégalaise".to_string(),
                photo: None,
            },
            contact: ContactDetails {
                phone: self.phone.to_string(),
                parent_phone: self.parent_phone.to_string(),
                parent_relation: Some(self.parent_relation.to_string()),
                email: self.email.to_string(),
                address: self.address.to_string(),
            },
            program: ProgramChoice {
                school: self.school.to_string(),
                track: Some(self.track.to_string()),
                class_name: self.class_name.to_string(),
                level: self.level,
            },
            documents: DocumentSet {
                identity_card: owned(identity_card),
                diploma: owned(diploma),
                school_certificate: owned(school_certificate),
                medical_certificate: owned(medical_certificate),
            },
            predictive_score: self.breakdown.map(|[academic, track, experience, speed]| {
                PredictiveScore::from_breakdown(ScoreBreakdown {
                    academic,
                    track,
                    experience,
                    speed,
                })
            }),
            alerts: Vec::new(),
            status: self.status,
            created_at: timestamp(self.created_at)?,
            updated_at: timestamp(self.updated_at)?,
            agent_id: self
                .reviewed_by_agent
                .then(|| AccountId(AGENT_ID.to_string())),
            director_id: self
                .reviewed_by_director
                .then(|| AccountId(DIRECTOR_ID.to_string())),
            history,
            it,
            candidate_id: None,
            recommended_stream: None,
        })
    }
}

/// Six files spread over every review stage, numbered from 1.
pub fn demo_applications(intake_year: i32) -> Result<Vec<Application>, SeedError> {
    DEMO_FILES
        .iter()
        .enumerate()
        .map(|(index, file)| file.build(index + 1, intake_year))
        .collect()
}
