//! Spreadsheet exports of the application list.
//!
//! Files are UTF-8 with a byte-order mark so Excel picks the right encoding,
//! and every cell is quoted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::domain::Application;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const ALL_SCHOOLS: &str = "toutes_ecoles";

const OPERATIONAL_HEADER: [&str; 12] = [
    "Numero",
    "Nom",
    "Prenom",
    "Sexe",
    "Date Naissance",
    "Email",
    "Telephone",
    "Ecole",
    "Classe",
    "Niveau",
    "Statut",
    "Date Admission",
];

const SUPERVISORY_HEADER: [&str; 19] = [
    "Numero",
    "Nom",
    "Prenom",
    "Sexe",
    "Date Naissance",
    "Lieu Naissance",
    "Nationalite",
    "Email",
    "Telephone",
    "Telephone Parent",
    "Adresse",
    "Ecole",
    "Classe",
    "Niveau",
    "Statut",
    "Date Creation",
    "Date Mise a Jour",
    "Email ISM",
    "Carte Etudiant",
];

/// Column set for the audience of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportProfile {
    /// Directors and agents.
    #[default]
    Operational,
    /// Supervisors: every column including IT-issued identifiers.
    Supervisory,
}

impl ExportProfile {
    pub const fn file_prefix(self) -> &'static str {
        match self {
            ExportProfile::Operational => "admissions",
            ExportProfile::Supervisory => "rapport_complet",
        }
    }

    pub fn header(self) -> &'static [&'static str] {
        match self {
            ExportProfile::Operational => &OPERATIONAL_HEADER,
            ExportProfile::Supervisory => &SUPERVISORY_HEADER,
        }
    }

    fn row(self, record: &Application) -> Vec<String> {
        let applicant = &record.applicant;
        let contact = &record.contact;
        let program = &record.program;
        match self {
            ExportProfile::Operational => vec![
                record.number.clone(),
                applicant.last_name.clone(),
                applicant.first_name.clone(),
                applicant.sex.code().to_string(),
                applicant.birth_date.to_string(),
                contact.email.clone(),
                contact.phone.clone(),
                program.school.clone(),
                program.class_name.clone(),
                program.level.code().to_string(),
                record.status.label().to_string(),
                french_date(record.updated_at),
            ],
            ExportProfile::Supervisory => vec![
                record.number.clone(),
                applicant.last_name.clone(),
                applicant.first_name.clone(),
                applicant.sex.code().to_string(),
                applicant.birth_date.to_string(),
                applicant.birth_place.clone(),
                applicant.nationality.clone(),
                contact.email.clone(),
                contact.phone.clone(),
                contact.parent_phone.clone(),
                contact.address.clone(),
                program.school.clone(),
                program.class_name.clone(),
                program.level.code().to_string(),
                record.status.label().to_string(),
                french_date(record.created_at),
                french_date(record.updated_at),
                record.it.institutional_email.clone().unwrap_or_default(),
                record.it.student_card_number.clone().unwrap_or_default(),
            ],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer flush failed: {0}")]
    Flush(String),
}

fn french_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d/%m/%Y").to_string()
}

/// Render the records as a BOM-prefixed CSV document.
pub fn render_csv(records: &[Application], profile: ExportProfile) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(profile.header())?;
    for record in records {
        writer.write_record(profile.row(record))?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))
}

/// Accents dropped and whitespace runs collapsed to `_` so the name is safe
/// in a `Content-Disposition` header.
fn file_scope(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            word.nfd()
                .filter(|c| !is_combining_mark(*c))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("_")
}

/// `<prefix>_<school or toutes_ecoles>_<YYYY-MM-DD>.csv`.
pub fn export_filename(profile: ExportProfile, school: Option<&str>, on: NaiveDate) -> String {
    let scope = match school {
        Some(name) if !name.trim().is_empty() => file_scope(name),
        _ => ALL_SCHOOLS.to_string(),
    };
    format!("{}_{}_{}.csv", profile.file_prefix(), scope, on.format("%Y-%m-%d"))
}
