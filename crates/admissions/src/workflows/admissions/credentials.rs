use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::domain::Application;

pub const DEFAULT_EMAIL_DOMAIN: &str = "ism.sn";

/// Student account details IT is about to issue for an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProposal {
    pub institutional_email: String,
    pub temporary_password: String,
    pub student_card_number: String,
}

/// Lowercase, strip accents and drop whitespace.
fn email_part(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c) && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fields already issued on the record win over generated ones.
pub fn propose_credentials(
    record: &Application,
    intake_year: i32,
    email_domain: &str,
) -> CredentialProposal {
    let applicant = &record.applicant;

    let institutional_email = record.it.institutional_email.clone().unwrap_or_else(|| {
        format!(
            "{}.{}@{}",
            email_part(&applicant.first_name),
            email_part(&applicant.last_name),
            email_domain
        )
    });

    let temporary_password = record.it.temporary_password.clone().unwrap_or_else(|| {
        let initials: String = applicant
            .last_name
            .chars()
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        format!("ISM{intake_year}{initials}")
    });

    let student_card_number = record
        .it
        .student_card_number
        .clone()
        .unwrap_or_else(|| format!("ETU-{intake_year}-{}", record.sequence_part()));

    CredentialProposal {
        institutional_email,
        temporary_password,
        student_card_number,
    }
}
