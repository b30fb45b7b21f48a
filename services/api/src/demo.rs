use std::fs;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use ism_admissions::config::{AdmissionsConfig, AppConfig};
use ism_admissions::error::AppError;
use ism_admissions::workflows::admissions::{
    compute_score, export_filename, propose_credentials, recommend_stream, render_csv,
    AcademicRecord, Account, AccountDirectory, AdmissionsService,
    Application, ApplicationDraft, ApplicationFilter, ApplicationStatus, CandidateRegistration,
    ChangeBus, ContactDetails, DocumentSet, ExtraFields, IdentityService,
    InMemoryApplicationRepository, Level, MemorySessionStore, PersonalDetails, ProgramChoice,
    RandomGradeSource, ScoreRequest, Sex, StatusChange,
};
use ism_admissions::workflows::admissions::seed::staff_accounts;

use crate::cli::{DemoArgs, ExportArgs, ScoreArgs};
use crate::infra::build_api;

fn demo_draft(args: &DemoArgs) -> ApplicationDraft {
    ApplicationDraft {
        applicant: PersonalDetails {
            last_name: "Sène".to_string(),
            first_name: "Ndèye Awa".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2006, 6, 14).unwrap_or_default(),
            birth_place: "Mbour".to_string(),
            sex: Sex::F,
            nationality: "Sénégalaise".to_string(),
            photo: None,
        },
        contact: ContactDetails {
            phone: "+221 77 210 43 65".to_string(),
            parent_phone: "+221 77 890 12 34".to_string(),
            parent_relation: Some("Mere".to_string()),
            email: "ndeyeawa.sene@gmail.com".to_string(),
            address: "Quartier Escale, Mbour".to_string(),
        },
        program: ProgramChoice {
            school: "Ingénieurs".to_string(),
            track: Some("Informatique".to_string()),
            class_name: "Licence 1 Informatique".to_string(),
            level: Level::L1,
        },
        documents: DocumentSet {
            identity_card: Some("/documents/cni-sene.pdf".to_string()),
            diploma: Some("/documents/bac-sene.pdf".to_string()),
            school_certificate: None,
            medical_certificate: None,
        },
        predictive_score: None,
        academic_record: args.average.map(|average| AcademicRecord {
            average,
            track: args.track.clone(),
            experience_years: 0.0,
        }),
        alerts: Vec::new(),
        candidate_id: None,
        recommended_stream: None,
    }
}

fn staff_member(
    identity: &IdentityService<MemorySessionStore>,
    email: &str,
    password: &str,
) -> Result<Option<Account>, AppError> {
    Ok(identity.authenticate(email, password)?)
}

fn print_record(record: &Application) {
    println!(
        "  {} [{}] {} -> {}",
        record.number,
        record.id,
        record.full_name(),
        record.status
    );
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?.admissions;
    walkthrough(&config, &args)?;
    Ok(())
}

/// Runs one file from registration to student account and returns the
/// closed record, or `None` when a staff login is refused.
fn walkthrough(
    config: &AdmissionsConfig,
    args: &DemoArgs,
) -> Result<Option<Application>, AppError> {
    let events = ChangeBus::new();
    let mut subscription = events.subscribe();
    let settings = config.settings();
    let admissions = AdmissionsService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(RandomGradeSource),
        events.clone(),
        settings,
    );
    let identity = IdentityService::new(
        Arc::new(AccountDirectory::with_accounts(staff_accounts())),
        Arc::new(MemorySessionStore::default()),
        events,
    );

    println!(
        "ISM admissions walkthrough (intake {}, {:?} transitions)",
        settings.intake_year, settings.transition_policy
    );

    let candidate = identity.register_candidate(CandidateRegistration {
        email: "ndeyeawa.sene@gmail.com".to_string(),
        password: "candidat2026".to_string(),
        last_name: "Sène".to_string(),
        first_name: "Ndèye Awa".to_string(),
    })?;
    println!("- Candidate registered as {}", candidate.id);

    let mut draft = demo_draft(args);
    draft.candidate_id = Some(candidate.id.clone());
    let record = admissions.create(draft)?;
    print_record(&record);
    if let Some(score) = &record.predictive_score {
        println!(
            "  Predictive score {} ({}) | recommended stream {}",
            score.score,
            score.label,
            record.recommended_stream.as_deref().unwrap_or("-")
        );
    }

    let steps = [
        (
            "agent@ism.sn",
            "agent123",
            ApplicationStatus::Verified,
            "Pièces conformes",
        ),
        (
            "directeur@ism.sn",
            "dir123",
            ApplicationStatus::PendingIt,
            "Admission validée, transmis à l'IT",
        ),
    ];
    for (email, password, status, comment) in steps {
        let Some(actor) = staff_member(&identity, email, password)? else {
            println!("  Login refused for {email}");
            return Ok(None);
        };
        let mut extra = ExtraFields::default();
        match status {
            ApplicationStatus::Verified => extra.agent_id = Some(actor.id.clone()),
            _ => extra.director_id = Some(actor.id.clone()),
        }
        let change = StatusChange::new(status, actor.id.clone(), actor.display_name())
            .comment(comment)
            .extra(extra);
        if let Some(updated) = admissions.update_status(&record.id, change)? {
            print_record(&updated);
        }
    }

    let Some(it) = staff_member(&identity, "it@ism.sn", "it123")? else {
        println!("  Login refused for it@ism.sn");
        return Ok(None);
    };
    let Some(pending) = admissions.get(&record.id)? else {
        return Ok(None);
    };
    let proposal = propose_credentials(&pending, settings.intake_year, &config.email_domain);
    let change = StatusChange::new(ApplicationStatus::Completed, it.id.clone(), it.display_name())
        .comment("Compte créé et carte générée")
        .extra(ExtraFields {
            institutional_email: Some(proposal.institutional_email.clone()),
            temporary_password: Some(proposal.temporary_password.clone()),
            student_card_number: Some(proposal.student_card_number.clone()),
            ..ExtraFields::default()
        });
    let Some(completed) = admissions.update_status(&record.id, change)? else {
        return Ok(None);
    };
    print_record(&completed);
    println!(
        "  Student account {} | card {}",
        proposal.institutional_email, proposal.student_card_number
    );

    println!("\nReview trail");
    for entry in &completed.history {
        println!(
            "- {} {}: {}",
            entry.date.format("%d/%m/%Y %H:%M"),
            entry.author,
            entry.message
        );
    }

    println!("\nChange notifications");
    for event in subscription.drain() {
        println!("- {event:?}");
    }

    let it_name = it.display_name();
    let reopened = admissions.update_status(
        &record.id,
        StatusChange::new(ApplicationStatus::Verified, it.id, it_name),
    );
    match reopened {
        Err(err) => println!("\nClosed files stay closed: {err}"),
        Ok(_) => println!("\nPermissive transitions let the closed file reopen"),
    }

    Ok(Some(completed))
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let submitted_on = args
        .submitted_on
        .unwrap_or_else(|| Utc::now().date_naive());
    let mut request = ScoreRequest::new(args.average, &args.track, submitted_on);
    if args.graduate {
        request = request.graduate(args.experience_years);
    }

    let score = compute_score(&request);
    let breakdown = score.breakdown;
    println!("Predictive score: {}/100 ({})", score.score, score.label);
    println!("- academic   {}", breakdown.academic);
    println!("- track      {}", breakdown.track);
    println!("- experience {}", breakdown.experience);
    println!("- speed      {}", breakdown.speed);
    println!(
        "Recommended stream: {}",
        recommend_stream(Some(&score), Some(&args.track))
    );
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AdmissionsConfig {
        seed_demo: true,
        session_file: None,
        ..AppConfig::load()?.admissions
    };
    let api = build_api(&config, RandomGradeSource)?;

    let filter = ApplicationFilter {
        status: args.status,
        school: args.school.filter(|school| !school.trim().is_empty()),
        level: None,
    };
    let records = api.admissions.list(&filter)?;
    let body = render_csv(&records, args.profile)?;

    let filename = export_filename(
        args.profile,
        filter.school.as_deref(),
        Utc::now().date_naive(),
    );
    fs::create_dir_all(&args.output_dir)?;
    let path = args.output_dir.join(filename);
    fs::write(&path, body)?;

    println!("Exported {} applications to {}", records.len(), path.display());
    Ok(())
}
