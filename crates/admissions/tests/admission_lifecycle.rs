//! End-to-end admission scenarios driven through the public service facade.

mod common {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use ism_admissions::workflows::admissions::{
        AccountDirectory, AdmissionsService, AdmissionsSettings, ApplicationDraft, ChangeBus,
        ContactDetails, DocumentSet, FixedGradeSource, IdentityService,
        InMemoryApplicationRepository, Level, MemorySessionStore, PersonalDetails,
        ProgramChoice, Sex, TransitionPolicy,
    };
    use ism_admissions::workflows::admissions::seed::staff_accounts;

    pub(super) type Service = AdmissionsService<InMemoryApplicationRepository, FixedGradeSource>;

    pub(super) fn services(
        policy: TransitionPolicy,
    ) -> (Service, IdentityService<MemorySessionStore>, ChangeBus) {
        let events = ChangeBus::new();
        let admissions = AdmissionsService::new(
            Arc::new(InMemoryApplicationRepository::default()),
            Arc::new(FixedGradeSource::new(13.5, "S1")),
            events.clone(),
            AdmissionsSettings {
                intake_year: 2026,
                transition_policy: policy,
            },
        );
        let identity = IdentityService::new(
            Arc::new(AccountDirectory::with_accounts(staff_accounts())),
            Arc::new(MemorySessionStore::default()),
            events.clone(),
        );
        (admissions, identity, events)
    }

    pub(super) fn draft() -> ApplicationDraft {
        ApplicationDraft {
            applicant: PersonalDetails {
                last_name: "Ndour".to_string(),
                first_name: "Adama".to_string(),
                birth_date: NaiveDate::from_ymd_opt(2005, 12, 9).expect("valid date"),
                birth_place: "Rufisque".to_string(),
                sex: Sex::M,
                nationality: "Sénégalaise".to_string(),
                photo: None,
            },
            contact: ContactDetails {
                phone: "+221 78 111 22 33".to_string(),
                parent_phone: "+221 78 444 55 66".to_string(),
                parent_relation: Some("Pere".to_string()),
                email: "adama.ndour@gmail.com".to_string(),
                address: "Cité Keur Gorgui, Dakar".to_string(),
            },
            program: ProgramChoice {
                school: "Ingénieurs".to_string(),
                track: Some("Informatique".to_string()),
                class_name: "Licence 1 Informatique".to_string(),
                level: Level::L1,
            },
            documents: DocumentSet {
                identity_card: Some("/documents/cni-ndour.pdf".to_string()),
                diploma: Some("/documents/bac-ndour.pdf".to_string()),
                ..DocumentSet::default()
            },
            predictive_score: None,
            academic_record: None,
            alerts: Vec::new(),
            candidate_id: None,
            recommended_stream: None,
        }
    }
}

use common::*;
use ism_admissions::workflows::admissions::{
    propose_credentials, AccountId, AdmissionsError, ApplicationFilter, ApplicationId, ApplicationStatus,
    CandidateRegistration, ChangeEvent, ExtraFields, IdentityError, StatusChange,
    TransitionPolicy,
};

#[test]
fn candidate_file_travels_from_submission_to_student_account() {
    let (admissions, identity, events) = services(TransitionPolicy::Strict);
    let mut subscription = events.subscribe();

    let candidate = identity
        .register_candidate(CandidateRegistration {
            email: "adama.ndour@gmail.com".to_string(),
            password: "motdepasse".to_string(),
            last_name: "Ndour".to_string(),
            first_name: "Adama".to_string(),
        })
        .expect("registration");

    let mut submission = draft();
    submission.candidate_id = Some(candidate.id.clone());
    let created = admissions.create(submission).expect("create");
    assert_eq!(created.number, "ISM-2026-0001");
    assert_eq!(created.status, ApplicationStatus::Submitted);

    let agent = identity
        .authenticate("agent@ism.sn", "agent123")
        .expect("lookup")
        .expect("agent logs in");
    admissions
        .update_status(
            &created.id,
            StatusChange::new(ApplicationStatus::Verified, agent.id.clone(), agent.display_name())
                .comment("Pièces vérifiées")
                .extra(ExtraFields {
                    agent_id: Some(agent.id.clone()),
                    ..ExtraFields::default()
                }),
        )
        .expect("verify")
        .expect("exists");

    let director = identity
        .authenticate("directeur@ism.sn", "dir123")
        .expect("lookup")
        .expect("director logs in");
    admissions
        .update_status(
            &created.id,
            StatusChange::new(
                ApplicationStatus::PendingIt,
                director.id.clone(),
                director.display_name(),
            )
            .comment("Admis, transmis à l'IT")
            .extra(ExtraFields {
                director_id: Some(director.id.clone()),
                ..ExtraFields::default()
            }),
        )
        .expect("approve")
        .expect("exists");

    let it = identity
        .authenticate("it@ism.sn", "it123")
        .expect("lookup")
        .expect("it logs in");
    let pending = admissions
        .get(&created.id)
        .expect("get")
        .expect("exists");
    let proposal = propose_credentials(&pending, 2026, "ism.sn");
    assert_eq!(proposal.institutional_email, "adama.ndour@ism.sn");
    assert_eq!(proposal.temporary_password, "ISM2026ND");
    assert_eq!(proposal.student_card_number, "ETU-2026-0001");

    let completed = admissions
        .update_status(
            &created.id,
            StatusChange::new(ApplicationStatus::Completed, it.id.clone(), it.display_name())
                .comment("Compte créé et carte générée")
                .extra(ExtraFields {
                    institutional_email: Some(proposal.institutional_email.clone()),
                    temporary_password: Some(proposal.temporary_password.clone()),
                    student_card_number: Some(proposal.student_card_number.clone()),
                    ..ExtraFields::default()
                }),
        )
        .expect("complete")
        .expect("exists");

    assert_eq!(completed.status, ApplicationStatus::Completed);
    assert_eq!(completed.history.len(), 3);
    assert_eq!(completed.history[2].author, "Ibrahima Fall");
    assert_eq!(completed.agent_id, Some(agent.id));
    assert_eq!(completed.director_id, Some(director.id));
    assert!(completed.it.is_complete());

    let mine = admissions.by_candidate(&candidate.id).expect("lookup");
    assert_eq!(mine, vec![completed.clone()]);

    let transitions: Vec<(ApplicationStatus, ApplicationStatus)> = subscription
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            ChangeEvent::StatusChanged { from, to, .. } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (ApplicationStatus::Submitted, ApplicationStatus::Verified),
            (ApplicationStatus::Verified, ApplicationStatus::PendingIt),
            (ApplicationStatus::PendingIt, ApplicationStatus::Completed),
        ]
    );

    let stats = admissions.stats().expect("stats");
    assert_eq!(stats.count(ApplicationStatus::Completed), 1);
    assert_eq!(stats.validation_rate, 100);
}

#[test]
fn incomplete_file_returns_to_review_after_documents_arrive() {
    let (admissions, _, _) = services(TransitionPolicy::Strict);
    let created = admissions.create(draft()).expect("create");

    let incomplete = admissions
        .update_status(
            &created.id,
            StatusChange::new(
                ApplicationStatus::NeedsCompletion,
                AccountId("2".to_string()),
                "Fatou Diallo",
            )
            .comment("Certificat médical manquant"),
        )
        .expect("flag incomplete")
        .expect("exists");
    assert_eq!(incomplete.status, ApplicationStatus::NeedsCompletion);

    let resubmitted = admissions
        .update_status(
            &created.id,
            StatusChange::new(
                ApplicationStatus::UnderReview,
                AccountId("2".to_string()),
                "Fatou Diallo",
            ),
        )
        .expect("back to review")
        .expect("exists");
    assert_eq!(resubmitted.status, ApplicationStatus::UnderReview);
    assert_eq!(resubmitted.history.len(), 1);
}

#[test]
fn unknown_application_update_changes_nothing() {
    let (admissions, _, events) = services(TransitionPolicy::Strict);
    admissions.create(draft()).expect("create");
    let before = admissions.list(&ApplicationFilter::default()).expect("list");
    let mut subscription = events.subscribe();

    let outcome = admissions
        .update_status(
            &ApplicationId("missing".to_string()),
            StatusChange::new(
                ApplicationStatus::Rejected,
                AccountId("3".to_string()),
                "Moussa Ndiaye",
            ),
        )
        .expect("no error");

    assert!(outcome.is_none());
    assert!(subscription.try_next().is_none());
    assert_eq!(
        admissions.list(&ApplicationFilter::default()).expect("list"),
        before
    );
}

#[test]
fn policies_differ_on_skipped_review() {
    let (strict, _, _) = services(TransitionPolicy::Strict);
    let created = strict.create(draft()).expect("create");
    let err = strict
        .update_status(
            &created.id,
            StatusChange::new(
                ApplicationStatus::Approved,
                AccountId("3".to_string()),
                "Moussa Ndiaye",
            ),
        )
        .expect_err("verification skipped");
    assert!(matches!(err, AdmissionsError::InvalidTransition { .. }));

    let (permissive, _, _) = services(TransitionPolicy::Permissive);
    let created = permissive.create(draft()).expect("create");
    let approved = permissive
        .update_status(
            &created.id,
            StatusChange::new(
                ApplicationStatus::Approved,
                AccountId("3".to_string()),
                "Moussa Ndiaye",
            ),
        )
        .expect("tolerated")
        .expect("exists");
    assert_eq!(approved.status, ApplicationStatus::Approved);
}

#[test]
fn a_second_account_cannot_reuse_an_email() {
    let (_, identity, _) = services(TransitionPolicy::Strict);
    let registration = CandidateRegistration {
        email: "adama.ndour@gmail.com".to_string(),
        password: "one".to_string(),
        last_name: "Ndour".to_string(),
        first_name: "Adama".to_string(),
    };
    identity
        .register_candidate(registration.clone())
        .expect("first registration");

    let err = identity
        .register_candidate(registration)
        .expect_err("duplicate email");
    assert!(matches!(err, IdentityError::DuplicateEmail(_)));
}
