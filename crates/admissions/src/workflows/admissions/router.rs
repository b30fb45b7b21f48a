use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::AppError;

use super::catalog::schools;
use super::credentials::propose_credentials;
use super::domain::{
    AccountId, ApplicationDraft, ApplicationFilter, ApplicationId, ApplicationStatus,
    ExtraFields, Level,
};
use super::export::{export_filename, render_csv, ExportProfile};
use super::grades::GradeSource;
use super::identity::{CandidateRegistration, IdentityError, IdentityService};
use super::repository::ApplicationRepository;
use super::service::{AdmissionsError, AdmissionsService, StatusChange};
use super::session::SessionStore;

/// Everything the HTTP handlers need, shared behind one `Arc`.
pub struct AdmissionsApi<R, G, S> {
    pub admissions: AdmissionsService<R, G>,
    pub identity: IdentityService<S>,
    pub email_domain: String,
}

/// Router builder exposing the admissions and identity endpoints.
pub fn admissions_router<R, G, S>(api: Arc<AdmissionsApi<R, G, S>>) -> Router
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(create_handler::<R, G, S>).get(list_handler::<R, G, S>),
        )
        .route("/api/v1/applications/:id", get(get_handler::<R, G, S>))
        .route(
            "/api/v1/applications/:id/status",
            patch(update_status_handler::<R, G, S>),
        )
        .route(
            "/api/v1/applications/:id/credentials",
            get(credentials_handler::<R, G, S>),
        )
        .route(
            "/api/v1/candidates/:id/applications",
            get(candidate_applications_handler::<R, G, S>),
        )
        .route("/api/v1/stats", get(stats_handler::<R, G, S>))
        .route("/api/v1/schools", get(schools_handler))
        .route(
            "/api/v1/exports/applications.csv",
            get(export_handler::<R, G, S>),
        )
        .route("/api/v1/auth/login", post(login_handler::<R, G, S>))
        .route("/api/v1/auth/register", post(register_handler::<R, G, S>))
        .route("/api/v1/auth/logout", post(logout_handler::<R, G, S>))
        .route("/api/v1/auth/session", get(session_handler::<R, G, S>))
        .with_state(api)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusUpdateRequest {
    pub(crate) status: ApplicationStatus,
    pub(crate) actor_id: AccountId,
    pub(crate) actor_name: String,
    #[serde(default)]
    pub(crate) comment: Option<String>,
    #[serde(default)]
    pub(crate) extra: Option<ExtraFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterRequest {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) last_name: String,
    pub(crate) first_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportQuery {
    #[serde(default)]
    pub(crate) profile: ExportProfile,
    #[serde(default)]
    pub(crate) school: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<ApplicationStatus>,
    #[serde(default)]
    pub(crate) level: Option<Level>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

fn admissions_failure(err: AdmissionsError) -> Response {
    AppError::from(err).into_response()
}

fn identity_failure(err: IdentityError) -> Response {
    AppError::from(err).into_response()
}

fn not_found(id: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("application {id} not found"))
}

fn normalize(mut filter: ApplicationFilter) -> ApplicationFilter {
    filter.school = filter.school.filter(|school| !school.trim().is_empty());
    filter
}

pub(crate) async fn create_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Json(draft): Json<ApplicationDraft>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.admissions.create(draft) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => admissions_failure(err),
    }
}

pub(crate) async fn list_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Query(filter): Query<ApplicationFilter>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.admissions.list(&normalize(filter)) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => admissions_failure(err),
    }
}

pub(crate) async fn get_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Path(id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.admissions.get(&ApplicationId(id.clone())) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => not_found(&id),
        Err(err) => admissions_failure(err),
    }
}

pub(crate) async fn update_status_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    let change = StatusChange {
        status: request.status,
        actor_id: request.actor_id,
        actor_name: request.actor_name,
        comment: request.comment,
        extra: request.extra,
    };

    match api
        .admissions
        .update_status(&ApplicationId(id.clone()), change)
    {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => not_found(&id),
        Err(err) => admissions_failure(err),
    }
}

pub(crate) async fn credentials_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Path(id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.admissions.get(&ApplicationId(id.clone())) {
        Ok(Some(record)) => {
            let proposal = propose_credentials(
                &record,
                api.admissions.settings().intake_year,
                &api.email_domain,
            );
            (StatusCode::OK, Json(proposal)).into_response()
        }
        Ok(None) => not_found(&id),
        Err(err) => admissions_failure(err),
    }
}

pub(crate) async fn candidate_applications_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Path(candidate_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.admissions.by_candidate(&AccountId(candidate_id)) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => admissions_failure(err),
    }
}

pub(crate) async fn stats_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.admissions.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => admissions_failure(err),
    }
}

pub(crate) async fn schools_handler() -> Response {
    (StatusCode::OK, Json(schools())).into_response()
}

pub(crate) async fn export_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Query(query): Query<ExportQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    let filter = normalize(ApplicationFilter {
        status: query.status,
        school: query.school,
        level: query.level,
    });

    let records = match api.admissions.list(&filter) {
        Ok(records) => records,
        Err(err) => return admissions_failure(err),
    };

    let body = match render_csv(&records, query.profile) {
        Ok(body) => body,
        Err(err) => {
            error!(error = %err, "csv export failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
        }
    };

    let filename = export_filename(
        query.profile,
        filter.school.as_deref(),
        Utc::now().date_naive(),
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

pub(crate) async fn login_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.identity.authenticate(&request.email, &request.password) {
        Ok(Some(account)) => (StatusCode::OK, Json(account)).into_response(),
        Ok(None) => error_response(StatusCode::UNAUTHORIZED, "invalid email or password"),
        Err(err) => identity_failure(err),
    }
}

pub(crate) async fn register_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
    Json(request): Json<RegisterRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    let registration = CandidateRegistration {
        email: request.email,
        password: request.password,
        last_name: request.last_name,
        first_name: request.first_name,
    };
    match api.identity.register_candidate(registration) {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(err) => identity_failure(err),
    }
}

pub(crate) async fn logout_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.identity.end_session() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => identity_failure(err),
    }
}

pub(crate) async fn session_handler<R, G, S>(
    State(api): State<Arc<AdmissionsApi<R, G, S>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    G: GradeSource + 'static,
    S: SessionStore + 'static,
{
    match api.identity.current_session() {
        Ok(Some(account)) => (StatusCode::OK, Json(account)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "no active session"),
        Err(err) => identity_failure(err),
    }
}
