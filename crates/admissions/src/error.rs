use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::admissions::repository::RepositoryError;
use crate::workflows::admissions::seed::SeedError;
use crate::workflows::admissions::{AdmissionsError, ExportError, IdentityError};

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Admissions(AdmissionsError),
    Identity(IdentityError),
    Export(ExportError),
    Seed(SeedError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Server(err) => write!(f, "server error: {err}"),
            AppError::Admissions(err) => write!(f, "admissions error: {err}"),
            AppError::Identity(err) => write!(f, "identity error: {err}"),
            AppError::Export(err) => write!(f, "export error: {err}"),
            AppError::Seed(err) => write!(f, "seed error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Admissions(err) => Some(err),
            AppError::Identity(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Seed(err) => Some(err),
        }
    }
}

impl AppError {
    /// HTTP status used when the error reaches a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Admissions(AdmissionsError::InvalidTransition { .. })
            | AppError::Admissions(AdmissionsError::Repository(RepositoryError::Conflict {
                ..
            }))
            | AppError::Identity(IdentityError::DuplicateEmail(_)) => StatusCode::CONFLICT,
            AppError::Admissions(AdmissionsError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Admissions(_)
            | AppError::Identity(_)
            | AppError::Export(_)
            | AppError::Seed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<AdmissionsError> for AppError {
    fn from(value: AdmissionsError) -> Self {
        Self::Admissions(value)
    }
}

impl From<IdentityError> for AppError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<SeedError> for AppError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}
