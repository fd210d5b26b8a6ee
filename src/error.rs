use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::rating::Category;

/// Local check on rating values, raised before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unbekannter Wochentag: {0}")]
    UnknownDay(String),

    #[error("Bewertung für {} muss zwischen 0 und 5 liegen (war {score})", .category.label())]
    ScoreOutOfRange { category: Category, score: u8 },

    #[error("Sterne für {} müssen zwischen 1 und 5 liegen (war {stars})", .category.label())]
    StarOutOfRange { category: Category, stars: u8 },

    #[error("Gespeicherte Bewertung für {} ist ungültig ({value})", .category.label())]
    StoredScoreOutOfRange { category: Category, value: i16 },
}

/// Failures reported by a rating store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Verbindung zur Datenbank fehlgeschlagen: {0}")]
    Connection(String),

    #[error("Bewertung wurde von der Datenbank abgelehnt: {0}")]
    Validation(String),
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Validation(e.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            // 23514 = check_violation, 23502 = not_null_violation
            sqlx::Error::Database(db)
                if matches!(db.code().as_deref(), Some("23514") | Some("23502")) =>
            {
                StoreError::Validation(db.message().to_string())
            }
            _ => StoreError::Connection(e.to_string()),
        }
    }
}

/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Sitzung nicht gefunden")]
    SessionNotFound,

    #[error("Zu viele Anfragen. Bitte versuche es in ein paar Minuten erneut.")]
    RateLimited,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(StoreError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SessionNotFound => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// User-visible failures held by a workflow session. None of them is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Bewertungen konnten nicht geladen werden: {0}")]
    Fetch(StoreError),

    #[error("Bewertung konnte nicht gespeichert werden: {0}")]
    Submit(StoreError),

    #[error("{0}")]
    Validation(ValidationError),
}

impl WorkflowError {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Fetch(_) => "fetch",
            WorkflowError::Submit(_) => "submit",
            WorkflowError::Validation(_) => "validation",
        }
    }
}
