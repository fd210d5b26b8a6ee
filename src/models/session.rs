use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::WorkflowError,
    models::{
        overview::Overview,
        rating::{RatingDraft, Weekday},
    },
    workflow::{Session, View},
};

/// Banner shown above the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBanner {
    /// "fetch" | "submit" | "validation"
    pub kind: &'static str,
    pub message: String,
}

impl From<&WorkflowError> for ErrorBanner {
    fn from(e: &WorkflowError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Response body of the /sessions endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub view: View,
    pub submitting: bool,
    pub selected_day: Weekday,
    pub draft: RatingDraft,
    /// Persistent banner after a failed initial load.
    pub fetch_error: Option<ErrorBanner>,
    pub error: Option<ErrorBanner>,
    pub total: usize,
    pub can_submit: bool,
    pub can_view_overview: bool,
    /// Only filled while the overview screen is shown.
    pub overview: Option<Overview>,
}

impl SessionSnapshot {
    pub fn new(id: Uuid, session: &Session) -> Self {
        Self {
            id,
            view: session.view(),
            submitting: session.is_submitting(),
            selected_day: session.selected_day(),
            draft: session.draft().clone(),
            fetch_error: session.fetch_error().map(ErrorBanner::from),
            error: session.error().map(ErrorBanner::from),
            total: session.ratings().len(),
            can_submit: session.can_submit(),
            can_view_overview: session.can_view_overview(),
            overview: (session.view() == View::Overview).then(|| session.overview()),
        }
    }
}
