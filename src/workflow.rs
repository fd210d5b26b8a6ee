//! Submission workflow of one rating session.
//!
//! `Loading` → `Form` ⇄ `Overview`, with a transient submitting flag on top of
//! `Form`. State changes are plain method calls: [`Session::dispatch`] applies
//! a user action and may request an [`Effect`]; running that effect against a
//! [`RatingStore`] yields a [`Completion`] to feed back through
//! [`Session::complete`]. No I/O happens inside the state machine itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{StoreError, WorkflowError},
    models::{
        overview::Overview,
        rating::{Category, RatingDraft, RatingRecord, Weekday},
    },
    services::{aggregation, store::RatingStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Loading,
    Form,
    Overview,
}

/// Actions the presentation layer can invoke.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    SelectDay { day: Weekday },
    SetCategoryScore { category: Category, stars: u8 },
    SetComment { comment: String },
    Submit,
    ViewOverview,
    BackToForm,
}

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchAll,
    Insert(RatingRecord),
}

/// Outcome of an [`Effect`].
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Fetched(Result<Vec<RatingRecord>, StoreError>),
    Inserted(Result<RatingRecord, StoreError>),
}

impl Effect {
    pub async fn run(self, store: &dyn RatingStore) -> Completion {
        match self {
            Effect::FetchAll => Completion::Fetched(store.fetch_all().await),
            Effect::Insert(record) => Completion::Inserted(store.insert(&record).await),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    view: View,
    submitting: bool,
    selected_day: Weekday,
    draft: RatingDraft,
    ratings: Vec<RatingRecord>,
    /// Set when the initial fetch failed; stays for the whole session since
    /// the collection is incomplete from then on.
    fetch_error: Option<WorkflowError>,
    /// Transient submit or validation error.
    error: Option<WorkflowError>,
}

impl Session {
    /// A fresh session in `Loading`, together with the initial fetch to run.
    pub fn start() -> (Self, Effect) {
        let session = Self {
            view: View::Loading,
            submitting: false,
            selected_day: Weekday::default(),
            draft: RatingDraft::default(),
            ratings: Vec::new(),
            fetch_error: None,
            error: None,
        };
        (session, Effect::FetchAll)
    }

    /// Starts a session and runs its initial fetch to completion.
    pub async fn load(store: &dyn RatingStore) -> Self {
        let (mut session, effect) = Self::start();
        let completion = effect.run(store).await;
        session.complete(completion);
        session
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn selected_day(&self) -> Weekday {
        self.selected_day
    }

    pub fn draft(&self) -> &RatingDraft {
        &self.draft
    }

    pub fn ratings(&self) -> &[RatingRecord] {
        &self.ratings
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }

    pub fn fetch_error(&self) -> Option<&WorkflowError> {
        self.fetch_error.as_ref()
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        self.view == View::Form && !self.submitting
    }

    /// Whether the "view overview" button is shown.
    pub fn can_view_overview(&self) -> bool {
        self.can_submit() && !self.ratings.is_empty()
    }

    pub fn overview(&self) -> Overview {
        aggregation::overview(&self.ratings)
    }

    pub fn dispatch(&mut self, action: Action) -> Option<Effect> {
        self.dispatch_at(action, Utc::now())
    }

    /// Applies `action`; `now` stamps a record built by `Submit`.
    pub fn dispatch_at(&mut self, action: Action, now: DateTime<Utc>) -> Option<Effect> {
        match action {
            // The form is locked while loading and while a submission is in flight
            Action::SelectDay { day } if self.can_submit() => {
                self.selected_day = day;
                None
            }
            Action::SetCategoryScore { category, stars } if self.can_submit() => {
                match self.draft.set_score(category, stars) {
                    Ok(()) => {
                        if matches!(self.error, Some(WorkflowError::Validation(_))) {
                            self.error = None;
                        }
                    }
                    Err(e) => self.error = Some(WorkflowError::Validation(e)),
                }
                None
            }
            Action::SetComment { comment } if self.can_submit() => {
                self.draft.set_comment(comment);
                None
            }
            Action::Submit if self.can_submit() => match self.draft.build(self.selected_day, now) {
                Ok(record) => {
                    self.submitting = true;
                    self.error = None;
                    Some(Effect::Insert(record))
                }
                Err(e) => {
                    self.error = Some(WorkflowError::Validation(e));
                    None
                }
            },
            Action::ViewOverview if self.can_view_overview() => {
                self.view = View::Overview;
                None
            }
            Action::BackToForm if self.view == View::Overview => {
                self.view = View::Form;
                self.error = None;
                None
            }
            ignored => {
                tracing::debug!("ignoring {ignored:?} in {:?} (submitting: {})", self.view, self.submitting);
                None
            }
        }
    }

    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched(result) if self.view == View::Loading => {
                self.view = View::Form;
                match result {
                    Ok(records) => {
                        tracing::info!("Session loaded {} rating(s)", records.len());
                        self.ratings = records;
                    }
                    Err(e) => {
                        tracing::warn!("Initial rating fetch failed: {e}");
                        self.ratings.clear();
                        self.fetch_error = Some(WorkflowError::Fetch(e));
                    }
                }
            }
            Completion::Inserted(result) if self.submitting => {
                self.submitting = false;
                match result {
                    Ok(record) => {
                        self.ratings.push(record);
                        self.draft = RatingDraft::default();
                        self.view = View::Overview;
                    }
                    Err(e) => {
                        tracing::warn!("Rating submission failed: {e}");
                        self.error = Some(WorkflowError::Submit(e));
                    }
                }
            }
            stale => tracing::debug!("dropping stale completion {stale:?}"),
        }
    }

    /// Dispatches `action` and runs any resulting effect against `store`.
    pub async fn perform(&mut self, action: Action, store: &dyn RatingStore) {
        if let Some(effect) = self.dispatch(action) {
            let completion = effect.run(store).await;
            self.complete(completion);
        }
    }
}
