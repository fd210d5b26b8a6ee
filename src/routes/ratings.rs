use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;

use crate::{
    error::{AppError, StoreError},
    middleware::rate_limit::limit_submissions,
    models::{
        overview::Overview,
        rating::{CreateRatingRequest, RatingRecord, Weekday, WeekdayOption},
    },
    services::{aggregation, metrics},
    AppState,
};

/// GET /weekdays — the day selector's options
pub async fn list_weekdays() -> Json<Vec<WeekdayOption>> {
    Json(Weekday::ALL.into_iter().map(WeekdayOption::from).collect())
}

/// GET /ratings — every stored rating, oldest first
pub async fn list_ratings(State(state): State<AppState>) -> Result<Json<Vec<RatingRecord>>, AppError> {
    let records = state.store.fetch_all().await?;
    Ok(Json(records))
}

/// POST /ratings — validate and store one rating
pub async fn create_rating(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateRatingRequest>,
) -> Result<(StatusCode, Json<RatingRecord>), AppError> {
    limit_submissions(&state, &headers).await?;

    let record = body.into_record(Utc::now()).inspect_err(|_| {
        metrics::SUBMISSIONS_COUNTER.with_label_values(&["invalid"]).inc();
    })?;

    match state.store.insert(&record).await {
        Ok(stored) => {
            metrics::SUBMISSIONS_COUNTER.with_label_values(&["ok"]).inc();
            metrics::RATINGS_GAUGE.inc();
            Ok((StatusCode::CREATED, Json(stored)))
        }
        Err(e) => {
            let status = match e {
                StoreError::Validation(_) => "invalid",
                StoreError::Connection(_) => "error",
            };
            metrics::SUBMISSIONS_COUNTER.with_label_values(&[status]).inc();
            Err(e.into())
        }
    }
}

/// GET /ratings/overview — aggregates over all stored ratings
pub async fn get_overview(State(state): State<AppState>) -> Result<Json<Overview>, AppError> {
    let records = state.store.fetch_all().await?;
    Ok(Json(aggregation::overview(&records)))
}
