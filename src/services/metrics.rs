use std::sync::Arc;

use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, register_gauge, Counter, CounterVec, Gauge};
use tracing::{info, warn};

use crate::{error::StoreError, services::store::RatingStore, workflow::Completion};

lazy_static! {
    // ── Event counters ──────────────────────────────────────────────────────
    pub static ref SUBMISSIONS_COUNTER: CounterVec = register_counter_vec!(
        "lunch_ratings_submitted_total",
        "Rating submissions by outcome (ok, invalid, error)",
        &["status"]
    ).unwrap();

    pub static ref SESSIONS_COUNTER: Counter = register_counter!(
        "lunch_sessions_created_total",
        "Workflow sessions started"
    ).unwrap();

    // ── Gauges ──────────────────────────────────────────────────────────────
    pub static ref RATINGS_GAUGE: Gauge = register_gauge!(
        "lunch_ratings_stored",
        "Ratings currently stored"
    ).unwrap();

    pub static ref SESSIONS_GAUGE: Gauge = register_gauge!(
        "lunch_sessions_active",
        "Workflow sessions currently held in memory"
    ).unwrap();
}

pub fn record_submission(completion: &Completion) {
    let status = match completion {
        Completion::Inserted(Ok(_)) => "ok",
        Completion::Inserted(Err(StoreError::Validation(_))) => "invalid",
        _ => "error",
    };
    SUBMISSIONS_COUNTER.with_label_values(&[status]).inc();
    if status == "ok" {
        RATINGS_GAUGE.inc();
    }
}

/// Spawn the background metrics collector (refreshes every 5 minutes).
pub fn start(store: Arc<dyn RatingStore>) {
    tokio::spawn(async move {
        loop {
            match store.count().await {
                Ok(count) => {
                    RATINGS_GAUGE.set(count as f64);
                    info!("Metrics: {} rating(s) stored", count);
                }
                Err(e) => warn!("Metrics: collection failed: {}", e),
            }
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
        }
    });
}
