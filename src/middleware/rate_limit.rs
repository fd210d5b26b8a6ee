use axum::http::HeaderMap;

use crate::{error::AppError, AppState};

/// Client address as forwarded by the reverse proxy.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Checks a key-scoped rate limit stored in Redis.
///
/// Uses the INCR + EXPIRE strategy:
/// - Increments a counter for `key`
/// - On first increment, sets TTL to `window_secs`
/// - Returns 429 if counter exceeds `max_attempts`
pub async fn check_rate_limit(
    redis: &mut redis::aio::MultiplexedConnection,
    key: &str,
    max_attempts: u64,
    window_secs: u64,
) -> Result<(), AppError> {
    let count = attempts(key, redis::cmd("INCR").arg(key).query_async(redis).await);

    if count == 1 {
        // Only the first hit sets the TTL, later hits must not extend the window
        let _: Result<(), _> = redis::cmd("EXPIRE")
            .arg(key)
            .arg(window_secs)
            .query_async(redis)
            .await;
    }

    if count > max_attempts {
        return Err(AppError::RateLimited);
    }

    Ok(())
}

/// Counter value after INCR. A Redis failure lets the request through.
fn attempts(key: &str, incr: redis::RedisResult<u64>) -> u64 {
    incr.unwrap_or_else(|e| {
        tracing::warn!("Rate limit check for {key} skipped, Redis unavailable: {e}");
        0
    })
}

/// Limits rating submissions per client. A no-op when Redis is not configured.
pub async fn limit_submissions(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(redis) = &state.redis else {
        return Ok(());
    };
    let key = format!("ratings:submit:{}", client_ip(headers));
    let mut redis = redis.clone();
    check_rate_limit(
        &mut redis,
        &key,
        state.config.rate_limit_max_submissions,
        state.config.rate_limit_window_secs,
    )
    .await
}
