use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::rate_limit::limit_submissions,
    models::session::SessionSnapshot,
    services::sessions::SessionRegistry,
    workflow::Action,
    AppState,
};

/// POST /sessions — start a session; the initial fetch runs before responding
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let (id, handle) = state.sessions.create(state.store.as_ref()).await;
    let session = handle.lock().await;
    (StatusCode::CREATED, Json(SessionSnapshot::new(id, &session)))
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(id).await.ok_or(AppError::SessionNotFound)?;
    let session = handle.lock().await;
    Ok(Json(SessionSnapshot::new(id, &session)))
}

/// POST /sessions/{id}/actions — apply one workflow action
pub async fn dispatch_action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(action): Json<Action>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(id).await.ok_or(AppError::SessionNotFound)?;

    if action == Action::Submit && handle.lock().await.can_submit() {
        limit_submissions(&state, &headers).await?;
    }

    SessionRegistry::perform(&handle, action, state.store.as_ref()).await;

    let session = handle.lock().await;
    Ok(Json(SessionSnapshot::new(id, &session)))
}

/// DELETE /sessions/{id}
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        tracing::info!("Session {id} ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound)
    }
}
