use crate::error::AppError;
use crate::models::reminder;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_reminders).post(create_reminder))
        .route("/{id}", axum::routing::delete(delete_reminder))
        .route("/{id}/resolve", put(resolve_reminder))
}

#[derive(Deserialize)]
struct RemindersQuery {
    agent_id: Option<String>,
    #[serde(default)]
    open: bool,
}

async fn list_reminders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RemindersQuery>,
) -> Result<Json<Vec<reminder::Reminder>>, AppError> {
    let reminders = reminder::find_all(
        state.store.as_ref(),
        query.agent_id.as_deref(),
        query.open,
    )
    .await?;
    Ok(Json(reminders))
}

async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Json(body): Json<reminder::CreateReminderRequest>,
) -> Result<(axum::http::StatusCode, Json<reminder::Reminder>), AppError> {
    if body.agent_id.is_empty() || body.due_date.is_empty() {
        return Err(AppError::BadRequest("agent_id and due_date are required".into()));
    }

    let created = reminder::create(state.store.as_ref(), &body).await?;
    Ok((axum::http::StatusCode::CREATED, Json(created)))
}

async fn resolve_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<reminder::Reminder>, AppError> {
    match reminder::resolve(state.store.as_ref(), &id).await? {
        Some(r) => Ok(Json(r)),
        None => Err(AppError::NotFound("Reminder not found".into())),
    }
}

async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    if reminder::delete(state.store.as_ref(), &id).await? {
        Ok(axum::http::StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Reminder not found".into()))
    }
}
