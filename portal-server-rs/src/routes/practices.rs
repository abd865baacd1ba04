use crate::error::AppError;
use crate::models::practice;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_practices).post(create_practice))
        .route("/{id}", get(get_practice).put(update_practice))
        .route("/{id}/phase", put(advance_phase))
        .route("/{id}/status", put(set_status))
}

#[derive(Deserialize)]
struct PracticesQuery {
    agent_id: Option<String>,
    phase: Option<String>,
    status: Option<String>,
}

async fn list_practices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PracticesQuery>,
) -> Result<Json<Vec<practice::Practice>>, AppError> {
    let practices = practice::find_all(
        state.store.as_ref(),
        query.agent_id.as_deref(),
        query.phase.as_deref(),
        query.status.as_deref(),
    )
    .await?;
    Ok(Json(practices))
}

async fn get_practice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<practice::Practice>, AppError> {
    match practice::find_by_id(state.store.as_ref(), &id).await? {
        Some(p) => Ok(Json(p)),
        None => Err(AppError::NotFound("Practice not found".into())),
    }
}

async fn create_practice(
    State(state): State<Arc<AppState>>,
    Json(body): Json<practice::CreatePracticeRequest>,
) -> Result<(axum::http::StatusCode, Json<practice::Practice>), AppError> {
    if body.customer_id.is_empty() || body.agent_id.is_empty() || body.vehicle.is_empty() {
        return Err(AppError::BadRequest(
            "customer_id, agent_id and vehicle are required".into(),
        ));
    }

    let created = practice::create(state.store.as_ref(), &body).await?;
    Ok((axum::http::StatusCode::CREATED, Json(created)))
}

async fn update_practice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<practice::UpdatePracticeRequest>,
) -> Result<Json<practice::Practice>, AppError> {
    match practice::update(state.store.as_ref(), &id, &body).await? {
        Some(p) => Ok(Json(p)),
        None => Err(AppError::NotFound("Practice not found".into())),
    }
}

#[derive(Deserialize)]
struct PhaseBody {
    phase: String,
}

async fn advance_phase(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<PhaseBody>,
) -> Result<Json<practice::Practice>, AppError> {
    let current = practice::find_by_id(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Practice not found".into()))?;

    let Some(next) = practice::next_phase(&current.phase) else {
        return Err(AppError::BadRequest(
            "Practice is already in its final phase".into(),
        ));
    };
    if body.phase != next {
        return Err(AppError::BadRequest(format!(
            "Phase can only advance to {}",
            next
        )));
    }

    match practice::set_phase(state.store.as_ref(), &id, &body.phase).await? {
        Some(p) => Ok(Json(p)),
        None => Err(AppError::NotFound("Practice not found".into())),
    }
}

#[derive(Deserialize)]
struct StatusBody {
    status: String,
    fee: Option<f64>,
}

async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<practice::Practice>, AppError> {
    if !practice::STATUSES.contains(&body.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "status must be one of {:?}",
            practice::STATUSES
        )));
    }
    if body.status == "won" && body.fee.is_none() {
        return Err(AppError::BadRequest(
            "fee is required when closing a practice as won".into(),
        ));
    }

    match practice::set_status(state.store.as_ref(), &id, &body.status, body.fee).await? {
        Some(p) => Ok(Json(p)),
        None => Err(AppError::NotFound("Practice not found".into())),
    }
}
