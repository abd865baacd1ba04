use crate::error::AppError;
use crate::models::agent;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_agents).post(create_agent))
        .route("/{id}", get(get_agent).put(update_agent))
        .route("/{id}/active", put(set_active))
}

async fn list_agents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<agent::Agent>>, AppError> {
    let agents = agent::find_all(state.store.as_ref()).await?;
    Ok(Json(agents))
}

async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<agent::Agent>, AppError> {
    match agent::find_by_id(state.store.as_ref(), &id).await? {
        Some(a) => Ok(Json(a)),
        None => Err(AppError::NotFound("Agent not found".into())),
    }
}

async fn create_agent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<agent::CreateAgentRequest>,
) -> Result<(axum::http::StatusCode, Json<agent::Agent>), AppError> {
    if body.full_name.is_empty() || body.pin.is_empty() {
        return Err(AppError::BadRequest("full_name and pin are required".into()));
    }

    let created = agent::create(state.store.as_ref(), &body).await?;
    Ok((axum::http::StatusCode::CREATED, Json(created)))
}

async fn update_agent(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<agent::UpdateAgentRequest>,
) -> Result<Json<agent::Agent>, AppError> {
    match agent::update(state.store.as_ref(), &id, &body).await? {
        Some(a) => Ok(Json(a)),
        None => Err(AppError::NotFound("Agent not found".into())),
    }
}

#[derive(Deserialize)]
struct SetActiveBody {
    active: bool,
}

async fn set_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SetActiveBody>,
) -> Result<Json<agent::Agent>, AppError> {
    match agent::set_active(state.store.as_ref(), &id, body.active).await? {
        Some(a) => Ok(Json(a)),
        None => Err(AppError::NotFound("Agent not found".into())),
    }
}
