use crate::error::AppError;
use crate::models::provider;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_providers).post(create_provider))
        .route("/{id}", put(update_provider))
        .route("/{id}/active", put(set_active))
}

async fn list_providers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<provider::Provider>>, AppError> {
    let providers = provider::find_all(state.store.as_ref()).await?;
    Ok(Json(providers))
}

async fn create_provider(
    State(state): State<Arc<AppState>>,
    Json(body): Json<provider::CreateProviderRequest>,
) -> Result<(axum::http::StatusCode, Json<provider::Provider>), AppError> {
    if body.name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }

    let created = provider::create(state.store.as_ref(), &body).await?;
    Ok((axum::http::StatusCode::CREATED, Json(created)))
}

async fn update_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<provider::UpdateProviderRequest>,
) -> Result<Json<provider::Provider>, AppError> {
    match provider::update(state.store.as_ref(), &id, &body).await? {
        Some(p) => Ok(Json(p)),
        None => Err(AppError::NotFound("Provider not found".into())),
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
) -> Result<Json<provider::Provider>, AppError> {
    match provider::set_active(state.store.as_ref(), &id, body.active).await? {
        Some(p) => Ok(Json(p)),
        None => Err(AppError::NotFound("Provider not found".into())),
    }
}
