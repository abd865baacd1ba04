use crate::error::AppError;
use crate::models::agent;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

#[derive(Deserialize)]
struct LoginBody {
    pin: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> Result<Json<agent::Agent>, AppError> {
    if body.pin.is_empty() {
        return Err(AppError::BadRequest("pin is required".into()));
    }

    match agent::find_by_pin(state.store.as_ref(), &body.pin).await? {
        Some(a) => Ok(Json(a)),
        None => Err(AppError::Unauthorized("Invalid PIN".into())),
    }
}
