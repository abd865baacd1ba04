use crate::error::AppError;
use crate::models::customer;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/{id}", get(get_customer).put(update_customer))
}

async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<customer::Customer>>, AppError> {
    let customers = customer::find_all(state.store.as_ref()).await?;
    Ok(Json(customers))
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<customer::Customer>, AppError> {
    match customer::find_by_id(state.store.as_ref(), &id).await? {
        Some(c) => Ok(Json(c)),
        None => Err(AppError::NotFound("Customer not found".into())),
    }
}

async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<customer::CreateCustomerRequest>,
) -> Result<(axum::http::StatusCode, Json<customer::Customer>), AppError> {
    if body.full_name.is_empty() {
        return Err(AppError::BadRequest("full_name is required".into()));
    }

    let created = customer::create(state.store.as_ref(), &body).await?;
    Ok((axum::http::StatusCode::CREATED, Json(created)))
}

async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<customer::UpdateCustomerRequest>,
) -> Result<Json<customer::Customer>, AppError> {
    match customer::update(state.store.as_ref(), &id, &body).await? {
        Some(c) => Ok(Json(c)),
        None => Err(AppError::NotFound("Customer not found".into())),
    }
}
