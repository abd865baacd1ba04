use crate::error::AppError;
use crate::services::backup::BackupService;
use crate::state::AppState;
use crate::store::ObjectInfo;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_backups).post(create_backup))
        .route("/restore", post(restore_from_body))
        .route("/{name}", get(download_backup).delete(delete_backup))
        .route("/{name}/restore", post(restore_by_name))
}

fn check_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() || name.contains('/') {
        return Err(AppError::BadRequest("Invalid snapshot name".into()));
    }
    Ok(())
}

async fn list_backups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ObjectInfo>>, AppError> {
    let snapshots = state.backups.list_snapshots().await?;
    Ok(Json(snapshots))
}

async fn create_backup(
    State(state): State<Arc<AppState>>,
) -> Result<(axum::http::StatusCode, Json<serde_json::Value>), AppError> {
    let doc = state.backups.export_snapshot(chrono::Utc::now()).await?;
    let name = state.backups.write_snapshot_file(&doc).await?;
    tracing::info!(%name, "Manual backup created");
    Ok((axum::http::StatusCode::CREATED, Json(json!({ "name": name }))))
}

async fn download_backup(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_name(&name)?;
    let bytes = state.backups.download_snapshot(&name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        bytes,
    ))
}

async fn restore_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_name(&name)?;
    let bytes = state.backups.download_snapshot(&name).await?;
    let doc = BackupService::parse_snapshot(&bytes)?;
    state.backups.restore_snapshot(&doc).await?;
    tracing::info!(%name, "Snapshot restored");
    Ok(Json(json!({ "restored": name })))
}

async fn restore_from_body(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let doc = BackupService::parse_snapshot(&body)?;
    state.backups.restore_snapshot(&doc).await?;
    tracing::info!("Snapshot restored from upload");
    Ok(Json(json!({ "restored": "upload" })))
}

async fn delete_backup(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<axum::http::StatusCode, AppError> {
    check_name(&name)?;
    state.backups.delete_snapshots(&[name]).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
