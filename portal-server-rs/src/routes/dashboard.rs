use crate::error::AppError;
use crate::models::{practice, reminder};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_dashboard))
}

#[derive(Deserialize)]
struct DashboardQuery {
    agent_id: Option<String>,
}

#[derive(Serialize, Default)]
struct PracticeCounts {
    negotiation: usize,
    credit: usize,
    order: usize,
    won: usize,
    lost: usize,
}

#[derive(Serialize)]
struct MonthRevenue {
    month: u32,
    total: f64,
}

#[derive(Serialize)]
struct Dashboard {
    practices: PracticeCounts,
    open_reminders: usize,
    due_today: usize,
    monthly_revenue: Vec<MonthRevenue>,
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let store = state.store.as_ref();
    let agent_id = query.agent_id.as_deref();

    let practices = practice::find_all(store, agent_id, None, None).await?;
    let reminders = reminder::find_all(store, agent_id, true).await?;

    let mut counts = PracticeCounts::default();
    for p in &practices {
        match p.status.as_str() {
            "won" => counts.won += 1,
            "lost" => counts.lost += 1,
            _ => match p.phase.as_str() {
                "credit" => counts.credit += 1,
                "order" => counts.order += 1,
                _ => counts.negotiation += 1,
            },
        }
    }

    let now = chrono::Utc::now();
    let mut revenue = [0.0f64; 12];
    for p in practices.iter().filter(|p| p.status == "won") {
        let Ok(closed_at) = chrono::DateTime::parse_from_rfc3339(&p.updated_at) else {
            continue;
        };
        if closed_at.year() == now.year() {
            revenue[closed_at.month0() as usize] += p.fee;
        }
    }
    let monthly_revenue = revenue
        .iter()
        .enumerate()
        .map(|(i, total)| MonthRevenue {
            month: i as u32 + 1,
            total: *total,
        })
        .collect();

    let today = now.format("%Y-%m-%d").to_string();
    let due_today = reminders.iter().filter(|r| r.due_date <= today).count();

    Ok(Json(Dashboard {
        practices: counts,
        open_reminders: reminders.len(),
        due_today,
        monthly_revenue,
    }))
}
