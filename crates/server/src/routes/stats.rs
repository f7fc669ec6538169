use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{error::Result, AppState};

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/admin/stats", get(get_stats))
}

/// Live row counts, recomputed on every call.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub services: i64,
    pub projects: i64,
    pub testimonials: i64,
    pub faqs: i64,
    pub banners: i64,
    pub users: i64,
}

async fn count(pool: &SqlitePool, table: &'static str) -> Result<i64> {
    let n = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(n)
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let pool = &state.db.pool;

    let (services, projects, testimonials, faqs, banners, users) = tokio::try_join!(
        count(pool, "services"),
        count(pool, "projects"),
        count(pool, "testimonials"),
        count(pool, "faqs"),
        count(pool, "banners"),
        count(pool, "users"),
    )?;

    Ok(Json(StatsResponse {
        services,
        projects,
        testimonials,
        faqs,
        banners,
        users,
    }))
}
