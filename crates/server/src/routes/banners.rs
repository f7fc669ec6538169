use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{models::Banner, new_id, timestamp},
    error::{AppError, Result},
    AppState,
};

const BANNER_COLUMNS: &str = "id, title, link, image_url, is_active, created_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/banners", get(list_banners))
        .route("/banners/:id", get(get_banner))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/banners", post(create_banner)).route(
        "/banners/:id",
        axum::routing::put(update_banner)
            .patch(update_banner)
            .delete(delete_banner),
    )
}

#[derive(Debug, Deserialize)]
pub struct BannerListQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBannerRequest {
    pub title: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: String,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBannerRequest {
    pub title: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DeleteBannerResponse {
    pub message: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn fetch_banner(pool: &SqlitePool, id: &str) -> Result<Banner> {
    sqlx::query_as::<_, Banner>(&format!(
        "SELECT {BANNER_COLUMNS} FROM banners WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Banner not found".to_string()))
}

async fn list_banners(
    State(state): State<AppState>,
    Query(query): Query<BannerListQuery>,
) -> Result<Json<Vec<Banner>>> {
    let banners = match query.active {
        Some(active) => {
            sqlx::query_as::<_, Banner>(&format!(
                "SELECT {BANNER_COLUMNS} FROM banners WHERE is_active = ? ORDER BY created_at DESC, rowid DESC"
            ))
            .bind(active)
            .fetch_all(&state.db.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Banner>(&format!(
                "SELECT {BANNER_COLUMNS} FROM banners ORDER BY created_at DESC, rowid DESC"
            ))
            .fetch_all(&state.db.pool)
            .await?
        }
    };

    Ok(Json(banners))
}

async fn get_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Banner>> {
    Ok(Json(fetch_banner(&state.db.pool, &id).await?))
}

async fn create_banner(
    State(state): State<AppState>,
    Json(body): Json<CreateBannerRequest>,
) -> Result<Json<Banner>> {
    if body.image_url.trim().is_empty() {
        return Err(AppError::Validation("Image is required".to_string()));
    }

    let banner = sqlx::query_as::<_, Banner>(&format!(
        r#"
        INSERT INTO banners (id, title, link, image_url, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {BANNER_COLUMNS}
        "#
    ))
    .bind(new_id())
    .bind(non_empty(body.title))
    .bind(non_empty(body.link))
    .bind(body.image_url.trim())
    .bind(body.is_active.unwrap_or(true))
    .bind(timestamp())
    .fetch_one(&state.db.pool)
    .await?;

    Ok(Json(banner))
}

async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBannerRequest>,
) -> Result<Json<Banner>> {
    let current = fetch_banner(&state.db.pool, &id).await?;

    let image_url = match body.image_url {
        Some(url) if url.trim().is_empty() => {
            return Err(AppError::Validation("Image is required".to_string()))
        }
        Some(url) => url.trim().to_string(),
        None => current.image_url,
    };
    let title = match body.title {
        Some(t) => non_empty(Some(t)),
        None => current.title,
    };
    let link = match body.link {
        Some(l) => non_empty(Some(l)),
        None => current.link,
    };

    let banner = sqlx::query_as::<_, Banner>(&format!(
        r#"
        UPDATE banners
        SET title = ?, link = ?, image_url = ?, is_active = ?
        WHERE id = ?
        RETURNING {BANNER_COLUMNS}
        "#
    ))
    .bind(title)
    .bind(link)
    .bind(&image_url)
    .bind(body.is_active.unwrap_or(current.is_active))
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Banner not found".to_string()))?;

    Ok(Json(banner))
}

async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteBannerResponse>> {
    let result = sqlx::query("DELETE FROM banners WHERE id = ?")
        .bind(&id)
        .execute(&state.db.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Banner not found".to_string()));
    }

    Ok(Json(DeleteBannerResponse {
        message: "Banner deleted successfully".to_string(),
    }))
}
