use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{models::Testimonial, new_id, timestamp},
    error::{AppError, Result},
    AppState,
};

const TESTIMONIAL_COLUMNS: &str = "id, name, role, message, rating, image, is_active, created_at";

/// Public review form and the approved testimonials shown on the site.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/testimonials", post(submit_testimonial))
        .route("/testimonials/active", get(list_active_testimonials))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/testimonials", get(list_testimonials))
        .route(
            "/testimonials/:id",
            axum::routing::patch(update_testimonial)
                .put(update_testimonial)
                .delete(delete_testimonial),
        )
}

#[derive(Debug, Deserialize)]
pub struct SubmitTestimonialRequest {
    #[serde(default)]
    pub name: String,
    pub role: Option<String>,
    #[serde(default)]
    pub message: String,
    pub rating: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTestimonialRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub message: Option<String>,
    pub rating: Option<i64>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

fn check_rating(rating: i64) -> Result<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn fetch_testimonial(pool: &SqlitePool, id: &str) -> Result<Testimonial> {
    sqlx::query_as::<_, Testimonial>(&format!(
        "SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Testimonial not found".to_string()))
}

async fn list_testimonials(State(state): State<AppState>) -> Result<Json<Vec<Testimonial>>> {
    let testimonials = sqlx::query_as::<_, Testimonial>(&format!(
        "SELECT {TESTIMONIAL_COLUMNS} FROM testimonials ORDER BY created_at DESC, rowid DESC"
    ))
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(testimonials))
}

async fn list_active_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>> {
    let testimonials = sqlx::query_as::<_, Testimonial>(&format!(
        "SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE is_active = ? ORDER BY created_at DESC, rowid DESC"
    ))
    .bind(true)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(testimonials))
}

/// Submissions from the public review form wait for moderation.
async fn submit_testimonial(
    State(state): State<AppState>,
    Json(body): Json<SubmitTestimonialRequest>,
) -> Result<Json<Testimonial>> {
    let name = body.name.trim();
    let message = body.message.trim();
    if name.is_empty() || message.is_empty() {
        return Err(AppError::Validation(
            "Name and message are required".to_string(),
        ));
    }
    let rating = body.rating.unwrap_or(5);
    check_rating(rating)?;

    let testimonial = sqlx::query_as::<_, Testimonial>(&format!(
        r#"
        INSERT INTO testimonials (id, name, role, message, rating, image, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {TESTIMONIAL_COLUMNS}
        "#
    ))
    .bind(new_id())
    .bind(name)
    .bind(non_empty(body.role))
    .bind(message)
    .bind(rating)
    .bind(non_empty(body.image))
    .bind(false)
    .bind(timestamp())
    .fetch_one(&state.db.pool)
    .await?;

    tracing::info!(testimonial_id = %testimonial.id, "review submitted for moderation");

    Ok(Json(testimonial))
}

async fn update_testimonial(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTestimonialRequest>,
) -> Result<Json<SuccessResponse>> {
    let current = fetch_testimonial(&state.db.pool, &id).await?;

    let name = match body.name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Name is required".to_string())),
        Some(n) => n.to_string(),
        None => current.name,
    };
    let message = match body.message.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Message is required".to_string())),
        Some(m) => m.to_string(),
        None => current.message,
    };
    let rating = body.rating.unwrap_or(current.rating);
    check_rating(rating)?;

    let role = match body.role {
        Some(r) => non_empty(Some(r)),
        None => current.role,
    };
    let image = match body.image {
        Some(i) => non_empty(Some(i)),
        None => current.image,
    };

    sqlx::query(
        r#"
        UPDATE testimonials
        SET name = ?, role = ?, message = ?, rating = ?, image = ?, is_active = ?
        WHERE id = ?
        "#,
    )
    .bind(&name)
    .bind(role)
    .bind(&message)
    .bind(rating)
    .bind(image)
    .bind(body.is_active.unwrap_or(current.is_active))
    .bind(&id)
    .execute(&state.db.pool)
    .await?;

    Ok(Json(SuccessResponse { success: true }))
}

async fn delete_testimonial(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    let result = sqlx::query("DELETE FROM testimonials WHERE id = ?")
        .bind(&id)
        .execute(&state.db.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Testimonial not found".to_string()));
    }

    Ok(Json(SuccessResponse { success: true }))
}
