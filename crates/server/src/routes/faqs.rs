use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        models::{is_known_category, Faq},
        new_id, timestamp,
    },
    error::{AppError, Result},
    AppState,
};

const FAQ_COLUMNS: &str = "id, question, answer, category, created_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/faqs", get(list_faqs))
        .route("/faqs/:id", get(get_faq))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/faqs", post(create_faq)).route(
        "/faqs/:id",
        axum::routing::put(update_faq)
            .patch(update_faq)
            .delete(delete_faq),
    )
}

#[derive(Debug, Deserialize)]
pub struct FaqListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFaqRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFaqRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
}

async fn fetch_faq(pool: &SqlitePool, id: &str) -> Result<Faq> {
    sqlx::query_as::<_, Faq>(&format!("SELECT {FAQ_COLUMNS} FROM faqs WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("FAQ not found".to_string()))
}

async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<FaqListQuery>,
) -> Result<Json<Vec<Faq>>> {
    let faqs = match query.category.filter(|c| !c.is_empty()) {
        Some(category) => {
            sqlx::query_as::<_, Faq>(&format!(
                "SELECT {FAQ_COLUMNS} FROM faqs WHERE category = ? ORDER BY created_at ASC, rowid ASC"
            ))
            .bind(category)
            .fetch_all(&state.db.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Faq>(&format!(
                "SELECT {FAQ_COLUMNS} FROM faqs ORDER BY created_at ASC, rowid ASC"
            ))
            .fetch_all(&state.db.pool)
            .await?
        }
    };

    Ok(Json(faqs))
}

async fn get_faq(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Faq>> {
    Ok(Json(fetch_faq(&state.db.pool, &id).await?))
}

async fn create_faq(
    State(state): State<AppState>,
    Json(body): Json<CreateFaqRequest>,
) -> Result<Json<Faq>> {
    if body.question.trim().is_empty() || body.answer.trim().is_empty() {
        return Err(AppError::Validation(
            "Question and answer are required".to_string(),
        ));
    }
    if !is_known_category(&body.category) {
        return Err(AppError::Validation(format!(
            "Unknown category: {}",
            body.category
        )));
    }

    let faq = sqlx::query_as::<_, Faq>(&format!(
        "INSERT INTO faqs (id, question, answer, category, created_at) VALUES (?, ?, ?, ?, ?) RETURNING {FAQ_COLUMNS}"
    ))
    .bind(new_id())
    .bind(body.question.trim())
    .bind(body.answer.trim())
    .bind(&body.category)
    .bind(timestamp())
    .fetch_one(&state.db.pool)
    .await?;

    Ok(Json(faq))
}

async fn update_faq(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateFaqRequest>,
) -> Result<Json<Faq>> {
    let current = fetch_faq(&state.db.pool, &id).await?;

    let question = body.question.unwrap_or(current.question);
    let answer = body.answer.unwrap_or(current.answer);
    let category = body.category.unwrap_or(current.category);

    if question.trim().is_empty() || answer.trim().is_empty() {
        return Err(AppError::Validation(
            "Question and answer are required".to_string(),
        ));
    }
    if !is_known_category(&category) {
        return Err(AppError::Validation(format!("Unknown category: {category}")));
    }

    let faq = sqlx::query_as::<_, Faq>(&format!(
        "UPDATE faqs SET question = ?, answer = ?, category = ? WHERE id = ? RETURNING {FAQ_COLUMNS}"
    ))
    .bind(question.trim())
    .bind(answer.trim())
    .bind(&category)
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("FAQ not found".to_string()))?;

    Ok(Json(faq))
}

async fn delete_faq(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Faq>> {
    let faq = sqlx::query_as::<_, Faq>(&format!(
        "DELETE FROM faqs WHERE id = ? RETURNING {FAQ_COLUMNS}"
    ))
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("FAQ not found".to_string()))?;

    Ok(Json(faq))
}
