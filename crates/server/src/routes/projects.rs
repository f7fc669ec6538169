use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        models::{is_known_category, Project},
        new_id, timestamp,
    },
    error::{AppError, Result},
    AppState,
};

const PROJECT_COLUMNS: &str =
    "id, title, category, image, description, client, completion_date, created_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/:id", get(get_project))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/projects", post(create_project)).route(
        "/projects/:id",
        axum::routing::put(update_project)
            .patch(update_project)
            .delete(delete_project),
    )
}

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub client: Option<String>,
    pub completion_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub client: Option<String>,
    pub completion_date: Option<String>,
}

fn check_category(category: &str) -> Result<()> {
    if is_known_category(category) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Unknown category: {category}")))
    }
}

async fn fetch_project(pool: &SqlitePool, id: &str) -> Result<Project> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<Vec<Project>>> {
    let projects = match query.category.filter(|c| !c.is_empty()) {
        Some(category) => {
            sqlx::query_as::<_, Project>(&format!(
                "SELECT {PROJECT_COLUMNS} FROM projects WHERE category = ? ORDER BY created_at DESC, rowid DESC"
            ))
            .bind(category)
            .fetch_all(&state.db.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Project>(&format!(
                "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, rowid DESC"
            ))
            .fetch_all(&state.db.pool)
            .await?
        }
    };

    Ok(Json(projects))
}

async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(fetch_project(&state.db.pool, &id).await?))
}

async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<Json<Project>> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    check_category(&body.category)?;

    let project = sqlx::query_as::<_, Project>(&format!(
        r#"
        INSERT INTO projects (id, title, category, image, description, client, completion_date, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(new_id())
    .bind(title)
    .bind(&body.category)
    .bind(body.image.unwrap_or_default())
    .bind(body.description.unwrap_or_default())
    .bind(body.client.unwrap_or_default())
    .bind(body.completion_date.filter(|d| !d.is_empty()))
    .bind(timestamp())
    .fetch_one(&state.db.pool)
    .await?;

    Ok(Json(project))
}

async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<Project>> {
    let current = fetch_project(&state.db.pool, &id).await?;

    let title = match body.title.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Title is required".to_string())),
        Some(t) => t.to_string(),
        None => current.title,
    };
    let category = body.category.unwrap_or(current.category);
    check_category(&category)?;

    let completion_date = match body.completion_date {
        Some(d) if d.is_empty() => None,
        Some(d) => Some(d),
        None => current.completion_date,
    };

    let project = sqlx::query_as::<_, Project>(&format!(
        r#"
        UPDATE projects
        SET title = ?, category = ?, image = ?, description = ?, client = ?, completion_date = ?
        WHERE id = ?
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(&title)
    .bind(&category)
    .bind(body.image.unwrap_or(current.image))
    .bind(body.description.unwrap_or(current.description))
    .bind(body.client.unwrap_or(current.client))
    .bind(completion_date)
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>> {
    let project = sqlx::query_as::<_, Project>(&format!(
        "DELETE FROM projects WHERE id = ? RETURNING {PROJECT_COLUMNS}"
    ))
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}
