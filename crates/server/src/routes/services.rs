use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::{types::Json as SqlJson, SqlitePool};

use crate::{
    db::{
        models::{Service, ServicePackage},
        new_id, timestamp,
    },
    error::{AppError, Result},
    routes::packages,
    slug, AppState,
};

const DEFAULT_ACCENT: &str = "bg-blue-100 text-blue-600";
const DEFAULT_BORDER: &str = "group-hover:border-blue-200";

const SERVICE_COLUMNS: &str = "id, title, slug, description, long_description, price, image, features, accent, border_color, created_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/services/slug/:slug", get(get_service_by_slug))
        .route("/services/:id", get(get_service))
        .route("/services/:id/packages", get(list_service_packages))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/services", axum::routing::post(create_service))
        .route(
            "/services/:id",
            axum::routing::put(update_service)
                .patch(update_service)
                .delete(delete_service),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    #[serde(default)]
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    pub features: Option<Vec<String>>,
    pub accent: Option<String>,
    pub border_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    pub features: Option<Vec<String>>,
    pub accent: Option<String>,
    pub border_color: Option<String>,
}

pub(crate) async fn fetch_service(pool: &SqlitePool, id: &str) -> Result<Service> {
    sqlx::query_as::<_, Service>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Service not found".to_string()))
}

fn looks_like_uuid(value: &str) -> bool {
    uuid::Uuid::parse_str(value).is_ok()
}

async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>> {
    let services = sqlx::query_as::<_, Service>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at ASC, rowid ASC"
    ))
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(services))
}

async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Service>> {
    Ok(Json(fetch_service(&state.db.pool, &id).await?))
}

/// Slug lookup for public detail pages. Older links carry the service id instead.
async fn get_service_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Service>> {
    let by_slug = sqlx::query_as::<_, Service>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE slug = ? ORDER BY created_at ASC LIMIT 1"
    ))
    .bind(&slug)
    .fetch_optional(&state.db.pool)
    .await?;

    match by_slug {
        Some(service) => Ok(Json(service)),
        None if looks_like_uuid(&slug) => Ok(Json(fetch_service(&state.db.pool, &slug).await?)),
        None => Err(AppError::NotFound("Service not found".to_string())),
    }
}

async fn list_service_packages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ServicePackage>>> {
    Ok(Json(packages::list_for_service(&state.db.pool, &id).await?))
}

async fn create_service(
    State(state): State<AppState>,
    Json(body): Json<CreateServiceRequest>,
) -> Result<Json<Service>> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let slug = slug::resolve(title, body.slug.as_deref())?;

    let service = sqlx::query_as::<_, Service>(&format!(
        r#"
        INSERT INTO services (id, title, slug, description, long_description, price, image, features, accent, border_color, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {SERVICE_COLUMNS}
        "#
    ))
    .bind(new_id())
    .bind(title)
    .bind(&slug)
    .bind(body.description.unwrap_or_default())
    .bind(body.long_description.unwrap_or_default())
    .bind(body.price.unwrap_or_default())
    .bind(body.image.unwrap_or_default())
    .bind(SqlJson(body.features.unwrap_or_default()))
    .bind(body.accent.unwrap_or_else(|| DEFAULT_ACCENT.to_string()))
    .bind(body.border_color.unwrap_or_else(|| DEFAULT_BORDER.to_string()))
    .bind(timestamp())
    .fetch_one(&state.db.pool)
    .await?;

    tracing::debug!(service_id = %service.id, slug = %service.slug, "created service");

    Ok(Json(service))
}

async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateServiceRequest>,
) -> Result<Json<Service>> {
    let current = fetch_service(&state.db.pool, &id).await?;

    let title = match body.title.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Title is required".to_string())),
        Some(t) => t.to_string(),
        None => current.title.clone(),
    };
    let slug = slug::follow_title(&current.title, &current.slug, &title, body.slug.as_deref())?;

    let service = sqlx::query_as::<_, Service>(&format!(
        r#"
        UPDATE services
        SET title = ?, slug = ?, description = ?, long_description = ?, price = ?,
            image = ?, features = ?, accent = ?, border_color = ?
        WHERE id = ?
        RETURNING {SERVICE_COLUMNS}
        "#
    ))
    .bind(&title)
    .bind(&slug)
    .bind(body.description.unwrap_or(current.description))
    .bind(body.long_description.unwrap_or(current.long_description))
    .bind(body.price.unwrap_or(current.price))
    .bind(body.image.unwrap_or(current.image))
    .bind(body.features.map(SqlJson).unwrap_or(current.features))
    .bind(body.accent.unwrap_or(current.accent))
    .bind(body.border_color.unwrap_or(current.border_color))
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    Ok(Json(service))
}

/// Packages of the service are left in place.
async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Service>> {
    let service = sqlx::query_as::<_, Service>(&format!(
        "DELETE FROM services WHERE id = ? RETURNING {SERVICE_COLUMNS}"
    ))
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Service not found".to_string()))?;

    Ok(Json(service))
}
