use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::{types::Json as SqlJson, SqlitePool};

use crate::{
    db::{models::ServicePackage, new_id, timestamp},
    error::{AppError, Result},
    routes::services::fetch_service,
    AppState,
};

const PACKAGE_COLUMNS: &str =
    "id, service_id, name, price, original_price, features, is_popular, created_at";

pub fn router() -> Router<AppState> {
    Router::new().route("/packages/:id", get(get_package))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/packages", post(create_package)).route(
        "/packages/:id",
        axum::routing::put(update_package)
            .patch(update_package)
            .delete(delete_package),
    )
}

#[derive(Debug, Deserialize)]
pub struct CreatePackageRequest {
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub name: String,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_popular: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePackageRequest {
    pub name: Option<String>,
    pub price: Option<String>,
    pub original_price: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_popular: Option<bool>,
}

/// Numeric value of a free-text price such as "Rp 150.000"; unparseable prices sort last.
/// Only the first amount counts, with `.` and `,` read as thousands separators.
fn price_key(price: &str) -> (u64, String) {
    let digits: String = price
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ','))
        .filter(char::is_ascii_digit)
        .collect();
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    (value, price.to_string())
}

pub(crate) async fn list_for_service(
    pool: &SqlitePool,
    service_id: &str,
) -> Result<Vec<ServicePackage>> {
    let mut packages = sqlx::query_as::<_, ServicePackage>(&format!(
        "SELECT {PACKAGE_COLUMNS} FROM service_packages WHERE service_id = ? ORDER BY created_at ASC"
    ))
    .bind(service_id)
    .fetch_all(pool)
    .await?;

    packages.sort_by_cached_key(|p| price_key(&p.price));
    Ok(packages)
}

async fn fetch_package(pool: &SqlitePool, id: &str) -> Result<ServicePackage> {
    sqlx::query_as::<_, ServicePackage>(&format!(
        "SELECT {PACKAGE_COLUMNS} FROM service_packages WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Package not found".to_string()))
}

async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServicePackage>> {
    Ok(Json(fetch_package(&state.db.pool, &id).await?))
}

async fn create_package(
    State(state): State<AppState>,
    Json(body): Json<CreatePackageRequest>,
) -> Result<Json<ServicePackage>> {
    if body.service_id.is_empty() {
        return Err(AppError::Validation("Service is required".to_string()));
    }
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Package name is required".to_string()));
    }

    // The owning service must exist at creation time
    fetch_service(&state.db.pool, &body.service_id).await?;

    let package = sqlx::query_as::<_, ServicePackage>(&format!(
        r#"
        INSERT INTO service_packages (id, service_id, name, price, original_price, features, is_popular, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {PACKAGE_COLUMNS}
        "#
    ))
    .bind(new_id())
    .bind(&body.service_id)
    .bind(name)
    .bind(body.price.unwrap_or_default())
    .bind(body.original_price.filter(|p| !p.trim().is_empty()))
    .bind(SqlJson(body.features.unwrap_or_default()))
    .bind(body.is_popular.unwrap_or(false))
    .bind(timestamp())
    .fetch_one(&state.db.pool)
    .await?;

    Ok(Json(package))
}

async fn update_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePackageRequest>,
) -> Result<Json<ServicePackage>> {
    let current = fetch_package(&state.db.pool, &id).await?;

    let name = match body.name.as_deref().map(str::trim) {
        Some("") => {
            return Err(AppError::Validation("Package name is required".to_string()))
        }
        Some(n) => n.to_string(),
        None => current.name,
    };

    // An empty string clears the strike-through price
    let original_price = match body.original_price {
        Some(p) if p.trim().is_empty() => None,
        Some(p) => Some(p),
        None => current.original_price,
    };

    let package = sqlx::query_as::<_, ServicePackage>(&format!(
        r#"
        UPDATE service_packages
        SET name = ?, price = ?, original_price = ?, features = ?, is_popular = ?
        WHERE id = ?
        RETURNING {PACKAGE_COLUMNS}
        "#
    ))
    .bind(&name)
    .bind(body.price.unwrap_or(current.price))
    .bind(original_price)
    .bind(body.features.map(SqlJson).unwrap_or(current.features))
    .bind(body.is_popular.unwrap_or(current.is_popular))
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;

    Ok(Json(package))
}

async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServicePackage>> {
    let package = sqlx::query_as::<_, ServicePackage>(&format!(
        "DELETE FROM service_packages WHERE id = ? RETURNING {PACKAGE_COLUMNS}"
    ))
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;

    Ok(Json(package))
}
