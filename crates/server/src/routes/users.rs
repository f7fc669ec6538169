use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::models::User,
    error::{AppError, Result},
    routes::auth::{create_user, email_taken, hash_password},
    AppState,
};

const USER_COLUMNS: &str = "id, email, name, password_hash, created_at";

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(add_user))
        .route("/admin/users/:id", patch(update_user).delete(delete_user))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: String,
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, rowid ASC"
    ))
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(users))
}

async fn add_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<User>> {
    let user = create_user(&state.db, &body.email, &body.password, body.name.as_deref()).await?;
    Ok(Json(user))
}

/// Only non-empty fields are applied.
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let current = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let email = match body.email.filter(|e| !e.trim().is_empty()) {
        Some(email) if email != current.email => {
            if email_taken(&state.db, &email).await? {
                return Err(AppError::Validation("User already exists".to_string()));
            }
            email
        }
        _ => current.email,
    };

    let password_hash = match body.password.filter(|p| !p.is_empty()) {
        Some(password) => hash_password(&password)?,
        None => current.password_hash,
    };

    let name = body
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .or(current.name);

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET email = ?, name = ?, password_hash = ? WHERE id = ? RETURNING {USER_COLUMNS}"
    ))
    .bind(&email)
    .bind(&name)
    .bind(&password_hash)
    .bind(&id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Removing a user also ends every session it holds.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&id)
        .execute(&state.db.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(&id)
        .execute(&state.db.pool)
        .await?;

    tracing::info!(user_id = %id, "deleted admin user");

    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully".to_string(),
    }))
}
