use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    db::{models::User, new_id, timestamp, Database},
    error::{AppError, Result},
    middleware::auth::{AuthUser, SESSION_COOKIE},
    AppState,
};

/// Routes reachable without a session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
}

pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AppError::Internal("Failed to hash password".to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub(crate) async fn email_taken(db: &Database, email: &str) -> Result<bool> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(&db.pool)
        .await?;
    Ok(existing > 0)
}

/// Inserts a user after the duplicate-email check. Shared with the admin users routes.
pub(crate) async fn create_user(
    db: &Database,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<User> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    if email_taken(db, email).await? {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let password_hash = hash_password(password)?;
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, name, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, email, name, password_hash, created_at
        "#,
    )
    .bind(new_id())
    .bind(email)
    .bind(name)
    .bind(&password_hash)
    .bind(timestamp())
    .fetch_one(&db.pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Validation("User already exists".to_string())
        }
        other => AppError::Database(other),
    })?;

    Ok(user)
}

fn session_cookie(value: String, state: &AppState) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(
            state.config.session_max_age_secs(),
        ))
        .build()
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>> {
    let user = create_user(&state.db, &body.email, &body.password, body.name.as_deref()).await?;

    tracing::info!(user_id = %user.id, "registered admin user");

    Ok(Json(MessageResponse {
        message: "User created successfully".to_string(),
    }))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // Unknown email and wrong password fail identically
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(&body.email)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let now = Utc::now();
    let expires_at = now + state.config.session_ttl();

    sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now.timestamp())
        .execute(&state.db.pool)
        .await?;

    let session_id = new_id();
    sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session_id)
        .bind(&user.id)
        .bind(timestamp())
        .bind(expires_at.timestamp())
        .execute(&state.db.pool)
        .await?;

    tracing::info!(user_id = %user.id, "admin login");

    let jar = jar.add(session_cookie(session_id, &state));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
        }),
    ))
}

async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(cookie.value())
            .execute(&state.db.pool)
            .await?;
    }

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));

    Ok((
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

async fn me(user: AuthUser) -> Json<AuthUser> {
    Json(user)
}
