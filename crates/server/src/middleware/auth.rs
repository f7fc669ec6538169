use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Serialize;

use crate::{
    db::Database,
    error::{AppError, Result},
    AppState,
};

pub const SESSION_COOKIE: &str = "admin_session";

pub const LOGIN_PAGE: &str = "/login";

#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

/// Looks up a live session and the user it belongs to.
pub async fn resolve_session(db: &Database, session_id: &str) -> Result<Option<AuthUser>> {
    let row = sqlx::query_as::<_, (String, String, Option<String>)>(
        r#"
        SELECT u.id, u.email, u.name
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.id = ? AND s.expires_at > ?
        "#,
    )
    .bind(session_id)
    .bind(Utc::now().timestamp())
    .fetch_optional(&db.pool)
    .await?;

    Ok(row.map(|(id, email, name)| AuthUser { id, email, name }))
}

fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Gate for every protected API route. Rejects with 401 and a JSON body.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let jar = CookieJar::from_headers(request.headers());
    let session_id = session_id(&jar).ok_or(AppError::Unauthorized)?;

    let user = resolve_session(&state.db, &session_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Browser navigations under `/admin` go to the login page without a session.
pub async fn admin_page_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path != "/admin" && !path.starts_with("/admin/") {
        return next.run(request).await;
    }

    let jar = CookieJar::from_headers(request.headers());
    let authorized = match session_id(&jar) {
        Some(id) => match resolve_session(&state.db, &id).await {
            Ok(user) => user.is_some(),
            Err(e) => {
                tracing::error!(error = %e, "failed to resolve admin session");
                false
            }
        },
        None => false,
    };

    if authorized {
        next.run(request).await
    } else {
        Redirect::to(LOGIN_PAGE).into_response()
    }
}

// Extractor for getting the authenticated user from request extensions
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
