mod common;

use axum::http::StatusCode;
use common::{admin_session, login, register, spawn_app, ADMIN_EMAIL, ADMIN_PASSWORD};
use cookie::Cookie;
use serde_json::{json, Value};

#[tokio::test]
async fn register_twice_rejects_duplicate_email() {
    let app = spawn_app().await;

    let first = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "a@b.com", "password": "x" }))
        .await;
    first.assert_status_ok();
    assert_eq!(first.json::<Value>()["message"], "User created successfully");

    let second = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "a@b.com", "password": "x" }))
        .await;
    second.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(second.json::<Value>()["message"], "User already exists");

    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn register_requires_email_and_password() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "someone@agency.test" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Email and password are required"
    );
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn login_sets_opaque_http_only_cookie() {
    let app = spawn_app().await;
    register(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await;
    response.assert_status_ok();

    let cookie = response.cookie("admin_session");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert!(!cookie.value().contains(ADMIN_EMAIL));
    assert!(!cookie.value().contains(ADMIN_PASSWORD));

    let body = response.json::<Value>();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app().await;
    register(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "nope" }))
        .await;
    let unknown_email = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ghost@agency.test", "password": ADMIN_PASSWORD }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);

    let a = wrong_password.json::<Value>();
    let b = unknown_email.json::<Value>();
    assert_eq!(a, b);
    assert_eq!(a["message"], "Invalid credentials");
    assert_eq!(app.count("sessions").await, 0);
}

#[tokio::test]
async fn password_match_is_exact() {
    let app = spawn_app().await;
    register(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    for attempt in ["correct horse ", "Correct horse", "correct"] {
        app.server
            .post("/api/auth/login")
            .json(&json!({ "email": ADMIN_EMAIL, "password": attempt }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn passwords_are_not_stored_in_plaintext() {
    let app = spawn_app().await;
    register(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE email = ?")
        .bind(ADMIN_EMAIL)
        .fetch_one(&app.state.db.pool)
        .await
        .unwrap();
    assert_ne!(hash, ADMIN_PASSWORD);
    assert!(hash.starts_with("$argon2"));
}

#[tokio::test]
async fn mutating_routes_require_a_session() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/banners")
        .json(&json!({ "image_url": "http://test.local/x.webp" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Unauthorized");

    let forged = app
        .server
        .post("/api/banners")
        .add_cookie(Cookie::new("admin_session", "{\"id\":\"1\",\"email\":\"x\"}"))
        .json(&json!({ "image_url": "http://test.local/x.webp" }))
        .await;
    forged.assert_status(StatusCode::UNAUTHORIZED);

    assert_eq!(app.count("banners").await, 0);
}

#[tokio::test]
async fn admin_reads_require_a_session() {
    let app = spawn_app().await;

    for path in ["/api/admin/users", "/api/admin/stats", "/api/testimonials", "/api/auth/me"] {
        app.server
            .get(path)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn me_returns_the_session_user() {
    let app = spawn_app().await;
    let session = admin_session(&app).await;

    let response = app.server.get("/api/auth/me").add_cookie(session).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = spawn_app().await;
    let session = admin_session(&app).await;

    app.server
        .post("/api/auth/logout")
        .add_cookie(session.clone())
        .await
        .assert_status_ok();

    app.server
        .get("/api/auth/me")
        .add_cookie(session)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(app.count("sessions").await, 0);
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let app = spawn_app().await;
    let session = admin_session(&app).await;

    sqlx::query("UPDATE sessions SET expires_at = 0")
        .execute(&app.state.db.pool)
        .await
        .unwrap();

    app.server
        .get("/api/auth/me")
        .add_cookie(session)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_pages_redirect_to_login_without_session() {
    let app = spawn_app().await;

    let response = app.server.get("/admin/products").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");

    let forged = app
        .server
        .get("/admin")
        .add_cookie(Cookie::new("admin_session", "not-a-session"))
        .await;
    forged.assert_status(StatusCode::SEE_OTHER);

    // Non-admin pages are public
    app.server.get("/portfolio/123").await.assert_status_ok();
}

#[tokio::test]
async fn admin_pages_render_with_session() {
    let app = spawn_app().await;
    let session = admin_session(&app).await;

    let response = app.server.get("/admin/banners").add_cookie(session).await;
    response.assert_status_ok();
    assert!(response.text().contains("agency"));
}

#[tokio::test]
async fn second_login_gets_a_distinct_session() {
    let app = spawn_app().await;
    let first = admin_session(&app).await;
    let second = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    assert_ne!(first.value(), second.value());
    assert_eq!(app.count("sessions").await, 2);
}
