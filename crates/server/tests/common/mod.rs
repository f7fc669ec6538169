#![allow(dead_code)]

use std::path::PathBuf;

use agency_server::{build_app, config::Config, AppState};
use axum_test::TestServer;
use cookie::Cookie;
use serde_json::{json, Value};
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@agency.test";
pub const ADMIN_PASSWORD: &str = "correct horse";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub root: PathBuf,
}

impl TestApp {
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.state.db.pool)
            .await
            .unwrap()
    }

    /// Path of a stored object given the public URL returned by the upload endpoint.
    pub fn object_path(&self, url: &str) -> PathBuf {
        let rest = url
            .strip_prefix("http://test.local/storage/")
            .expect("url under the storage prefix");
        PathBuf::from(&self.state.config.storage_path).join(rest)
    }
}

pub async fn spawn_app() -> TestApp {
    let root = std::env::temp_dir().join(format!("agency-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(root.join("static")).unwrap();
    std::fs::write(
        root.join("static").join("index.html"),
        "<!doctype html><title>agency</title>",
    )
    .unwrap();

    let config = Config {
        port: 0,
        database_url: format!("sqlite:{}?mode=rwc", root.join("test.db").display()),
        storage_path: root.join("storage").display().to_string(),
        static_dir: root.join("static").display().to_string(),
        public_base_url: "http://test.local".to_string(),
        secure_cookies: false,
        session_ttl_days: 7,
        max_upload_bytes: 32 * 1024 * 1024,
    };

    let state = AppState::init(config).await.unwrap();
    let server = TestServer::new(build_app(state.clone())).unwrap();

    TestApp {
        server,
        state,
        root,
    }
}

pub async fn register(app: &TestApp, email: &str, password: &str) {
    app.server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "password": password }))
        .await
        .assert_status_ok();
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> Cookie<'static> {
    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    response.cookie("admin_session")
}

/// Registers the default admin and returns its session cookie.
pub async fn admin_session(app: &TestApp) -> Cookie<'static> {
    register(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

pub async fn post_json(app: &TestApp, session: &Cookie<'static>, path: &str, body: Value) -> Value {
    let response = app
        .server
        .post(path)
        .add_cookie(session.clone())
        .json(&body)
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}
