use std::convert::Infallible;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::util::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod slug;

use services::storage::StorageService;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Database,
    pub config: config::Config,
    pub storage: StorageService,
}

impl AppState {
    /// Connects the database, applies migrations and prepares the bucket directories.
    pub async fn init(config: config::Config) -> anyhow::Result<Self> {
        let storage = StorageService::new(&config.storage_path, &config.public_base_url);
        storage.init().await?;

        let db = db::Database::connect(&config.database_url).await?;
        db.run_migrations().await?;

        Ok(Self {
            db,
            config,
            storage,
        })
    }
}

pub fn build_app(state: AppState) -> Router {
    use routes::{auth, banners, faqs, packages, projects, services, stats, testimonials, upload, users};

    // Every state-mutating route and every admin read sits behind the session gate
    let protected_routes = Router::new()
        .merge(auth::protected_router())
        .merge(services::protected_router())
        .merge(packages::protected_router())
        .merge(projects::protected_router())
        .merge(testimonials::protected_router())
        .merge(faqs::protected_router())
        .merge(banners::protected_router())
        .merge(users::protected_router())
        .merge(stats::protected_router())
        .merge(upload::protected_router(&state.config))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let api_router = Router::new()
        .merge(auth::router())
        .merge(services::router())
        .merge(packages::router())
        .merge(projects::router())
        .merge(testimonials::router())
        .merge(faqs::router())
        .merge(banners::router())
        .merge(protected_routes)
        .fallback(api_not_found);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_router)
        .nest_service("/storage", ServeDir::new(&state.config.storage_path))
        .fallback(serve_spa)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_page_gate,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health_check() -> &'static str {
    "OK"
}

async fn api_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Not found" })),
    )
        .into_response()
}

async fn serve_spa(State(state): State<AppState>, req: Request<Body>) -> Response {
    let static_dir = state.config.static_dir.clone();
    let path = req.uri().path();

    // Try to serve static file first
    let static_path = std::path::Path::new(&static_dir).join(path.trim_start_matches('/'));
    if path != "/" && static_path.is_file() {
        let res: Result<_, Infallible> = ServeDir::new(&static_dir).oneshot(req).await;
        return match res {
            Ok(res) => res.into_response(),
            Err(never) => match never {},
        };
    }

    // For SPA routes, serve index.html
    match tokio::fs::read(std::path::Path::new(&static_dir).join("index.html")).await {
        Ok(contents) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            contents,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
