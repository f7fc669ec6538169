use std::env;

/// Buckets accepted by the upload endpoint.
pub const BUCKETS: [&str; 3] = ["services", "portfolio", "banners"];

pub const DEFAULT_BUCKET: &str = "portfolio";

const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
const MAX_SESSION_TTL_DAYS: i64 = 3650;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub storage_path: String,
    pub static_dir: String,
    pub public_base_url: String,
    pub secure_cookies: bool,
    pub session_ttl_days: i64,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self {
            port,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./data/agency.db?mode=rwc".to_string()),
            storage_path: env::var("STORAGE_PATH")
                .unwrap_or_else(|_| "./data/storage".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{port}")),
            secure_cookies: env::var("SECURE_COOKIES")
                .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(false),
            session_ttl_days: session_ttl_days(env::var("SESSION_TTL_DAYS").ok().as_deref()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
        }
    }

    /// Session lifetime, bounded so expiry arithmetic cannot overflow.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days.clamp(1, MAX_SESSION_TTL_DAYS))
    }

    pub fn session_max_age_secs(&self) -> i64 {
        self.session_ttl().num_seconds()
    }
}

fn session_ttl_days(raw: Option<&str>) -> i64 {
    raw.and_then(|d| d.trim().parse::<i64>().ok())
        .filter(|d| *d > 0)
        .map(|d| d.min(MAX_SESSION_TTL_DAYS))
        .unwrap_or(DEFAULT_SESSION_TTL_DAYS)
}
