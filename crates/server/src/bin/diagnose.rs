//! Configuration and store health report. Reads an env file (default `.env`).
//!
//! Usage: `diagnose [ENV_FILE]`

use std::{env, path::PathBuf, process::ExitCode};

use agency_server::{
    config::{Config, BUCKETS},
    db::Database,
};

const VARIABLES: [&str; 5] = [
    "DATABASE_URL",
    "STORAGE_PATH",
    "PUBLIC_BASE_URL",
    "STATIC_DIR",
    "SECURE_COOKIES",
];

fn mark(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "MISSING"
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    println!("Starting diagnosis...");

    let env_file = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".env"));

    if let Err(e) = dotenvy::from_path(&env_file) {
        println!("[FAIL] could not read {}: {e}", env_file.display());
        return ExitCode::FAILURE;
    }
    println!("Loaded {}", env_file.display());

    println!("\nEnvironment variables:");
    for var in VARIABLES {
        println!("- {var}: {}", mark(env::var(var).is_ok()));
    }

    let config = Config::from_env();
    let mut healthy = true;

    println!("\nTesting database connection...");
    if let Err(e) = check_database(&config.database_url).await {
        println!("[FAIL] {e:#}");
        healthy = false;
    }

    println!("\nChecking storage buckets under {}...", config.storage_path);
    for bucket in BUCKETS {
        let path = PathBuf::from(&config.storage_path).join(bucket);
        let ok = path.is_dir();
        healthy &= ok;
        println!("- {bucket}: {}", mark(ok));
    }

    if healthy {
        println!("\nAll checks passed.");
        ExitCode::SUCCESS
    } else {
        println!("\nSome checks failed.");
        ExitCode::FAILURE
    }
}

async fn check_database(url: &str) -> anyhow::Result<()> {
    let db = Database::connect_read_only(url).await?;

    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&db.pool)
        .await
        .map_err(|e| anyhow::anyhow!("querying 'users' failed (are migrations applied?): {e}"))?;
    println!("[ok] connected to 'users' table, found {users} users");

    let columns = sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info('users')")
        .fetch_all(&db.pool)
        .await?;
    println!("User columns: {}", columns.join(", "));

    if columns.iter().any(|c| c == "created_at") {
        println!("[ok] 'created_at' column exists");
        Ok(())
    } else {
        anyhow::bail!("'created_at' column missing from 'users'")
    }
}
