use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            BLOB PRIMARY KEY NOT NULL,
        username      TEXT NOT NULL UNIQUE,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        last_name     TEXT,
        first_name    TEXT,
        phone         TEXT,
        created_at    TEXT NOT NULL,
        last_login_at TEXT,
        is_active     BOOLEAN NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rendez_vous (
        id          BLOB PRIMARY KEY NOT NULL,
        user_id     BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title       TEXT NOT NULL,
        description TEXT,
        location    TEXT,
        client      TEXT,
        start_at    TEXT NOT NULL,
        end_at      TEXT NOT NULL,
        status      TEXT NOT NULL DEFAULT 'Confirmé'
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_rendez_vous_user_start ON rendez_vous (user_id, start_at)",
];

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5));

    // An in-memory database lives and dies with its connection.
    if database_url.contains(":memory:") {
        pool_options = pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;
    info!(url = %database_url, "connected to SQLite");
    Ok(pool)
}

/// Creates the tables when they are missing.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("ensuring database schema");
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("database schema ready");
    Ok(())
}
