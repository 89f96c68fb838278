#![allow(dead_code)]

use std::sync::Arc;

use agenda_core::infrastructure::database::{create_pool, ensure_schema};
use agenda_core::infrastructure::security::Sha256Hasher;
use agenda_core::{AgendaService, AuthService, SqliteRendezVousRepository, SqliteUserRepository};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqlitePool;

pub struct TestApp {
    pub pool: SqlitePool,
    pub users: Arc<SqliteUserRepository>,
    pub rendez_vous: Arc<SqliteRendezVousRepository>,
    pub auth: AuthService<SqliteUserRepository>,
    pub agenda: AgendaService<SqliteRendezVousRepository, SqliteUserRepository>,
}

pub async fn spawn_app() -> TestApp {
    let pool = create_pool("sqlite::memory:", 1)
        .await
        .expect("failed to open in-memory database");
    ensure_schema(&pool).await.expect("failed to create schema");

    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let rendez_vous = Arc::new(SqliteRendezVousRepository::new(pool.clone()));
    let auth = AuthService::new(Arc::clone(&users), Arc::new(Sha256Hasher));
    let agenda = AgendaService::new(Arc::clone(&rendez_vous), Arc::clone(&users));

    TestApp {
        pool,
        users,
        rendez_vous,
        auth,
        agenda,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(hour, minute, 0).unwrap()
}
