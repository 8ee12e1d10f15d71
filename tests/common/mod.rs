// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use audio_depot::config::Config;
use audio_depot::db::Database;
use audio_depot::routes::create_router;
use audio_depot::AppState;
use std::sync::Arc;

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Skip test with message if no database is available.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("⚠️  Skipping: DATABASE_URL not set");
            return;
        }
    };
}

/// Connect to the test database and apply migrations.
#[allow(dead_code)]
pub async fn test_db() -> Database {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let db = Database::connect(&url, 5)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to apply migrations");
    db
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> Database {
    Database::new_mock()
}

/// Generate a unique external identity id for test isolation.
#[allow(dead_code)]
pub fn unique_external_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("ext-{}-{}", nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Build a router around the given config and database.
#[allow(dead_code)]
pub fn create_app(config: Config, db: Database) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app(Config::test_default(), test_db_offline())
}
