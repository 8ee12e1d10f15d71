// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PostgreSQL client wrapper with typed operations.
//!
//! Requests work through a [`UnitOfWork`]: one transaction, opened at request
//! entry and committed explicitly. Dropping it without committing rolls
//! everything back, so an early `?` return never leaves partial writes.
//!
//! Provides high-level operations for:
//! - Users (lookup by local or external id, insert, profile update, delete)
//! - Audio files (lookup by filename, listing per owner, insert)

use crate::error::AppError;
use crate::models::{AudioFile, User};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};

const USER_COLUMNS: &str = "id, external_id, name, email, is_superuser, created_at";
const AUDIO_FILE_COLUMNS: &str = "id, filename, file_path, user_id, created_at";

/// PostgreSQL database handle (connection pool).
#[derive(Clone)]
pub struct Database {
    pool: Option<PgPool>,
}

impl Database {
    /// Connect a pool to the given database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        tracing::info!(max_connections, "Connected to PostgreSQL");

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a mock database handle for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { pool: None }
    }

    /// Helper to get the pool or return an error if offline.
    fn get_pool(&self) -> Result<&PgPool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(self.get_pool()?)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Open a unit of work for one request.
    pub async fn begin(&self) -> Result<UnitOfWork, AppError> {
        let tx = self.get_pool()?.begin().await?;
        Ok(UnitOfWork { tx })
    }

    /// Close all pooled connections (shutdown).
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            tracing::info!("Database pool closed");
        }
    }
}

/// Request-scoped transaction with repository operations.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    /// Make every write in this unit durable.
    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by local id.
    pub async fn find_user_by_id(&mut self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    /// Get a user by the provider-issued identity id.
    pub async fn find_user_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE external_id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(external_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    /// Insert a non-elevated user unless it would collide with an existing row.
    ///
    /// Returns `None` when the external id or email is already taken,
    /// including by a concurrent transaction that committed first. The
    /// statement never aborts the transaction, so the caller can re-read.
    pub async fn insert_user_if_absent(
        &mut self,
        external_id: &str,
        name: &str,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "INSERT INTO users (external_id, name, email, is_superuser) \
             VALUES ($1, $2, $3, FALSE) \
             ON CONFLICT DO NOTHING \
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(external_id)
            .bind(name)
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    /// Apply a partial profile update; `None` fields keep their value.
    pub async fn update_user_profile(
        &mut self,
        id: i64,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email) \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(name)
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(user)
    }

    /// Delete a user; owned audio file rows go with it (ON DELETE CASCADE).
    ///
    /// Returns whether a row was removed.
    pub async fn delete_user(&mut self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Audio File Operations ───────────────────────────────────

    /// Get an audio file record by its (globally unique) filename.
    pub async fn find_audio_file_by_filename(
        &mut self,
        filename: &str,
    ) -> Result<Option<AudioFile>, AppError> {
        let sql = format!(
            "SELECT {} FROM audio_files WHERE filename = $1",
            AUDIO_FILE_COLUMNS
        );
        let file = sqlx::query_as::<_, AudioFile>(&sql)
            .bind(filename)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(file)
    }

    /// All files owned by a user, oldest first.
    pub async fn list_audio_files_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<AudioFile>, AppError> {
        let sql = format!(
            "SELECT {} FROM audio_files WHERE user_id = $1 ORDER BY id",
            AUDIO_FILE_COLUMNS
        );
        let files = sqlx::query_as::<_, AudioFile>(&sql)
            .bind(user_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(files)
    }

    /// Record an uploaded file. A duplicate filename is reported as `Conflict`.
    pub async fn insert_audio_file(
        &mut self,
        filename: &str,
        file_path: &str,
        user_id: i64,
    ) -> Result<AudioFile, AppError> {
        let sql = format!(
            "INSERT INTO audio_files (filename, file_path, user_id) \
             VALUES ($1, $2, $3) \
             RETURNING {}",
            AUDIO_FILE_COLUMNS
        );
        let file = sqlx::query_as::<_, AudioFile>(&sql)
            .bind(filename)
            .bind(file_path)
            .bind(user_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(file)
    }
}
