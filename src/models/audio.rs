//! Uploaded audio file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded file. Created on upload, never mutated; removed together
/// with its owner.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AudioFile {
    pub id: i64,
    /// Name of the file, unique across all users
    pub filename: String,
    /// Where the bytes live on disk
    pub file_path: String,
    /// Owning user
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
