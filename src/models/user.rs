//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User row stored in PostgreSQL.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Local, stable identifier
    pub id: i64,
    /// Identity id issued by the OAuth provider (unique)
    pub external_id: String,
    /// Display name
    pub name: String,
    /// Email address (None if the provider did not share one)
    pub email: Option<String>,
    /// Elevated privilege: may delete any user
    pub is_superuser: bool,
    /// When the user first logged in
    pub created_at: DateTime<Utc>,
}

/// Profile returned by the OAuth provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}
