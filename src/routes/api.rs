// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile and audio listing routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::{authorize, Access, AuthSubject};
use crate::models::AudioFile;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v1/user/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/api/v1/user/{id}/audio-files", get(list_audio_files))
}

// ─── User Profile ────────────────────────────────────────────

/// Profile response.
#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

/// Get a user's own profile.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<AuthSubject>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>> {
    let mut uow = state.db.begin().await?;
    let user = authorize(&mut uow, &subject, user_id, Access::Owner).await?;

    Ok(Json(UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}

/// Partial profile update; absent fields are left untouched.
#[derive(Deserialize, Validate, Debug, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserUpdateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ItemResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
}

/// Update a user's own profile.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<AuthSubject>,
    Path(user_id): Path<i64>,
    Json(update): Json<UserUpdateRequest>,
) -> Result<Json<ItemResponse>> {
    let mut uow = state.db.begin().await?;
    let user = authorize(&mut uow, &subject, user_id, Access::Owner).await?;

    update
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let updated = uow
        .update_user_profile(user.id, update.name.as_deref(), update.email.as_deref())
        .await?
        .ok_or(AppError::UserNotFound)?;
    uow.commit().await?;

    tracing::info!(
        user_id = updated.id,
        name_changed = update.name.is_some(),
        email_changed = update.email.is_some(),
        "Profile updated"
    );

    Ok(Json(ItemResponse { id: updated.id }))
}

// ─── Account Deletion ────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteUserResponse {
    pub detail: String,
}

/// Delete a user and their audio files. Requires elevated privilege.
///
/// The user row and its `audio_files` rows go in one transaction; the
/// files on disk are removed only after that commits.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<AuthSubject>,
    Path(user_id): Path<i64>,
) -> Result<Json<DeleteUserResponse>> {
    let mut uow = state.db.begin().await?;
    let caller = authorize(&mut uow, &subject, user_id, Access::Delete).await?;

    let owned_files = uow.list_audio_files_for_user(user_id).await?;
    if !uow.delete_user(user_id).await? {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }
    uow.commit().await?;

    tracing::info!(
        user_id,
        deleted_by = caller.id,
        files = owned_files.len(),
        "User deleted"
    );

    for file in &owned_files {
        state.audio_store.remove(&PathBuf::from(&file.file_path)).await;
    }

    Ok(Json(DeleteUserResponse {
        detail: format!("User {} deleted", user_id),
    }))
}

// ─── Audio Files ─────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AudioFileResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub filename: String,
    pub file_path: String,
}

impl From<AudioFile> for AudioFileResponse {
    fn from(file: AudioFile) -> Self {
        Self {
            id: file.id,
            filename: file.filename,
            file_path: file.file_path,
        }
    }
}

/// List a user's own audio files. No files is an empty list, not an error.
async fn list_audio_files(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<AuthSubject>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<AudioFileResponse>>> {
    let mut uow = state.db.begin().await?;
    let user = authorize(&mut uow, &subject, user_id, Access::Owner).await?;

    let files = uow.list_audio_files_for_user(user.id).await?;
    tracing::debug!(user_id = user.id, count = files.len(), "Listing audio files");

    Ok(Json(files.into_iter().map(AudioFileResponse::from).collect()))
}
