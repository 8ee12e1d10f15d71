// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Audio upload route.

use crate::error::{AppError, Result};
use crate::middleware::auth::{resolve_user, AuthSubject};
use crate::services::storage::validate_filename;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/upload-audio", post(upload_audio))
}

#[derive(Deserialize, Default)]
struct UploadParams {
    /// Target filename; overrides the multipart fields when present.
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UploadResponse {
    pub info: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub filename: String,
}

/// Parts of the multipart body we care about.
#[derive(Default)]
struct UploadForm {
    bytes: Option<Bytes>,
    /// Name the client gave the `file` part
    original_name: Option<String>,
    /// Explicit `filename` text field
    filename_field: Option<String>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                form.original_name = field.file_name().map(str::to_string);
                form.bytes = Some(field.bytes().await.map_err(multipart_error)?);
            }
            Some("filename") => {
                let text = field.text().await.map_err(multipart_error)?;
                if !text.trim().is_empty() {
                    form.filename_field = Some(text);
                }
            }
            _ => {
                tracing::debug!(field = ?name, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

/// Upload an audio file under the caller's identity.
///
/// Any authenticated user may upload. A filename that is already taken
/// (recorded or on disk) is a conflict; nothing is overwritten.
async fn upload_audio(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<AuthSubject>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    // Short lookup; no connection is held while the body streams in.
    let user = {
        let mut uow = state.db.begin().await?;
        let user = resolve_user(&mut uow, &subject).await?;
        uow.commit().await?;
        user
    };

    let form = read_form(&mut multipart).await?;
    let bytes = form
        .bytes
        .ok_or_else(|| AppError::BadRequest("Missing 'file' part".to_string()))?;
    let filename = params
        .filename
        .filter(|f| !f.trim().is_empty())
        .or(form.filename_field)
        .or(form.original_name)
        .ok_or_else(|| AppError::BadRequest("No filename given".to_string()))?;

    validate_filename(&filename)?;

    let mut uow = state.db.begin().await?;
    if uow.find_audio_file_by_filename(&filename).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "File '{}' already exists",
            filename
        )));
    }

    let path = state.audio_store.write_new(&filename, &bytes).await?;
    let file_path = path.to_string_lossy().into_owned();

    let recorded = match uow.insert_audio_file(&filename, &file_path, user.id).await {
        Ok(file) => uow.commit().await.map(|_| file),
        Err(e) => Err(e),
    };

    let file = match recorded {
        Ok(file) => file,
        Err(e) => {
            // The bytes are ours (exclusive create); don't orphan them.
            state.audio_store.remove(&path).await;
            return Err(e);
        }
    };

    tracing::info!(
        user_id = user.id,
        file_id = file.id,
        filename = %file.filename,
        size = bytes.len(),
        "Audio file uploaded"
    );

    Ok(Json(UploadResponse {
        info: format!("File '{}' uploaded successfully", file.filename),
        id: file.id,
        filename: file.filename,
    }))
}
