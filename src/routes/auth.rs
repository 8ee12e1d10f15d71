// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth login routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::services::directory;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/provider", get(auth_start))
        .route("/auth/provider/callback", get(auth_callback))
}

/// Start OAuth flow - redirect to the provider's authorization page.
async fn auth_start(State(state): State<Arc<AppState>>) -> Redirect {
    tracing::info!("Starting OAuth flow, redirecting to provider");
    Redirect::temporary(&state.oauth_client.authorization_url())
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Session token handed to the client after login.
#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// OAuth callback - exchange code, upsert the local user, issue a session token.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<TokenResponse>> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from provider");
        return Err(AppError::BadRequest(format!(
            "OAuth provider returned error: {}",
            error
        )));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'code' parameter".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    let profile = state.oauth_client.complete_login(&code).await?;

    let mut uow = state.db.begin().await?;
    let user = directory::find_or_create(&mut uow, &profile).await?;
    uow.commit().await?;

    let access_token = state
        .token_service
        .issue_with_ttl(&user.external_id, state.config.access_token_ttl)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = user.id, "OAuth successful, session token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
