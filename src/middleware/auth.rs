// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization gate.
//!
//! Every protected request goes through the same steps, in order:
//! 1. `Authorization: Bearer <token>` must be present ([`bearer_token`]).
//! 2. The token must verify ([`require_auth`] middleware).
//! 3. The subject must map to a local user ([`resolve_user`]).
//! 4. The user must be allowed to act on the target ([`authorize`]).
//!
//! Handlers perform no reads or writes on other entities until step 4 (or
//! step 3 for uploads) has passed.

use crate::db::UnitOfWork;
use crate::error::AppError;
use crate::models::User;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Verified token subject, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSubject {
    /// Provider identity id taken from the token's `sub` claim
    pub external_id: String,
}

/// What the caller wants to do with the target user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Read or modify one's own resources.
    Owner,
    /// Delete a user; requires elevated privilege, for any target.
    Delete,
}

/// Extract the token from a literal `Bearer <token>` header value.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthenticated)?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() && !token.contains(char::is_whitespace) => Ok(token),
        _ => Err(AppError::Unauthenticated),
    }
}

/// Middleware that requires a valid bearer token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;

    let external_id = state
        .token_service
        .verify(token)
        .ok_or(AppError::InvalidToken)?;

    request
        .extensions_mut()
        .insert(AuthSubject { external_id });

    Ok(next.run(request).await)
}

/// Load the local user behind a verified subject.
pub async fn resolve_user(uow: &mut UnitOfWork, subject: &AuthSubject) -> Result<User, AppError> {
    uow.find_user_by_external_id(&subject.external_id)
        .await?
        .ok_or(AppError::UserNotFound)
}

/// Resolve the caller and check they may perform `access` on `target_user_id`.
pub async fn authorize(
    uow: &mut UnitOfWork,
    subject: &AuthSubject,
    target_user_id: i64,
    access: Access,
) -> Result<User, AppError> {
    let user = resolve_user(uow, subject).await?;
    check_access(&user, target_user_id, access)?;
    Ok(user)
}

/// The access decision itself, given an already-resolved caller.
pub fn check_access(user: &User, target_user_id: i64, access: Access) -> Result<(), AppError> {
    match access {
        Access::Owner if user.id == target_user_id => Ok(()),
        Access::Owner => {
            tracing::warn!(
                user_id = user.id,
                target_user_id,
                "Rejected access to another user's resource"
            );
            Err(AppError::Forbidden(
                "You can only access your own resources".to_string(),
            ))
        }
        Access::Delete if user.is_superuser => Ok(()),
        Access::Delete => {
            tracing::warn!(user_id = user.id, target_user_id, "Rejected delete without privilege");
            Err(AppError::Forbidden(
                "Deleting users requires elevated privilege".to_string(),
            ))
        }
    }
}
