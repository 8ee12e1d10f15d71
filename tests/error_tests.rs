// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use audio_depot::error::AppError;
use axum::http::StatusCode;
use axum::response::IntoResponse;

async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn test_status_mapping() {
    assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::UserNotFound.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        AppError::Forbidden("no".to_string()).status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        AppError::Conflict("dup".to_string()).status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::NotFound("x".to_string()).status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::BadRequest("x".to_string()).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::PayloadTooLarge("x".to_string()).status(),
        StatusCode::PAYLOAD_TOO_LARGE
    );
    assert_eq!(
        AppError::Database("x".to_string()).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Internal(anyhow::anyhow!("boom")).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_upstream_status_passes_through() {
    let err = AppError::Upstream {
        status: StatusCode::TOO_MANY_REQUESTS,
        message: "Failed to get token".to_string(),
    };
    assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_upstream_body_carries_message() {
    let (status, body) = body_json(AppError::Upstream {
        status: StatusCode::BAD_REQUEST,
        message: "Failed to get token".to_string(),
    })
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "upstream_error");
    assert_eq!(body["details"], "Failed to get token");
}

#[tokio::test]
async fn test_auth_error_kinds() {
    let (_, body) = body_json(AppError::Unauthenticated).await;
    assert_eq!(body["error"], "unauthenticated");

    let (_, body) = body_json(AppError::InvalidToken).await;
    assert_eq!(body["error"], "invalid_token");

    let (_, body) = body_json(AppError::UserNotFound).await;
    assert_eq!(body["error"], "user_not_found");
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    let (status, body) = body_json(AppError::Database("password=hunter2".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());

    let (_, body) = body_json(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
    assert_eq!(body["error"], "internal_error");
    assert!(body.get("details").is_none());
}

#[test]
fn test_non_database_sqlx_error_is_database_error() {
    let err: AppError = sqlx::Error::RowNotFound.into();
    assert!(matches!(err, AppError::Database(_)));
}
