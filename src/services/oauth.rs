// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth 2.0 authorization-code client for the identity provider.
//!
//! Handles:
//! - Building the provider authorization URL
//! - Exchanging a one-time code for a provider access token
//! - Fetching the external profile with that token
//!
//! Defaults target Yandex ID; every endpoint is configurable.

use crate::config::Config;
use crate::error::AppError;
use crate::models::ExternalProfile;
use axum::http::StatusCode;
use serde::Deserialize;

/// OAuth provider client.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_url: String,
    token_url: String,
    userinfo_url: String,
}

/// Token endpoint response (only the field we use).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Userinfo endpoint response (Yandex ID field names).
#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    default_email: Option<String>,
}

impl From<UserInfoResponse> for ExternalProfile {
    fn from(info: UserInfoResponse) -> Self {
        let name = [info.first_name, info.display_name, info.login]
            .into_iter()
            .flatten()
            .find(|n| !n.trim().is_empty())
            .unwrap_or_default();
        let email = info.default_email.filter(|e| !e.trim().is_empty());

        ExternalProfile {
            id: info.id,
            name,
            email,
        }
    }
}

impl OAuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
            redirect_uri: config.oauth_redirect_uri.clone(),
            authorize_url: config.oauth_authorize_url.clone(),
            token_url: config.oauth_token_url.clone(),
            userinfo_url: config.oauth_userinfo_url.clone(),
        }
    }

    /// URL the browser is redirected to in order to start login.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}",
            self.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri)
        )
    }

    /// Exchange the authorization code and fetch the user's external profile.
    ///
    /// Two sequential calls, no retries. A non-success status from either is
    /// reported with the provider's status code.
    pub async fn complete_login(&self, code: &str) -> Result<ExternalProfile, AppError> {
        let access_token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&access_token).await?;

        tracing::debug!(external_id = %profile.id, "Fetched external profile");
        Ok(profile)
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| bad_gateway(format!("Token exchange failed: {}", e)))?;

        let token: TokenResponse = check_response_json(response, "Failed to get token").await?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("OAuth {}", access_token),
            )
            .send()
            .await
            .map_err(|e| bad_gateway(format!("User info request failed: {}", e)))?;

        let info: UserInfoResponse =
            check_response_json(response, "Failed to get user info").await?;
        Ok(info.into())
    }
}

fn bad_gateway(message: String) -> AppError {
    AppError::Upstream {
        status: StatusCode::BAD_GATEWAY,
        message,
    }
}

/// Check response status, passing the provider's status through on failure,
/// then parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    failure: &str,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "{}", failure);

        let status =
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(AppError::Upstream {
            status,
            message: failure.to_string(),
        });
    }

    response
        .json()
        .await
        .map_err(|e| bad_gateway(format!("{}: malformed response: {}", failure, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url() {
        let config = Config::test_default();
        let client = OAuthClient::new(&config);

        assert_eq!(
            client.authorization_url(),
            "https://oauth.yandex.ru/authorize?response_type=code&client_id=test_client_id\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fauth%2Fprovider%2Fcallback"
        );
    }

    #[test]
    fn test_profile_name_fallbacks() {
        let info: UserInfoResponse = serde_json::from_value(serde_json::json!({
            "id": "42",
            "first_name": "",
            "display_name": "ivan.p",
            "default_email": "ivan@example.com"
        }))
        .unwrap();
        let profile = ExternalProfile::from(info);

        assert_eq!(profile.id, "42");
        assert_eq!(profile.name, "ivan.p");
        assert_eq!(profile.email.as_deref(), Some("ivan@example.com"));
    }

    #[test]
    fn test_profile_without_email_or_name() {
        let info: UserInfoResponse =
            serde_json::from_value(serde_json::json!({ "id": "42", "default_email": "" }))
                .unwrap();
        let profile = ExternalProfile::from(info);

        assert_eq!(profile.name, "");
        assert_eq!(profile.email, None);
    }
}
