// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token issuing and verification (JWT).
//!
//! Tokens carry the provider identity id as `sub` plus `iat`/`exp`. They are
//! stateless: verification needs only the shared secret and algorithm, and
//! nothing is revoked server-side.

use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime used when the caller does not pass one.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (provider identity id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Creates and verifies signed, time-limited identity assertions.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    /// Build from a raw HMAC secret and algorithm.
    pub fn new(signing_key: &[u8], algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
            default_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_signing_key, config.jwt_algorithm)
    }

    /// Issue a token with the default lifetime (15 minutes).
    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        self.issue_with_ttl(subject, self.default_ttl)
    }

    /// Issue a token valid for `ttl` from now.
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> anyhow::Result<String> {
        self.issue_at(subject, Utc::now(), ttl)
    }

    /// Issue a token as if it were created at `issued_at`.
    pub(crate) fn issue_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> anyhow::Result<String> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| anyhow::anyhow!("token lifetime {} out of range", ttl))?;
        let iat = issued_at.timestamp();
        let exp = expires_at.timestamp();
        if iat < 0 || exp < 0 {
            anyhow::bail!("token timestamps before the Unix epoch");
        }

        let claims = Claims {
            sub: subject.to_string(),
            iat: iat as usize,
            exp: exp as usize,
        };

        Ok(encode(
            &Header::new(self.algorithm),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Check signature and expiry; returns the subject if the token is valid.
    pub fn verify(&self, token: &str) -> Option<String> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) if !data.claims.sub.is_empty() => Some(data.claims.sub),
            Ok(_) => {
                tracing::debug!("Rejected token with empty subject");
                None
            }
            Err(e) => {
                tracing::debug!(reason = ?e.kind(), "Rejected token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    fn service() -> TokenService {
        TokenService::new(KEY, Algorithm::HS256)
    }

    fn decode_unvalidated(token: &str) -> Claims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        decode::<Claims>(token, &DecodingKey::from_secret(KEY), &validation)
            .unwrap()
            .claims
    }

    #[test]
    fn test_issue_then_verify_returns_subject() {
        let tokens = service();
        let token = tokens.issue("1130000012345678").unwrap();

        assert_eq!(tokens.verify(&token), Some("1130000012345678".to_string()));
    }

    #[test]
    fn test_default_ttl_is_fifteen_minutes() {
        let token = service().issue("abc").unwrap();
        let claims = decode_unvalidated(&token);

        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_custom_ttl() {
        let token = service()
            .issue_with_ttl("abc", Duration::minutes(30))
            .unwrap();
        let claims = decode_unvalidated(&token);

        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::minutes(20);
        let token = tokens
            .issue_at("abc", issued_at, Duration::minutes(15))
            .unwrap();

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn test_just_expired_token_is_invalid() {
        // No leeway: one second past exp is already rejected.
        let tokens = service();
        let issued_at = Utc::now() - Duration::seconds(61);
        let token = tokens
            .issue_at("abc", issued_at, Duration::seconds(60))
            .unwrap();

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        let result = service().issue_with_ttl("abc", Duration::minutes(1_000_000_000_000));

        assert!(result.is_err());
    }

    #[test]
    fn test_same_instant_same_token() {
        let tokens = service();
        let now = Utc::now();
        let a = tokens.issue_at("abc", now, Duration::minutes(5)).unwrap();
        let b = tokens.issue_at("abc", now, Duration::minutes(5)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = service().issue("abc").unwrap();
        let other = TokenService::new(b"another_secret_entirely_32bytes!", Algorithm::HS256);

        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn test_algorithm_mismatch_is_invalid() {
        let token = service().issue("abc").unwrap();
        let hs512 = TokenService::new(KEY, Algorithm::HS512);

        assert_eq!(hs512.verify(&token), None);
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let tokens = service();
        let token = tokens.issue("abc").unwrap();
        let forged = tokens.issue("xyz").unwrap();

        // Splice the other token's payload onto the original signature.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(tokens.verify(&spliced), None);
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let tokens = service();

        assert_eq!(tokens.verify(""), None);
        assert_eq!(tokens.verify("not-a-jwt"), None);
        assert_eq!(tokens.verify("invalid.token.here"), None);
    }

    #[test]
    fn test_missing_subject_is_invalid() {
        #[derive(Serialize)]
        struct NoSub {
            exp: usize,
        }

        let exp = (Utc::now() + Duration::minutes(5)).timestamp() as usize;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoSub { exp },
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();

        assert_eq!(service().verify(&token), None);
    }
}
