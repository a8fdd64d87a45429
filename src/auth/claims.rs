// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! JWT claims, token issuance, and verification.
//!
//! Tokens are signed with HS256 using the shared secret from
//! `ACCESS_TOKEN_SECRET`. The subject claim carries the account email,
//! which is the identity every ownership check compares against.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::AuthError;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Token lifetime in seconds (1 hour).
const TOKEN_TTL_SECS: i64 = 3600;

/// Claims carried in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account email
    pub sub: String,

    /// Display name at issuance time (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated user information extracted from a verified token.
///
/// This is the primary type handlers use to represent the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Account email (the `sub` claim)
    pub email: String,

    /// Display name (if present in the token)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Check that the caller owns the resource keyed by `email`.
    ///
    /// Comparison is case-insensitive since emails are stored lowercased
    /// but clients may send mixed case in path segments.
    pub fn ensure_owns(&self, email: &str) -> Result<(), AuthError> {
        if self.email.eq_ignore_ascii_case(email) {
            Ok(())
        } else {
            Err(AuthError::OwnershipMismatch)
        }
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            name: claims.name,
            expires_at: claims.exp,
        }
    }
}

/// Signing and verification keys for access tokens.
///
/// Both keys derive from the same HS256 shared secret. Cloning is cheap;
/// the keys live behind `Arc` so `AppState` stays `Clone`.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl AuthKeys {
    /// Build keys from the shared secret.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    /// Issue a signed access token for the given identity.
    pub fn issue_token(&self, email: &str, name: Option<&str>) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: email.to_lowercase(),
            name: name.map(str::to_string),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }

    /// Verify a token and extract the authenticated user.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;

        let token_data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            })?;

        Ok(token_data.claims.into())
    }
}
