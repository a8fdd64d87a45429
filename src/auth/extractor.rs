// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;
use crate::storage::AccountRepository;

/// Extractor for authenticated users.
///
/// Validates the bearer token from the Authorization header and yields
/// the caller's identity. Identity always comes from the verified token,
/// never from request bodies.
///
/// # Example
///
/// ```rust,ignore
/// async fn my_tasks(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<StoredTask>>, ApiError> {
///     // user.email is the verified caller identity
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Tests may pre-populate the identity via request extensions
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = state.auth().verify(token)?;

        Ok(Auth(user))
    }
}

/// Extractor that requires the admin role.
///
/// The role lives on the stored account, not in the token, so a role
/// change takes effect on the next request rather than at the next
/// token refresh.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        let repo = AccountRepository::new(state.storage());
        let account = repo
            .find_by_email(&user.email)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .ok_or(AuthError::InsufficientPermissions)?;

        if account.role != Role::Admin {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthKeys;
    use crate::storage::{DocumentStorage, StoragePaths, StoredAccount};
    use axum::http::Request;
    use std::env;
    use std::fs;

    fn create_test_state() -> AppState {
        let test_dir = env::temp_dir().join(format!("test-auth-extractor-{}", uuid::Uuid::new_v4()));
        let paths = StoragePaths::new(&test_dir);
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("initialize test storage");

        AppState::new(storage, AuthKeys::from_secret("test-secret"), None)
    }

    fn cleanup(state: &AppState) {
        let _ = fs::remove_dir_all(state.storage().paths().root());
    }

    fn empty_parts() -> Parts {
        Request::builder().uri("/test").body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = create_test_state();
        let mut parts = empty_parts();

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));

        cleanup(&state);
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_header() {
        let state = create_test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));

        cleanup(&state);
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_valid_token() {
        let state = create_test_state();
        let token = state
            .auth()
            .issue_token("w@example.com", Some("Worker"))
            .unwrap();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert_eq!(result.unwrap().0.email, "w@example.com");

        cleanup(&state);
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin_account() {
        let state = create_test_state();
        let repo = AccountRepository::new(state.storage());
        repo.create(&StoredAccount::new(
            "a1".to_string(),
            "w@example.com".to_string(),
            "Worker".to_string(),
            None,
            Role::Worker,
        ))
        .unwrap();

        let user = AuthenticatedUser {
            email: "w@example.com".to_string(),
            name: None,
            expires_at: 0,
        };
        let mut parts = empty_parts();
        parts.extensions.insert(user);

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));

        cleanup(&state);
    }

    #[tokio::test]
    async fn admin_only_rejects_unknown_account() {
        let state = create_test_state();

        let user = AuthenticatedUser {
            email: "ghost@example.com".to_string(),
            name: None,
            expires_at: 0,
        };
        let mut parts = empty_parts();
        parts.extensions.insert(user);

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));

        cleanup(&state);
    }

    #[tokio::test]
    async fn admin_only_accepts_stored_admin() {
        let state = create_test_state();
        let repo = AccountRepository::new(state.storage());
        repo.create(&StoredAccount::new(
            "a2".to_string(),
            "admin@example.com".to_string(),
            "Admin".to_string(),
            None,
            Role::Admin,
        ))
        .unwrap();

        let user = AuthenticatedUser {
            email: "admin@example.com".to_string(),
            name: None,
            expires_at: 0,
        };
        let mut parts = empty_parts();
        parts.extensions.insert(user);

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(result.is_ok());

        cleanup(&state);
    }
}
