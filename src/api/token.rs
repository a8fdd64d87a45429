// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Token issuance endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Request body for POST /jwt.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct IssueTokenRequest {
    /// Account email to issue the token for
    pub email: String,
    /// Display name to embed in the token
    #[serde(default)]
    pub name: Option<String>,
}

/// Response for POST /jwt.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueTokenResponse {
    /// Signed access token (1 hour expiry)
    pub token: String,
}

/// Issue an access token for an email identity.
///
/// The frontend calls this after its own sign-in flow completes; the
/// token then gates every protected route.
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Signed access token", body = IssueTokenResponse),
        (status = 400, description = "Empty email"),
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("email must not be empty"));
    }

    let token = state
        .auth()
        .issue_token(email, request.name.as_deref())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(IssueTokenResponse { token }))
}
