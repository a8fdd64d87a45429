// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Notification endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{NotificationRepository, StoredNotification},
};

/// List the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/notifications/{email}",
    tag = "Notifications",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Recipient email")),
    responses(
        (status = 200, body = [StoredNotification]),
        (status = 403, description = "Not the caller's own email"),
    )
)]
pub async fn list_notifications(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<StoredNotification>>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let repo = NotificationRepository::new(state.storage());
    Ok(Json(repo.list_by_recipient(&email.to_lowercase())?))
}
