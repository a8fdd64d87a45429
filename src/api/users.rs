// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Account endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{AdminOnly, Auth, Role},
    error::ApiError,
    state::AppState,
    storage::{AccountRepository, StoredAccount},
};

/// Request body for POST /users.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateAccountRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Response for POST /users.
///
/// A duplicate email is reported with a null `inserted_id` and a 200
/// status; the sign-in flow retries registration on every login and
/// treats the sentinel as "already registered".
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateAccountResponse {
    pub inserted_id: Option<String>,
}

/// Response for GET /users/role/{email}.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleLookupResponse {
    pub role: Role,
    pub coins: i64,
}

/// Request body for PATCH /users/{email}.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Request body for PATCH /users/role/{id}.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// Response for the role-flag lookups.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleFlagResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<bool>,
}

/// Register an account.
///
/// Duplicate emails are not an error: the response carries a null
/// `inserted_id` sentinel instead, so repeat sign-ins stay idempotent.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Created, or already registered", body = CreateAccountResponse),
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<CreateAccountResponse>, ApiError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::bad_request("email must not be empty"));
    }

    let repo = AccountRepository::new(state.storage());
    if repo.find_by_email(&email)?.is_some() {
        return Ok(Json(CreateAccountResponse { inserted_id: None }));
    }

    let account = StoredAccount::new(
        Uuid::new_v4().to_string(),
        email,
        request.name,
        request.image,
        request.role.unwrap_or_default(),
    );
    repo.create(&account)?;

    Ok(Json(CreateAccountResponse {
        inserted_id: Some(account.id),
    }))
}

/// Look up role and balance by email.
///
/// Unknown emails answer with the worker default and a zero balance
/// rather than a 404; the sign-in page calls this before registration.
#[utoipa::path(
    get,
    path = "/users/role/{email}",
    tag = "Users",
    params(("email" = String, Path, description = "Account email")),
    responses((status = 200, body = RoleLookupResponse))
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<RoleLookupResponse>, ApiError> {
    let repo = AccountRepository::new(state.storage());
    let response = match repo.find_by_email(&email.to_lowercase())? {
        Some(account) => RoleLookupResponse {
            role: account.role,
            coins: account.coins,
        },
        None => RoleLookupResponse {
            role: Role::default(),
            coins: 0,
        },
    };
    Ok(Json(response))
}

/// Top workers by coin balance (public leaderboard, capped at 6).
#[utoipa::path(
    get,
    path = "/users/best",
    tag = "Users",
    responses((status = 200, body = [StoredAccount]))
)]
pub async fn best_workers(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredAccount>>, ApiError> {
    let repo = AccountRepository::new(state.storage());
    Ok(Json(repo.best_workers(6)?))
}

/// List all accounts.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [StoredAccount]),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn list_accounts(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredAccount>>, ApiError> {
    let repo = AccountRepository::new(state.storage());
    Ok(Json(repo.list_all()?))
}

/// Check whether the caller's account has the admin role.
#[utoipa::path(
    get,
    path = "/users/admin/{email}",
    tag = "Users",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Account email")),
    responses((status = 200, body = RoleFlagResponse))
)]
pub async fn admin_flag(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<RoleFlagResponse>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let role = lookup_role(&state, &email)?;
    Ok(Json(RoleFlagResponse {
        admin: Some(role == Some(Role::Admin)),
        buyer: None,
        worker: None,
    }))
}

/// Check whether the caller's account has the buyer role.
#[utoipa::path(
    get,
    path = "/users/buyer/{email}",
    tag = "Users",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Account email")),
    responses((status = 200, body = RoleFlagResponse))
)]
pub async fn buyer_flag(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<RoleFlagResponse>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let role = lookup_role(&state, &email)?;
    Ok(Json(RoleFlagResponse {
        admin: None,
        buyer: Some(role == Some(Role::Buyer)),
        worker: None,
    }))
}

/// Check whether the caller's account has the worker role.
#[utoipa::path(
    get,
    path = "/users/worker/{email}",
    tag = "Users",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Account email")),
    responses((status = 200, body = RoleFlagResponse))
)]
pub async fn worker_flag(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<RoleFlagResponse>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let role = lookup_role(&state, &email)?;
    Ok(Json(RoleFlagResponse {
        admin: None,
        buyer: None,
        worker: Some(role == Some(Role::Worker)),
    }))
}

/// Fetch one account record by email.
#[utoipa::path(
    get,
    path = "/users/{email}",
    tag = "Users",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Account email")),
    responses(
        (status = 200, body = StoredAccount),
        (status = 404, description = "No such account"),
    )
)]
pub async fn get_account(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<StoredAccount>, ApiError> {
    let repo = AccountRepository::new(state.storage());
    let account = repo
        .find_by_email(&email.to_lowercase())?
        .ok_or_else(|| ApiError::not_found(format!("Account {email} not found")))?;
    Ok(Json(account))
}

/// Update the caller's own profile (name and image only).
#[utoipa::path(
    patch,
    path = "/users/{email}",
    tag = "Users",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Account email")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, body = StoredAccount),
        (status = 403, description = "Not the caller's own account"),
    )
)]
pub async fn update_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<StoredAccount>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;

    let repo = AccountRepository::new(state.storage());
    let account = repo.set_profile(&email.to_lowercase(), request.name, request.image)?;
    Ok(Json(account))
}

/// Change an account's role.
#[utoipa::path(
    patch,
    path = "/users/role/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Account ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, body = StoredAccount),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such account"),
    )
)]
pub async fn set_role(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<StoredAccount>, ApiError> {
    let repo = AccountRepository::new(state.storage());
    let account = repo.set_role(&id, request.role)?;
    Ok(Json(account))
}

/// Delete an account. Tasks and submissions referencing it are left alone.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Account ID")),
    responses(
        (status = 204),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such account"),
    )
)]
pub async fn delete_account(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = AccountRepository::new(state.storage());
    repo.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn lookup_role(state: &AppState, email: &str) -> Result<Option<Role>, ApiError> {
    let repo = AccountRepository::new(state.storage());
    Ok(repo
        .find_by_email(&email.to_lowercase())?
        .map(|account| account.role))
}
