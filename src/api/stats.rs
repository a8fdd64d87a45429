// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Dashboard statistics endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{AdminOnly, Auth, Role},
    error::ApiError,
    state::AppState,
    storage::{
        AccountRepository, PaymentRepository, StoredSubmission, SubmissionRepository,
        SubmissionStatus, TaskRepository,
    },
};

/// Response for GET /admin-stats.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_workers: usize,
    pub total_buyers: usize,
    /// Sum of all account balances
    pub total_coins: i64,
    /// Sum of all recorded payment prices (USD)
    pub total_payments: f64,
}

/// Response for GET /buyer-stats/{email}.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerStats {
    pub total_tasks: usize,
    /// Sum of open slots across the buyer's tasks
    pub pending_tasks: i64,
    /// Total USD the buyer has paid in
    pub total_payment: f64,
}

/// Response for GET /worker-stats/{email}.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkerStats {
    pub total_submissions: usize,
    pub pending_submissions: usize,
    /// Coins earned through approved submissions
    pub total_earnings: i64,
    /// The approved submissions themselves
    pub approved_submissions: Vec<StoredSubmission>,
}

/// Platform-wide totals for the admin dashboard.
#[utoipa::path(
    get,
    path = "/admin-stats",
    tag = "Stats",
    security(("bearer" = [])),
    responses(
        (status = 200, body = AdminStats),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn admin_stats(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<AdminStats>, ApiError> {
    let accounts = AccountRepository::new(state.storage()).list_all()?;
    let total_payments = PaymentRepository::new(state.storage()).total_revenue()?;

    Ok(Json(AdminStats {
        total_workers: accounts.iter().filter(|a| a.role == Role::Worker).count(),
        total_buyers: accounts.iter().filter(|a| a.role == Role::Buyer).count(),
        total_coins: accounts.iter().map(|a| a.coins).sum(),
        total_payments,
    }))
}

/// Totals for the buyer dashboard.
#[utoipa::path(
    get,
    path = "/buyer-stats/{email}",
    tag = "Stats",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Buyer email")),
    responses(
        (status = 200, body = BuyerStats),
        (status = 403, description = "Not the caller's own email"),
    )
)]
pub async fn buyer_stats(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<BuyerStats>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let email = email.to_lowercase();

    let tasks = TaskRepository::new(state.storage()).list_by_buyer(&email)?;
    let payments = PaymentRepository::new(state.storage()).list_by_email(&email)?;

    Ok(Json(BuyerStats {
        total_tasks: tasks.len(),
        pending_tasks: tasks.iter().map(|t| t.required_workers).sum(),
        total_payment: payments.iter().map(|p| p.price).sum(),
    }))
}

/// Totals for the worker dashboard, with the approved submissions inline.
#[utoipa::path(
    get,
    path = "/worker-stats/{email}",
    tag = "Stats",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Worker email")),
    responses(
        (status = 200, body = WorkerStats),
        (status = 403, description = "Not the caller's own email"),
    )
)]
pub async fn worker_stats(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<WorkerStats>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let email = email.to_lowercase();

    let submissions = SubmissionRepository::new(state.storage()).list_by_worker(&email)?;
    let pending = submissions
        .iter()
        .filter(|s| s.status == SubmissionStatus::Pending)
        .count();
    let approved: Vec<StoredSubmission> = submissions
        .iter()
        .filter(|s| s.status == SubmissionStatus::Approved)
        .cloned()
        .collect();

    Ok(Json(WorkerStats {
        total_submissions: submissions.len(),
        pending_submissions: pending,
        total_earnings: approved.iter().map(|s| s.payable_amount).sum(),
        approved_submissions: approved,
    }))
}
