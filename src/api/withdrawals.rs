// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Withdrawal endpoints.
//!
//! A withdrawal request does not move coins; the deduction happens once,
//! when an admin approves it. The balance is checked at request time and
//! again at approval, both under the ledger lock.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    state::AppState,
    storage::{
        AccountRepository, NotificationRepository, StoredNotification, StoredWithdrawal,
        WithdrawalRepository, WithdrawalStatus,
    },
};

/// Conversion rate: coins per US dollar.
pub const COINS_PER_DOLLAR: i64 = 20;

/// Request body for POST /withdrawals.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateWithdrawalRequest {
    /// Coins to convert to cash
    pub withdrawal_coin: i64,
    /// Payout channel (e.g. `bkash`, `rocket`, `nagad`, `bank`)
    pub payment_system: String,
    /// Payout account number
    pub account_number: String,
}

/// Request a payout of earned coins.
#[utoipa::path(
    post,
    path = "/withdrawals",
    tag = "Withdrawals",
    security(("bearer" = [])),
    request_body = CreateWithdrawalRequest,
    responses(
        (status = 201, body = StoredWithdrawal),
        (status = 400, description = "Non-positive or unaffordable amount"),
        (status = 404, description = "Caller has no account"),
    )
)]
pub async fn create_withdrawal(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateWithdrawalRequest>,
) -> Result<(StatusCode, Json<StoredWithdrawal>), ApiError> {
    if request.withdrawal_coin <= 0 {
        return Err(ApiError::bad_request("withdrawal_coin must be positive"));
    }

    let accounts = AccountRepository::new(state.storage());
    let withdrawals = WithdrawalRepository::new(state.storage());

    let _ledger = state.lock_ledger().await;

    let worker = accounts
        .find_by_email(&user.email)?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;
    if worker.coins < request.withdrawal_coin {
        return Err(ApiError::bad_request(format!(
            "Insufficient coins: requested {}, balance is {}",
            request.withdrawal_coin, worker.coins
        )));
    }

    let withdrawal = StoredWithdrawal {
        id: Uuid::new_v4().to_string(),
        worker_email: worker.email,
        worker_name: worker.name,
        withdrawal_coin: request.withdrawal_coin,
        withdrawal_amount: request.withdrawal_coin as f64 / COINS_PER_DOLLAR as f64,
        payment_system: request.payment_system,
        account_number: request.account_number,
        status: WithdrawalStatus::Pending,
        created_at: Utc::now(),
    };
    withdrawals.create(&withdrawal)?;

    Ok((StatusCode::CREATED, Json(withdrawal)))
}

/// List pending withdrawal requests (admin review queue).
#[utoipa::path(
    get,
    path = "/withdrawals",
    tag = "Withdrawals",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [StoredWithdrawal]),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn list_pending_withdrawals(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredWithdrawal>>, ApiError> {
    let repo = WithdrawalRepository::new(state.storage());
    Ok(Json(repo.list_pending()?))
}

/// Approve a pending withdrawal.
///
/// Deducts the coins from the worker and notifies them. The transition
/// is allowed exactly once; the balance is re-checked here because the
/// worker may have spent coins since requesting.
#[utoipa::path(
    patch,
    path = "/withdrawals/{id}",
    tag = "Withdrawals",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Withdrawal ID")),
    responses(
        (status = 200, body = StoredWithdrawal),
        (status = 400, description = "Already approved, or balance no longer covers it"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such withdrawal"),
    )
)]
pub async fn approve_withdrawal(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredWithdrawal>, ApiError> {
    let withdrawals = WithdrawalRepository::new(state.storage());
    let accounts = AccountRepository::new(state.storage());
    let notifications = NotificationRepository::new(state.storage());

    let _ledger = state.lock_ledger().await;

    let mut withdrawal = withdrawals.get(&id)?;
    if withdrawal.status != WithdrawalStatus::Pending {
        return Err(ApiError::bad_request(
            "Withdrawal has already been approved",
        ));
    }

    let worker = accounts
        .find_by_email(&withdrawal.worker_email)?
        .ok_or_else(|| ApiError::not_found("Worker account not found"))?;
    if worker.coins < withdrawal.withdrawal_coin {
        return Err(ApiError::bad_request(format!(
            "Worker balance {} no longer covers the withdrawal of {}",
            worker.coins, withdrawal.withdrawal_coin
        )));
    }

    withdrawal.status = WithdrawalStatus::Approved;
    withdrawals.update(&withdrawal)?;
    accounts.adjust_coins(&withdrawal.worker_email, -withdrawal.withdrawal_coin)?;

    notifications.create(&StoredNotification::new(
        withdrawal.worker_email.clone(),
        format!(
            "Your withdrawal of {} coins (${:.2}) has been approved",
            withdrawal.withdrawal_coin, withdrawal.withdrawal_amount
        ),
        "/dashboard/withdrawals".to_string(),
    ))?;

    Ok(Json(withdrawal))
}
