// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Payment endpoints (coin top-up).
//!
//! Two credit paths exist:
//!
//! - `POST /payments/success` verifies the Checkout session with Stripe
//!   before crediting, and is idempotent by transaction id. This is the
//!   trusted path.
//! - `POST /payments` records whatever the client reports after an
//!   embedded PaymentIntent confirmation. The credited account still
//!   comes from the token, but the amount is client-supplied.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::ApiError,
    providers::StripeClient,
    state::AppState,
    storage::{AccountRepository, PaymentRepository, StoredPayment},
};

/// Request body for POST /create-payment-intent.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateIntentRequest {
    /// Purchase price in USD
    pub price: f64,
}

/// Response for POST /create-payment-intent.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateIntentResponse {
    pub client_secret: String,
}

/// Request body for POST /create-checkout-session.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    /// Coins in the bundle
    pub coins: i64,
    /// Purchase price in USD
    pub price: f64,
}

/// Response for POST /create-checkout-session.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub url: String,
}

/// Request body for POST /payments/success.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PaymentSuccessRequest {
    pub session_id: String,
}

/// Request body for POST /payments.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordPaymentRequest {
    pub price: f64,
    pub coins: i64,
    pub transaction_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

fn stripe_client(state: &AppState) -> Result<&StripeClient, ApiError> {
    state.stripe().ok_or_else(|| {
        ApiError::service_unavailable("Payment provider is not configured")
    })
}

/// Create a PaymentIntent for the embedded card form.
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "Payments",
    security(("bearer" = [])),
    request_body = CreateIntentRequest,
    responses(
        (status = 200, body = CreateIntentResponse),
        (status = 503, description = "Payment provider not configured"),
    )
)]
pub async fn create_payment_intent(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>, ApiError> {
    if request.price <= 0.0 {
        return Err(ApiError::bad_request("price must be positive"));
    }

    let stripe = stripe_client(&state)?;
    let amount_cents = (request.price * 100.0).round() as i64;
    let client_secret = stripe
        .create_payment_intent(amount_cents)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(CreateIntentResponse { client_secret }))
}

/// Create a hosted Checkout session for a coin bundle.
#[utoipa::path(
    post,
    path = "/create-checkout-session",
    tag = "Payments",
    security(("bearer" = [])),
    request_body = CreateSessionRequest,
    responses(
        (status = 200, body = CreateSessionResponse),
        (status = 503, description = "Payment provider not configured"),
    )
)]
pub async fn create_checkout_session(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    if request.price <= 0.0 || request.coins <= 0 {
        return Err(ApiError::bad_request("coins and price must be positive"));
    }

    let stripe = stripe_client(&state)?;
    let session = stripe
        .create_checkout_session(&user.email, request.coins, request.price)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(CreateSessionResponse {
        session_id: session.session_id,
        url: session.url,
    }))
}

/// Verify a Checkout session and credit the purchased coins.
///
/// Fetches the session back from Stripe, requires `payment_status ==
/// "paid"`, and keys the payment record on the payment intent id so a
/// replayed success redirect credits nothing the second time.
#[utoipa::path(
    post,
    path = "/payments/success",
    tag = "Payments",
    security(("bearer" = [])),
    request_body = PaymentSuccessRequest,
    responses(
        (status = 200, body = StoredPayment),
        (status = 400, description = "Session is not paid or carries no purchase metadata"),
        (status = 503, description = "Payment provider not configured"),
    )
)]
pub async fn payment_success(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<PaymentSuccessRequest>,
) -> Result<Json<StoredPayment>, ApiError> {
    let stripe = stripe_client(&state)?;
    let session = stripe
        .retrieve_checkout_session(&request.session_id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    if !session.is_paid() {
        return Err(ApiError::bad_request("Payment has not completed"));
    }
    let coins = session
        .coins
        .ok_or_else(|| ApiError::bad_request("Session carries no coin metadata"))?;
    let price = session.price.unwrap_or(0.0);
    let email = session
        .customer_email
        .unwrap_or_else(|| user.email.clone())
        .to_lowercase();
    let transaction_id = session
        .payment_intent
        .unwrap_or_else(|| request.session_id.clone());

    let payments = PaymentRepository::new(state.storage());
    let accounts = AccountRepository::new(state.storage());

    let _ledger = state.lock_ledger().await;

    if let Some(existing) = payments.find_by_transaction(&transaction_id)? {
        return Ok(Json(existing));
    }

    let payment = StoredPayment {
        id: Uuid::new_v4().to_string(),
        email: email.clone(),
        price,
        transaction_id,
        coins,
        status: "succeeded".to_string(),
        date: Utc::now(),
    };
    payments.create(&payment)?;
    accounts.adjust_coins(&email, coins)?;

    Ok(Json(payment))
}

/// Record a client-reported payment and credit the coins.
///
/// Backs the embedded PaymentIntent flow, where the charge confirmation
/// happens in the browser. The credited account comes from the token;
/// duplicate transaction ids return the original record without
/// crediting again.
#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    security(("bearer" = [])),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, body = StoredPayment),
        (status = 400, description = "Non-positive coin amount"),
        (status = 404, description = "Caller has no account"),
    )
)]
pub async fn record_payment(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<StoredPayment>), ApiError> {
    if request.coins <= 0 {
        return Err(ApiError::bad_request("coins must be positive"));
    }

    let payments = PaymentRepository::new(state.storage());
    let accounts = AccountRepository::new(state.storage());

    let _ledger = state.lock_ledger().await;

    if let Some(existing) = payments.find_by_transaction(&request.transaction_id)? {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let payment = StoredPayment {
        id: Uuid::new_v4().to_string(),
        email: user.email.clone(),
        price: request.price,
        transaction_id: request.transaction_id,
        coins: request.coins,
        status: request.status.unwrap_or_else(|| "succeeded".to_string()),
        date: Utc::now(),
    };
    payments.create(&payment)?;
    accounts.adjust_coins(&user.email, request.coins)?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// List the caller's payment history, newest first.
#[utoipa::path(
    get,
    path = "/payments/{email}",
    tag = "Payments",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Account email")),
    responses(
        (status = 200, body = [StoredPayment]),
        (status = 403, description = "Not the caller's own email"),
    )
)]
pub async fn payment_history(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<StoredPayment>>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let repo = PaymentRepository::new(state.storage());
    Ok(Json(repo.list_by_email(&email.to_lowercase())?))
}
