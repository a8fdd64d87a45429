// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Stripe integration for coin purchases.
//!
//! Two entry points exist on purpose:
//!
//! - `create_payment_intent` backs the embedded card form (Payment Element);
//!   the client confirms the intent and then reports the charge.
//! - `create_checkout_session` + `retrieve_checkout_session` back the hosted
//!   Checkout redirect; the server verifies the session before crediting,
//!   which makes it the trusted path.

use std::{collections::HashMap, time::Duration};

use reqwest::Client;
use serde_json::Value;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("Stripe configuration missing: {0}")]
    MissingConfig(String),

    #[error("Stripe request failed: {0}")]
    Request(String),

    #[error("Stripe response was invalid: {0}")]
    InvalidResponse(String),

    #[error("Stripe returned an error: {0}")]
    Api(String),
}

/// A hosted Checkout session created for a coin purchase.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

/// A Checkout session fetched back for verification.
#[derive(Debug, Clone)]
pub struct RetrievedSession {
    pub payment_status: String,
    pub payment_intent: Option<String>,
    pub customer_email: Option<String>,
    pub coins: Option<i64>,
    pub price: Option<f64>,
}

impl RetrievedSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    api_base_url: String,
    client_url: String,
    secret_key: String,
    http: Client,
}

impl StripeClient {
    pub fn is_configured() -> bool {
        env_optional("STRIPE_SECRET_KEY").is_some()
    }

    pub fn from_env() -> Result<Self, StripeError> {
        let secret_key = env_optional("STRIPE_SECRET_KEY")
            .ok_or_else(|| StripeError::MissingConfig("STRIPE_SECRET_KEY".to_string()))?;
        let api_base_url = env_or_default("STRIPE_API_BASE_URL", DEFAULT_API_BASE_URL);
        let client_url = env_or_default("CLIENT_URL", DEFAULT_CLIENT_URL);
        url::Url::parse(&client_url).map_err(|e| {
            StripeError::MissingConfig(format!("CLIENT_URL is not a valid URL: {e}"))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| StripeError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url,
            client_url,
            secret_key,
            http,
        })
    }

    /// Create a PaymentIntent for the embedded card form.
    ///
    /// Returns the client secret the frontend uses to confirm the charge.
    pub async fn create_payment_intent(&self, amount_cents: i64) -> Result<String, StripeError> {
        let mut form = HashMap::new();
        form.insert("amount".to_string(), amount_cents.to_string());
        form.insert("currency".to_string(), "usd".to_string());
        form.insert(
            "payment_method_types[]".to_string(),
            "card".to_string(),
        );

        let response = self.post_form("/v1/payment_intents", &form).await?;

        response
            .get("client_secret")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                StripeError::InvalidResponse("missing client_secret in response".to_string())
            })
    }

    /// Create a hosted Checkout session for a coin bundle.
    ///
    /// The purchase details ride along as session metadata so the
    /// verification step can credit the right account without trusting
    /// anything the client sends back.
    pub async fn create_checkout_session(
        &self,
        email: &str,
        coins: i64,
        price: f64,
    ) -> Result<CheckoutSession, StripeError> {
        let amount_cents = (price * 100.0).round() as i64;
        let client_url = self.client_url.trim_end_matches('/');

        let mut form = HashMap::new();
        form.insert("mode".to_string(), "payment".to_string());
        form.insert("customer_email".to_string(), email.to_string());
        form.insert(
            "line_items[0][price_data][currency]".to_string(),
            "usd".to_string(),
        );
        form.insert(
            "line_items[0][price_data][product_data][name]".to_string(),
            format!("{coins} coins"),
        );
        form.insert(
            "line_items[0][price_data][unit_amount]".to_string(),
            amount_cents.to_string(),
        );
        form.insert("line_items[0][quantity]".to_string(), "1".to_string());
        form.insert("metadata[email]".to_string(), email.to_string());
        form.insert("metadata[coins]".to_string(), coins.to_string());
        form.insert("metadata[price]".to_string(), price.to_string());
        form.insert(
            "success_url".to_string(),
            format!(
                "{client_url}/dashboard/payment/success?session_id={{CHECKOUT_SESSION_ID}}"
            ),
        );
        form.insert(
            "cancel_url".to_string(),
            format!("{client_url}/dashboard/purchase-coin"),
        );

        let response = self.post_form("/v1/checkout/sessions", &form).await?;

        let session_id = response
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StripeError::InvalidResponse("missing session id in response".to_string())
            })?
            .to_string();
        let url = response
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StripeError::InvalidResponse("missing session url in response".to_string())
            })?
            .to_string();

        Ok(CheckoutSession { session_id, url })
    }

    /// Fetch a Checkout session back from Stripe for verification.
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<RetrievedSession, StripeError> {
        let response = self
            .get_json(&format!("/v1/checkout/sessions/{session_id}"))
            .await?;

        let payment_status = response
            .get("payment_status")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StripeError::InvalidResponse("missing payment_status in response".to_string())
            })?
            .to_string();

        Ok(RetrievedSession {
            payment_status,
            payment_intent: response
                .get("payment_intent")
                .and_then(Value::as_str)
                .map(str::to_string),
            customer_email: response
                .pointer("/metadata/email")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| {
                    response
                        .get("customer_email")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                }),
            coins: response
                .pointer("/metadata/coins")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok()),
            price: response
                .pointer("/metadata/price")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok()),
        })
    }

    async fn post_form(
        &self,
        path: &str,
        form: &HashMap<String, String>,
    ) -> Result<Value, StripeError> {
        let response = self
            .http
            .post(format!(
                "{}{}",
                self.api_base_url.trim_end_matches('/'),
                path
            ))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(form)
            .send()
            .await
            .map_err(|e| StripeError::Request(format!("POST {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::Api(format!(
                "POST {path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))
    }

    async fn get_json(&self, path: &str) -> Result<Value, StripeError> {
        let response = self
            .http
            .get(format!(
                "{}{}",
                self.api_base_url.trim_end_matches('/'),
                path
            ))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| StripeError::Request(format!("GET {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StripeError::Api(format!(
                "GET {path} returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::InvalidResponse(format!("GET {path} invalid JSON: {e}")))
    }
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieved_session_paid_check() {
        let paid = RetrievedSession {
            payment_status: "paid".to_string(),
            payment_intent: Some("pi_123".to_string()),
            customer_email: Some("b@example.com".to_string()),
            coins: Some(100),
            price: Some(9.99),
        };
        assert!(paid.is_paid());

        let unpaid = RetrievedSession {
            payment_status: "unpaid".to_string(),
            payment_intent: None,
            customer_email: None,
            coins: None,
            price: None,
        };
        assert!(!unpaid.is_paid());
    }

    #[test]
    fn env_or_default_falls_back() {
        assert_eq!(
            env_or_default("STRIPE_TEST_UNSET_VAR", "fallback"),
            "fallback"
        );
    }
}
