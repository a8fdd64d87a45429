// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Shared application state.
//!
//! Everything handlers need is injected here at startup; no globals.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::auth::AuthKeys;
use crate::providers::StripeClient;
use crate::storage::DocumentStorage;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<DocumentStorage>,
    auth: AuthKeys,
    /// Payment oracle client, built once at startup. `None` when the
    /// Stripe environment is not configured; payment endpoints then
    /// answer 503.
    stripe: Option<Arc<StripeClient>>,
    /// Serializes every read-then-write sequence that touches coin
    /// balances or slot counts. Single-process deployment makes a
    /// process-wide lock sufficient.
    ledger: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(storage: DocumentStorage, auth: AuthKeys, stripe: Option<StripeClient>) -> Self {
        Self {
            storage: Arc::new(storage),
            auth,
            stripe: stripe.map(Arc::new),
            ledger: Arc::new(Mutex::new(())),
        }
    }

    pub fn storage(&self) -> &DocumentStorage {
        &self.storage
    }

    pub fn auth(&self) -> &AuthKeys {
        &self.auth
    }

    pub fn stripe(&self) -> Option<&StripeClient> {
        self.stripe.as_deref()
    }

    /// Acquire the ledger lock.
    ///
    /// Hold the guard across the whole check-then-mutate sequence
    /// (balance checks, slot adjustments, payout idempotency checks).
    pub async fn lock_ledger(&self) -> MutexGuard<'_, ()> {
        self.ledger.lock().await
    }
}
