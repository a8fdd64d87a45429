// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Payment record repository.
//!
//! A payment record is created at most once per external transaction ID;
//! the verified checkout path uses [`PaymentRepository::find_by_transaction`]
//! as its idempotency check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Persisted payment document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredPayment {
    /// Unique payment identifier (UUID).
    pub id: String,
    /// Buyer account credited by this payment.
    pub email: String,
    /// Amount paid in USD.
    pub price: f64,
    /// External processor transaction identifier.
    pub transaction_id: String,
    /// Coins credited.
    pub coins: i64,
    /// Processor-reported status (`succeeded` on the verified path).
    pub status: String,
    /// When the payment was recorded.
    pub date: DateTime<Utc>,
}

/// Repository for payment documents.
pub struct PaymentRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new PaymentRepository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a payment exists by ID.
    pub fn exists(&self, payment_id: &str) -> bool {
        self.storage.exists(self.storage.paths().payment(payment_id))
    }

    /// Get a payment by ID.
    pub fn get(&self, payment_id: &str) -> StorageResult<StoredPayment> {
        let path = self.storage.paths().payment(payment_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Payment {payment_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new payment record.
    pub fn create(&self, payment: &StoredPayment) -> StorageResult<()> {
        if self.exists(&payment.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Payment {}",
                payment.id
            )));
        }
        self.storage
            .write_json(self.storage.paths().payment(&payment.id), payment)
    }

    /// Find a payment by its external transaction identifier.
    pub fn find_by_transaction(&self, transaction_id: &str) -> StorageResult<Option<StoredPayment>> {
        for payment in self.list_all()? {
            if payment.transaction_id == transaction_id {
                return Ok(Some(payment));
            }
        }
        Ok(None)
    }

    /// List all payment records.
    pub fn list_all(&self) -> StorageResult<Vec<StoredPayment>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().payments_dir(), "json")?;

        let mut payments = Vec::new();
        for id in ids {
            if let Ok(payment) = self.get(&id) {
                payments.push(payment);
            }
        }
        Ok(payments)
    }

    /// List payments for an account, newest first.
    pub fn list_by_email(&self, email: &str) -> StorageResult<Vec<StoredPayment>> {
        let mut payments: Vec<StoredPayment> = self
            .list_all()?
            .into_iter()
            .filter(|p| p.email == email)
            .collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(payments)
    }

    /// Sum of all payment prices (platform revenue).
    pub fn total_revenue(&self) -> StorageResult<f64> {
        Ok(self.list_all()?.iter().map(|p| p.price).sum())
    }
}
