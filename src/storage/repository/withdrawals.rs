// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Withdrawal request repository.
//!
//! Coins stay on the worker's account until an admin approves the request;
//! approval is the only transition and is allowed exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Withdrawal lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Waiting for admin approval.
    Pending,
    /// Approved; coins have been deducted.
    Approved,
}

/// Persisted withdrawal document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredWithdrawal {
    /// Unique withdrawal identifier (UUID).
    pub id: String,
    /// Worker requesting the payout.
    pub worker_email: String,
    /// Worker display name.
    pub worker_name: String,
    /// Coins to convert.
    pub withdrawal_coin: i64,
    /// Payout amount in USD.
    pub withdrawal_amount: f64,
    /// Payout channel (e.g. `bkash`, `bank`).
    pub payment_system: String,
    /// Payout account number.
    pub account_number: String,
    /// Current status.
    pub status: WithdrawalStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Repository for withdrawal documents.
pub struct WithdrawalRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> WithdrawalRepository<'a> {
    /// Create a new WithdrawalRepository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a withdrawal exists.
    pub fn exists(&self, withdrawal_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().withdrawal(withdrawal_id))
    }

    /// Get a withdrawal by ID.
    pub fn get(&self, withdrawal_id: &str) -> StorageResult<StoredWithdrawal> {
        let path = self.storage.paths().withdrawal(withdrawal_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Withdrawal {withdrawal_id}"
            )));
        }
        self.storage.read_json(path)
    }

    /// Create a new withdrawal request.
    pub fn create(&self, withdrawal: &StoredWithdrawal) -> StorageResult<()> {
        if self.exists(&withdrawal.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Withdrawal {}",
                withdrawal.id
            )));
        }
        self.storage
            .write_json(self.storage.paths().withdrawal(&withdrawal.id), withdrawal)
    }

    /// Update an existing withdrawal document.
    pub fn update(&self, withdrawal: &StoredWithdrawal) -> StorageResult<()> {
        if !self.exists(&withdrawal.id) {
            return Err(StorageError::NotFound(format!(
                "Withdrawal {}",
                withdrawal.id
            )));
        }
        self.storage
            .write_json(self.storage.paths().withdrawal(&withdrawal.id), withdrawal)
    }

    /// List all withdrawal requests, oldest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredWithdrawal>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().withdrawals_dir(), "json")?;

        let mut withdrawals = Vec::new();
        for id in ids {
            if let Ok(withdrawal) = self.get(&id) {
                withdrawals.push(withdrawal);
            }
        }
        withdrawals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(withdrawals)
    }

    /// List pending withdrawal requests (admin review queue).
    pub fn list_pending(&self) -> StorageResult<Vec<StoredWithdrawal>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|w| w.status == WithdrawalStatus::Pending)
            .collect())
    }
}
