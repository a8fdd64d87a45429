// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! # Document Store Module
//!
//! Persistent storage for marketplace entities as flat JSON documents,
//! one directory per collection under the data root.
//!
//! ## Storage Layout
//!
//! ```text
//! /data/
//!   accounts/{account_id}.json
//!   tasks/{task_id}.json
//!   submissions/{submission_id}.json
//!   payments/{payment_id}.json
//!   withdrawals/{withdrawal_id}.json
//!   notifications/{notification_id}.json
//! ```
//!
//! Balance mutations go through `AccountRepository::adjust_coins` only;
//! multi-document sequences (deduct-then-insert, check-then-transition)
//! are serialized by the ledger lock in `AppState`.

pub mod document_fs;
pub mod paths;
pub mod repository;

pub use document_fs::{DocumentStorage, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    AccountRepository, AvailableTaskFilter, NotificationRepository, PaymentRepository,
    StoredAccount, StoredNotification, StoredPayment, StoredSubmission, StoredTask,
    StoredWithdrawal, SubmissionRepository, SubmissionStatus, TaskRepository, TaskSort,
    WithdrawalRepository, WithdrawalStatus,
};
