// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Repository layer providing typed access to the document store.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using DocumentStorage for all file operations.

pub mod accounts;
pub mod notifications;
pub mod payments;
pub mod submissions;
pub mod tasks;
pub mod withdrawals;

pub use accounts::{
    AccountRepository, StoredAccount, BUYER_STARTING_COINS, WORKER_STARTING_COINS,
};
pub use notifications::{NotificationRepository, StoredNotification};
pub use payments::{PaymentRepository, StoredPayment};
pub use submissions::{StoredSubmission, SubmissionRepository, SubmissionStatus};
pub use tasks::{AvailableTaskFilter, StoredTask, TaskRepository, TaskSort};
pub use withdrawals::{StoredWithdrawal, WithdrawalRepository, WithdrawalStatus};
