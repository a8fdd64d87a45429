// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Path constants and utilities for the document store layout.

use std::path::{Path, PathBuf};

/// Base directory for all persisted documents.
pub const DATA_ROOT: &str = "/data";

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Account Paths ==========

    /// Directory containing all accounts.
    pub fn accounts_dir(&self) -> PathBuf {
        self.root.join("accounts")
    }

    /// Path to a specific account document.
    pub fn account(&self, account_id: &str) -> PathBuf {
        self.accounts_dir().join(format!("{account_id}.json"))
    }

    // ========== Task Paths ==========

    /// Directory containing all tasks.
    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    /// Path to a specific task document.
    pub fn task(&self, task_id: &str) -> PathBuf {
        self.tasks_dir().join(format!("{task_id}.json"))
    }

    // ========== Submission Paths ==========

    /// Directory containing all submissions.
    pub fn submissions_dir(&self) -> PathBuf {
        self.root.join("submissions")
    }

    /// Path to a specific submission document.
    pub fn submission(&self, submission_id: &str) -> PathBuf {
        self.submissions_dir().join(format!("{submission_id}.json"))
    }

    // ========== Payment Paths ==========

    /// Directory containing all payment records.
    pub fn payments_dir(&self) -> PathBuf {
        self.root.join("payments")
    }

    /// Path to a specific payment document.
    pub fn payment(&self, payment_id: &str) -> PathBuf {
        self.payments_dir().join(format!("{payment_id}.json"))
    }

    // ========== Withdrawal Paths ==========

    /// Directory containing all withdrawal requests.
    pub fn withdrawals_dir(&self) -> PathBuf {
        self.root.join("withdrawals")
    }

    /// Path to a specific withdrawal document.
    pub fn withdrawal(&self, withdrawal_id: &str) -> PathBuf {
        self.withdrawals_dir().join(format!("{withdrawal_id}.json"))
    }

    // ========== Notification Paths ==========

    /// Directory containing all notifications.
    pub fn notifications_dir(&self) -> PathBuf {
        self.root.join("notifications")
    }

    /// Path to a specific notification document.
    pub fn notification(&self, notification_id: &str) -> PathBuf {
        self.notifications_dir()
            .join(format!("{notification_id}.json"))
    }
}
