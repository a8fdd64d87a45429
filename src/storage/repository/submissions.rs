// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Submission repository.
//!
//! A submission is a worker's claim of task completion. Its status is the
//! only state machine in the system: `pending -> approved` or
//! `pending -> rejected`, each transition allowed exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Submission lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Waiting for buyer review.
    Pending,
    /// Accepted; worker has been paid.
    Approved,
    /// Declined; the task slot was reopened.
    Rejected,
}

/// Persisted submission document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredSubmission {
    /// Unique submission identifier (UUID).
    pub id: String,
    /// Task this submission belongs to.
    pub task_id: String,
    /// Task title (denormalized for notifications and listings).
    pub task_title: String,
    /// Worker who submitted.
    pub worker_email: String,
    /// Worker display name.
    pub worker_name: String,
    /// Buyer who owns the task.
    pub buyer_email: String,
    /// Buyer display name.
    pub buyer_name: String,
    /// Coins paid to the worker on approval.
    pub payable_amount: i64,
    /// Proof-of-completion text supplied by the worker.
    pub details: String,
    /// Current status.
    pub status: SubmissionStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Repository for submission documents.
pub struct SubmissionRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> SubmissionRepository<'a> {
    /// Create a new SubmissionRepository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a submission exists.
    pub fn exists(&self, submission_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().submission(submission_id))
    }

    /// Get a submission by ID.
    pub fn get(&self, submission_id: &str) -> StorageResult<StoredSubmission> {
        let path = self.storage.paths().submission(submission_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Submission {submission_id}"
            )));
        }
        self.storage.read_json(path)
    }

    /// Create a new submission document.
    pub fn create(&self, submission: &StoredSubmission) -> StorageResult<()> {
        if self.exists(&submission.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Submission {}",
                submission.id
            )));
        }
        self.storage
            .write_json(self.storage.paths().submission(&submission.id), submission)
    }

    /// Update an existing submission document.
    pub fn update(&self, submission: &StoredSubmission) -> StorageResult<()> {
        if !self.exists(&submission.id) {
            return Err(StorageError::NotFound(format!(
                "Submission {}",
                submission.id
            )));
        }
        self.storage
            .write_json(self.storage.paths().submission(&submission.id), submission)
    }

    /// List all submissions, oldest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredSubmission>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().submissions_dir(), "json")?;

        let mut submissions = Vec::new();
        for id in ids {
            if let Ok(submission) = self.get(&id) {
                submissions.push(submission);
            }
        }
        submissions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(submissions)
    }

    /// List all submissions by a worker.
    pub fn list_by_worker(&self, worker_email: &str) -> StorageResult<Vec<StoredSubmission>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|s| s.worker_email == worker_email)
            .collect())
    }

    /// List all submissions against a buyer's tasks.
    pub fn list_by_buyer(&self, buyer_email: &str) -> StorageResult<Vec<StoredSubmission>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|s| s.buyer_email == buyer_email)
            .collect())
    }

    /// List submissions for a specific task (buyer review view).
    pub fn list_by_task(&self, task_id: &str) -> StorageResult<Vec<StoredSubmission>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|s| s.task_id == task_id)
            .collect())
    }

    /// List a buyer's pending submissions only.
    pub fn list_pending_by_buyer(&self, buyer_email: &str) -> StorageResult<Vec<StoredSubmission>> {
        Ok(self
            .list_by_buyer(buyer_email)?
            .into_iter()
            .filter(|s| s.status == SubmissionStatus::Pending)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DocumentStorage, StoragePaths};
    use std::env;
    use std::fs;

    fn test_storage() -> DocumentStorage {
        let test_dir =
            env::temp_dir().join(format!("test-submission-repo-{}", uuid::Uuid::new_v4()));
        let paths = StoragePaths::new(&test_dir);
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("initialize test storage");
        storage
    }

    fn cleanup(storage: &DocumentStorage) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    fn sample_submission(id: &str, worker: &str, buyer: &str) -> StoredSubmission {
        StoredSubmission {
            id: id.to_string(),
            task_id: "task-1".to_string(),
            task_title: "Watch video".to_string(),
            worker_email: worker.to_string(),
            worker_name: "Worker".to_string(),
            buyer_email: buyer.to_string(),
            buyer_name: "Buyer".to_string(),
            payable_amount: 10,
            details: "done, see screenshot".to_string(),
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_get_submission() {
        let storage = test_storage();
        let repo = SubmissionRepository::new(&storage);

        let submission = sample_submission("s1", "w@example.com", "b@example.com");
        repo.create(&submission).unwrap();

        let loaded = repo.get("s1").unwrap();
        assert_eq!(loaded.status, SubmissionStatus::Pending);
        assert_eq!(loaded.payable_amount, 10);

        cleanup(&storage);
    }

    #[test]
    fn listings_filter_by_party() {
        let storage = test_storage();
        let repo = SubmissionRepository::new(&storage);

        repo.create(&sample_submission("s1", "w1@example.com", "b1@example.com"))
            .unwrap();
        repo.create(&sample_submission("s2", "w2@example.com", "b1@example.com"))
            .unwrap();
        repo.create(&sample_submission("s3", "w1@example.com", "b2@example.com"))
            .unwrap();

        assert_eq!(repo.list_by_worker("w1@example.com").unwrap().len(), 2);
        assert_eq!(repo.list_by_buyer("b1@example.com").unwrap().len(), 2);
        assert_eq!(repo.list_by_task("task-1").unwrap().len(), 3);

        cleanup(&storage);
    }

    #[test]
    fn pending_listing_excludes_processed() {
        let storage = test_storage();
        let repo = SubmissionRepository::new(&storage);

        let mut approved = sample_submission("s1", "w@example.com", "b@example.com");
        approved.status = SubmissionStatus::Approved;
        repo.create(&approved).unwrap();
        repo.create(&sample_submission("s2", "w@example.com", "b@example.com"))
            .unwrap();

        let pending = repo.list_pending_by_buyer("b@example.com").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "s2");

        cleanup(&storage);
    }
}
