// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Task repository.
//!
//! `required_workers` holds the number of *remaining open slots* on a task.
//! Approving a submission consumes a slot, rejecting one reopens it, and
//! deleting a task refunds the remaining slots to its buyer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Sort order for the available-task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskSort {
    /// Lowest reward first.
    RewardAsc,
    /// Highest reward first.
    RewardDesc,
    /// Earliest completion date first (default).
    CompletionDate,
}

impl Default for TaskSort {
    fn default() -> Self {
        TaskSort::CompletionDate
    }
}

/// Filter parameters for the available-task listing.
#[derive(Debug, Clone, Default)]
pub struct AvailableTaskFilter {
    /// Case-insensitive substring match against the task title.
    pub search: Option<String>,
    /// Minimum reward per worker.
    pub min_reward: Option<i64>,
    /// Maximum reward per worker.
    pub max_reward: Option<i64>,
    /// Sort order.
    pub sort: TaskSort,
}

/// Persisted task document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredTask {
    /// Unique task identifier (UUID).
    pub id: String,
    /// Email of the buyer who posted the task.
    pub buyer_email: String,
    /// Display name of the buyer (denormalized for submission records).
    pub buyer_name: String,
    /// Task title.
    pub title: String,
    /// Task description.
    pub detail: String,
    /// What the worker must submit as proof of completion.
    pub submission_info: String,
    /// Optional illustration URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Coins paid per approved submission.
    pub payable_amount: i64,
    /// Remaining open worker slots.
    pub required_workers: i64,
    /// Date the task should be completed by.
    pub completion_date: NaiveDate,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Repository for task documents.
pub struct TaskRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> TaskRepository<'a> {
    /// Create a new TaskRepository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if a task exists.
    pub fn exists(&self, task_id: &str) -> bool {
        self.storage.exists(self.storage.paths().task(task_id))
    }

    /// Get a task by ID.
    pub fn get(&self, task_id: &str) -> StorageResult<StoredTask> {
        let path = self.storage.paths().task(task_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Task {task_id}")));
        }
        self.storage.read_json(path)
    }

    /// Create a new task document.
    pub fn create(&self, task: &StoredTask) -> StorageResult<()> {
        if self.exists(&task.id) {
            return Err(StorageError::AlreadyExists(format!("Task {}", task.id)));
        }
        self.storage
            .write_json(self.storage.paths().task(&task.id), task)
    }

    /// Update an existing task document.
    pub fn update(&self, task: &StoredTask) -> StorageResult<()> {
        if !self.exists(&task.id) {
            return Err(StorageError::NotFound(format!("Task {}", task.id)));
        }
        self.storage
            .write_json(self.storage.paths().task(&task.id), task)
    }

    /// Delete a task. Dependent submissions are not touched.
    pub fn delete(&self, task_id: &str) -> StorageResult<()> {
        if !self.exists(task_id) {
            return Err(StorageError::NotFound(format!("Task {task_id}")));
        }
        self.storage.delete(self.storage.paths().task(task_id))
    }

    /// List all tasks.
    pub fn list_all(&self) -> StorageResult<Vec<StoredTask>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().tasks_dir(), "json")?;

        let mut tasks = Vec::new();
        for id in ids {
            if let Ok(task) = self.get(&id) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    /// List a buyer's tasks, newest completion date first.
    pub fn list_by_buyer(&self, buyer_email: &str) -> StorageResult<Vec<StoredTask>> {
        let mut tasks: Vec<StoredTask> = self
            .list_all()?
            .into_iter()
            .filter(|task| task.buyer_email == buyer_email)
            .collect();
        tasks.sort_by(|a, b| b.completion_date.cmp(&a.completion_date));
        Ok(tasks)
    }

    /// List tasks with open slots, filtered and sorted.
    pub fn list_available(&self, filter: &AvailableTaskFilter) -> StorageResult<Vec<StoredTask>> {
        let search = filter.search.as_deref().map(str::to_lowercase);

        let mut tasks: Vec<StoredTask> = self
            .list_all()?
            .into_iter()
            .filter(|task| task.required_workers > 0)
            .filter(|task| match &search {
                Some(needle) => task.title.to_lowercase().contains(needle),
                None => true,
            })
            .filter(|task| filter.min_reward.is_none_or(|min| task.payable_amount >= min))
            .filter(|task| filter.max_reward.is_none_or(|max| task.payable_amount <= max))
            .collect();

        match filter.sort {
            TaskSort::RewardAsc => tasks.sort_by(|a, b| a.payable_amount.cmp(&b.payable_amount)),
            TaskSort::RewardDesc => tasks.sort_by(|a, b| b.payable_amount.cmp(&a.payable_amount)),
            TaskSort::CompletionDate => {
                tasks.sort_by(|a, b| a.completion_date.cmp(&b.completion_date))
            }
        }
        Ok(tasks)
    }

    /// Adjust a task's remaining open slots, floored at zero.
    ///
    /// Returns the updated task. Callers pairing this with a status change
    /// must hold the ledger lock for the whole sequence.
    pub fn adjust_required_workers(&self, task_id: &str, delta: i64) -> StorageResult<StoredTask> {
        let mut task = self.get(task_id)?;
        task.required_workers = (task.required_workers + delta).max(0);
        self.update(&task)?;
        Ok(task)
    }
}
