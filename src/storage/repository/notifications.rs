// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Notification repository.
//!
//! Notifications are a write-only fan-out target: handlers emit them as a
//! side effect of approvals, rejections, and payouts, and the only read
//! path is the per-recipient listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::{DocumentStorage, StorageError, StorageResult};

/// Persisted notification document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredNotification {
    /// Unique notification identifier (UUID).
    pub id: String,
    /// Recipient account email.
    pub to_email: String,
    /// Human-readable message.
    pub message: String,
    /// Frontend route the notification links to.
    pub action_route: String,
    /// When the notification was emitted.
    pub time: DateTime<Utc>,
    /// Whether the recipient has seen it.
    pub read: bool,
}

impl StoredNotification {
    /// Construct a fresh unread notification.
    pub fn new(to_email: String, message: String, action_route: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            to_email,
            message,
            action_route,
            time: Utc::now(),
            read: false,
        }
    }
}

/// Repository for notification documents.
pub struct NotificationRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new NotificationRepository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Persist a notification.
    pub fn create(&self, notification: &StoredNotification) -> StorageResult<()> {
        if self
            .storage
            .exists(self.storage.paths().notification(&notification.id))
        {
            return Err(StorageError::AlreadyExists(format!(
                "Notification {}",
                notification.id
            )));
        }
        self.storage.write_json(
            self.storage.paths().notification(&notification.id),
            notification,
        )
    }

    /// List notifications for a recipient, newest first.
    pub fn list_by_recipient(&self, email: &str) -> StorageResult<Vec<StoredNotification>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().notifications_dir(), "json")?;

        let mut notifications = Vec::new();
        for id in ids {
            let path = self.storage.paths().notification(&id);
            if let Ok(notification) = self.storage.read_json::<StoredNotification>(path) {
                if notification.to_email == email {
                    notifications.push(notification);
                }
            }
        }
        notifications.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(notifications)
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
            env::temp_dir().join(format!("test-notification-repo-{}", uuid::Uuid::new_v4()));
        let paths = StoragePaths::new(&test_dir);
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("initialize test storage");
        storage
    }

    fn cleanup(storage: &DocumentStorage) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    #[test]
    fn new_notification_is_unread() {
        let notification = StoredNotification::new(
            "w@example.com".to_string(),
            "You have earned 10 coins".to_string(),
            "/dashboard/worker-home".to_string(),
        );
        assert!(!notification.read);
    }

    #[test]
    fn list_by_recipient_filters_and_sorts_newest_first() {
        let storage = test_storage();
        let repo = NotificationRepository::new(&storage);

        let mut older = StoredNotification::new(
            "w@example.com".to_string(),
            "first".to_string(),
            "/dashboard".to_string(),
        );
        older.time = Utc::now() - chrono::Duration::minutes(5);
        repo.create(&older).unwrap();

        repo.create(&StoredNotification::new(
            "w@example.com".to_string(),
            "second".to_string(),
            "/dashboard".to_string(),
        ))
        .unwrap();

        repo.create(&StoredNotification::new(
            "other@example.com".to_string(),
            "not yours".to_string(),
            "/dashboard".to_string(),
        ))
        .unwrap();

        let mine = repo.list_by_recipient("w@example.com").unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].message, "second");

        cleanup(&storage);
    }
}
