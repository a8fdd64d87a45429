// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Account repository.
//!
//! Accounts carry the platform's coin balance. The `coins` field must only
//! change through [`AccountRepository::adjust_coins`]; profile and role
//! updates rewrite their own fields and leave the balance untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{DocumentStorage, StorageError, StorageResult};
use crate::auth::Role;

/// Starting balance for worker accounts.
pub const WORKER_STARTING_COINS: i64 = 10;
/// Starting balance for buyer accounts.
pub const BUYER_STARTING_COINS: i64 = 50;

/// Persisted account document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredAccount {
    /// Unique account identifier (UUID).
    pub id: String,
    /// Unique email address, also the identity claim in tokens.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Optional avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Account role.
    pub role: Role,
    /// Coin balance.
    pub coins: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl StoredAccount {
    /// Construct a new account with the role-based starting balance.
    pub fn new(id: String, email: String, name: String, image: Option<String>, role: Role) -> Self {
        let coins = match role {
            Role::Worker => WORKER_STARTING_COINS,
            Role::Buyer => BUYER_STARTING_COINS,
            Role::Admin => 0,
        };
        Self {
            id,
            email,
            name,
            image,
            role,
            coins,
            created_at: Utc::now(),
        }
    }
}

/// Repository for account documents.
pub struct AccountRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository.
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Check if an account exists by ID.
    pub fn exists(&self, account_id: &str) -> bool {
        self.storage.exists(self.storage.paths().account(account_id))
    }

    /// Get an account by ID.
    pub fn get(&self, account_id: &str) -> StorageResult<StoredAccount> {
        let path = self.storage.paths().account(account_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Account {account_id}")));
        }
        self.storage.read_json(path)
    }

    /// Find an account by its unique email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredAccount>> {
        for account in self.list_all()? {
            if account.email == email {
                return Ok(Some(account));
            }
        }
        Ok(None)
    }

    /// Create a new account document.
    pub fn create(&self, account: &StoredAccount) -> StorageResult<()> {
        if self.exists(&account.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Account {}",
                account.id
            )));
        }
        if self.find_by_email(&account.email)?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "Account email {}",
                account.email
            )));
        }
        self.storage
            .write_json(self.storage.paths().account(&account.id), account)
    }

    /// List all accounts (admin view).
    pub fn list_all(&self) -> StorageResult<Vec<StoredAccount>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().accounts_dir(), "json")?;

        let mut accounts = Vec::new();
        for id in ids {
            if let Ok(account) = self.get(&id) {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }

    /// Top workers by coin balance, capped at `limit`.
    pub fn best_workers(&self, limit: usize) -> StorageResult<Vec<StoredAccount>> {
        let mut workers: Vec<StoredAccount> = self
            .list_all()?
            .into_iter()
            .filter(|account| account.role == Role::Worker)
            .collect();
        workers.sort_by(|a, b| b.coins.cmp(&a.coins));
        workers.truncate(limit);
        Ok(workers)
    }

    /// Adjust the coin balance of the account with the given email.
    ///
    /// Returns the new balance. The adjustment is rejected if it would
    /// leave the i64 range. Callers performing a check-then-adjust
    /// sequence must hold the ledger lock for the whole sequence.
    pub fn adjust_coins(&self, email: &str, delta: i64) -> StorageResult<i64> {
        let mut account = self
            .find_by_email(email)?
            .ok_or_else(|| StorageError::NotFound(format!("Account email {email}")))?;
        account.coins = account
            .coins
            .checked_add(delta)
            .ok_or_else(|| StorageError::BalanceOverflow(format!("Account email {email}")))?;
        let coins = account.coins;
        self.storage
            .write_json(self.storage.paths().account(&account.id), &account)?;
        Ok(coins)
    }

    /// Update an account's role by ID.
    pub fn set_role(&self, account_id: &str, role: Role) -> StorageResult<StoredAccount> {
        let mut account = self.get(account_id)?;
        account.role = role;
        self.storage
            .write_json(self.storage.paths().account(account_id), &account)?;
        Ok(account)
    }

    /// Update an account's profile fields by email.
    pub fn set_profile(
        &self,
        email: &str,
        name: String,
        image: Option<String>,
    ) -> StorageResult<StoredAccount> {
        let mut account = self
            .find_by_email(email)?
            .ok_or_else(|| StorageError::NotFound(format!("Account email {email}")))?;
        account.name = name;
        account.image = image;
        self.storage
            .write_json(self.storage.paths().account(&account.id), &account)?;
        Ok(account)
    }

    /// Delete an account by ID. Dependent tasks/submissions are not touched.
    pub fn delete(&self, account_id: &str) -> StorageResult<()> {
        if !self.exists(account_id) {
            return Err(StorageError::NotFound(format!("Account {account_id}")));
        }
        self.storage.delete(self.storage.paths().account(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DocumentStorage, StoragePaths};
    use std::env;
    use std::fs;

    fn test_storage() -> DocumentStorage {
        let test_dir = env::temp_dir().join(format!("test-account-repo-{}", uuid::Uuid::new_v4()));
        let paths = StoragePaths::new(&test_dir);
        let mut storage = DocumentStorage::new(paths);
        storage.initialize().expect("initialize test storage");
        storage
    }

    fn cleanup(storage: &DocumentStorage) {
        let _ = fs::remove_dir_all(storage.paths().root());
    }

    fn sample_account(id: &str, email: &str, role: Role) -> StoredAccount {
        StoredAccount::new(
            id.to_string(),
            email.to_string(),
            "Test User".to_string(),
            None,
            role,
        )
    }

    #[test]
    fn starting_balance_is_seeded_by_role() {
        let worker = sample_account("a1", "w@example.com", Role::Worker);
        assert_eq!(worker.coins, 10);

        let buyer = sample_account("a2", "b@example.com", Role::Buyer);
        assert_eq!(buyer.coins, 50);

        let admin = sample_account("a3", "adm@example.com", Role::Admin);
        assert_eq!(admin.coins, 0);
    }

    #[test]
    fn create_rejects_duplicate_email() {
        let storage = test_storage();
        let repo = AccountRepository::new(&storage);

        repo.create(&sample_account("a1", "dup@example.com", Role::Worker))
            .unwrap();
        let err = repo
            .create(&sample_account("a2", "dup@example.com", Role::Buyer))
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        cleanup(&storage);
    }

    #[test]
    fn find_by_email_returns_match() {
        let storage = test_storage();
        let repo = AccountRepository::new(&storage);

        repo.create(&sample_account("a1", "one@example.com", Role::Worker))
            .unwrap();
        repo.create(&sample_account("a2", "two@example.com", Role::Buyer))
            .unwrap();

        let found = repo.find_by_email("two@example.com").unwrap().unwrap();
        assert_eq!(found.id, "a2");
        assert!(repo.find_by_email("missing@example.com").unwrap().is_none());

        cleanup(&storage);
    }

    #[test]
    fn adjust_coins_moves_balance() {
        let storage = test_storage();
        let repo = AccountRepository::new(&storage);

        repo.create(&sample_account("a1", "w@example.com", Role::Worker))
            .unwrap();

        let balance = repo.adjust_coins("w@example.com", 15).unwrap();
        assert_eq!(balance, 25);
        let balance = repo.adjust_coins("w@example.com", -5).unwrap();
        assert_eq!(balance, 20);

        let stored = repo.find_by_email("w@example.com").unwrap().unwrap();
        assert_eq!(stored.coins, 20);

        cleanup(&storage);
    }

    #[test]
    fn adjust_coins_rejects_overflow() {
        let storage = test_storage();
        let repo = AccountRepository::new(&storage);

        let mut account = sample_account("a1", "w@example.com", Role::Worker);
        account.coins = i64::MAX - 1;
        repo.create(&account).unwrap();

        let err = repo.adjust_coins("w@example.com", 10).unwrap_err();
        assert!(matches!(err, StorageError::BalanceOverflow(_)));

        // Failed adjustment must not touch the stored balance.
        let stored = repo.find_by_email("w@example.com").unwrap().unwrap();
        assert_eq!(stored.coins, i64::MAX - 1);

        cleanup(&storage);
    }

    #[test]
    fn set_profile_does_not_touch_balance() {
        let storage = test_storage();
        let repo = AccountRepository::new(&storage);

        repo.create(&sample_account("a1", "w@example.com", Role::Worker))
            .unwrap();
        repo.adjust_coins("w@example.com", 90).unwrap();

        let updated = repo
            .set_profile(
                "w@example.com",
                "New Name".to_string(),
                Some("https://img.example/pic.png".to_string()),
            )
            .unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.coins, 100);

        cleanup(&storage);
    }

    #[test]
    fn best_workers_sorts_and_caps() {
        let storage = test_storage();
        let repo = AccountRepository::new(&storage);

        for i in 1..=8 {
            let mut account =
                sample_account(&format!("w{i}"), &format!("w{i}@example.com"), Role::Worker);
            account.coins = i * 10;
            repo.create(&account).unwrap();
        }
        repo.create(&sample_account("b1", "buyer@example.com", Role::Buyer))
            .unwrap();

        let best = repo.best_workers(6).unwrap();
        assert_eq!(best.len(), 6);
        assert_eq!(best[0].coins, 80);
        assert!(best.iter().all(|a| a.role == Role::Worker));

        cleanup(&storage);
    }

    #[test]
    fn set_role_and_delete() {
        let storage = test_storage();
        let repo = AccountRepository::new(&storage);

        repo.create(&sample_account("a1", "w@example.com", Role::Worker))
            .unwrap();
        let updated = repo.set_role("a1", Role::Admin).unwrap();
        assert_eq!(updated.role, Role::Admin);

        repo.delete("a1").unwrap();
        assert!(!repo.exists("a1"));
        let err = repo.delete("a1").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        cleanup(&storage);
    }
}
