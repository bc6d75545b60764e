//! In-memory reference implementation of [`AccountStore`].
//!
//! This adapter is deterministic and test-friendly. Production deployments
//! should use the hosted relational backend (e.g. PostgreSQL).

use crate::model::{normalize_email, AccountRecord, CanonicalId, RoleTag};
use crate::traits::{AccountStore, QueryWindow};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct Accounts {
    // Insertion order doubles as creation order.
    rows: Vec<AccountRecord>,
    by_email: HashMap<String, usize>,
}

/// In-memory account store.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<Accounts>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.accounts.read().map(|guard| guard.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_account_by_email(&self, email: &str) -> StorageResult<Option<AccountRecord>> {
        let guard = self
            .accounts
            .read()
            .map_err(|_| StorageError::Backend("accounts lock poisoned".to_string()))?;
        Ok(guard
            .by_email
            .get(&normalize_email(email))
            .map(|idx| guard.rows[*idx].clone()))
    }

    async fn insert_account(&self, email: &str, role: RoleTag) -> StorageResult<AccountRecord> {
        let email = email.trim();
        if email.is_empty() {
            return Err(StorageError::InvalidInput(
                "email must not be empty".to_string(),
            ));
        }

        let mut guard = self
            .accounts
            .write()
            .map_err(|_| StorageError::Backend("accounts lock poisoned".to_string()))?;

        let key = normalize_email(email);
        if guard.by_email.contains_key(&key) {
            return Err(StorageError::Conflict(format!(
                "account with email {email} already exists"
            )));
        }

        let record = AccountRecord {
            id: CanonicalId::generate(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        let idx = guard.rows.len();
        guard.rows.push(record.clone());
        guard.by_email.insert(key, idx);
        tracing::debug!(id = %record.id, role = %role, "inserted account row");
        Ok(record)
    }

    async fn get_account(&self, id: &CanonicalId) -> StorageResult<Option<AccountRecord>> {
        let guard = self
            .accounts
            .read()
            .map_err(|_| StorageError::Backend("accounts lock poisoned".to_string()))?;
        Ok(guard.rows.iter().find(|row| &row.id == id).cloned())
    }

    async fn list_accounts(&self, window: QueryWindow) -> StorageResult<Vec<AccountRecord>> {
        let guard = self
            .accounts
            .read()
            .map_err(|_| StorageError::Backend("accounts lock poisoned".to_string()))?;
        let values = guard.rows.iter().rev().cloned().collect::<Vec<_>>();
        Ok(apply_window(values, window))
    }
}

fn apply_window<T>(items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = items.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}
