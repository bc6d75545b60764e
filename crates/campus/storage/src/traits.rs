use crate::model::{AccountRecord, CanonicalId, RoleTag};
use crate::StorageResult;
use async_trait::async_trait;

/// Generic query window for paged reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

/// Storage interface for account rows.
///
/// Implementations never update or delete rows on behalf of the resolver.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find one account whose email matches case-insensitively.
    async fn find_account_by_email(&self, email: &str) -> StorageResult<Option<AccountRecord>>;

    /// Insert a new account with a freshly issued id.
    ///
    /// Fails with [`crate::StorageError::Conflict`] when the email is already taken.
    async fn insert_account(&self, email: &str, role: RoleTag) -> StorageResult<AccountRecord>;

    /// Get one account by canonical id.
    async fn get_account(&self, id: &CanonicalId) -> StorageResult<Option<AccountRecord>>;

    /// List accounts newest-first.
    async fn list_accounts(&self, window: QueryWindow) -> StorageResult<Vec<AccountRecord>>;
}
