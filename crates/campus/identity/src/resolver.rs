//! Canonical identity resolution.

use crate::reference::AccountReference;
use crate::seed::{SeedAccount, SeedAccountProvider};
use campus_storage::{AccountStore, CanonicalId, StorageError};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to do when provisioning loses a unique-email race.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceRecovery {
    /// Report the reference as unresolved.
    #[default]
    NotFound,
    /// Look the email up once more and return the winner's row.
    Relookup,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub race_recovery: RaceRecovery,
}

/// Why a reference could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NotFoundReason {
    /// Missing, empty or whitespace-only input.
    Blank,
    /// No account row and no seed entry for the email.
    UnknownEmail,
    /// No seed entry for the legacy id.
    UnknownLegacyId,
    /// The account store failed; the cause is logged, not returned.
    StoreFailure { operation: String },
}

/// Result of one resolution, with the path that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// An existing row matched.
    Existing { id: CanonicalId },
    /// A row was created during this call.
    Provisioned { id: CanonicalId },
    /// The reference was an opaque id and returned untouched.
    PassThrough { id: CanonicalId },
    NotFound(NotFoundReason),
}

impl ResolutionOutcome {
    pub fn canonical_id(&self) -> Option<&CanonicalId> {
        match self {
            ResolutionOutcome::Existing { id }
            | ResolutionOutcome::Provisioned { id }
            | ResolutionOutcome::PassThrough { id } => Some(id),
            ResolutionOutcome::NotFound(_) => None,
        }
    }

    pub fn into_canonical_id(self) -> Option<CanonicalId> {
        match self {
            ResolutionOutcome::Existing { id }
            | ResolutionOutcome::Provisioned { id }
            | ResolutionOutcome::PassThrough { id } => Some(id),
            ResolutionOutcome::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.canonical_id().is_some()
    }
}

/// Maps raw user references onto canonical account ids.
///
/// Holds no mutable state; clones share the same store and seed provider and
/// may resolve concurrently.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn AccountStore>,
    seeds: Arc<dyn SeedAccountProvider>,
    config: ResolverConfig,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn AccountStore>, seeds: Arc<dyn SeedAccountProvider>) -> Self {
        Self::with_config(store, seeds, ResolverConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn AccountStore>,
        seeds: Arc<dyn SeedAccountProvider>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            store,
            seeds,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a raw reference to its canonical id; `None` means not found.
    pub async fn resolve(&self, raw: Option<&str>) -> Option<CanonicalId> {
        self.resolve_detailed(raw).await.into_canonical_id()
    }

    /// Resolve several references concurrently, preserving input order.
    pub async fn resolve_many<'a, I>(&self, refs: I) -> Vec<Option<CanonicalId>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        join_all(refs.into_iter().map(|raw| self.resolve(Some(raw)))).await
    }

    /// Resolve a raw reference and report which path produced the answer.
    #[tracing::instrument(level = "debug", skip_all, fields(reference = raw.unwrap_or("")))]
    pub async fn resolve_detailed(&self, raw: Option<&str>) -> ResolutionOutcome {
        let Some(reference) = raw.and_then(AccountReference::parse) else {
            debug!("blank account reference");
            return ResolutionOutcome::NotFound(NotFoundReason::Blank);
        };

        match reference {
            AccountReference::OpaqueId(id) => ResolutionOutcome::PassThrough {
                id: CanonicalId(id),
            },
            AccountReference::Email(email) => self.resolve_email(&email).await,
            AccountReference::LegacyId(token) => self.resolve_legacy_id(&token).await,
        }
    }

    async fn resolve_email(&self, email: &str) -> ResolutionOutcome {
        match self.store.find_account_by_email(email).await {
            Ok(Some(record)) => return ResolutionOutcome::Existing { id: record.id },
            Ok(None) => {}
            Err(err) => return store_failure(email, "find_account_by_email", err),
        }

        let seeds = self.seeds.seed_accounts();
        let Some(seed) = seeds.iter().find(|seed| seed.matches_email(email)) else {
            debug!(reference = email, "email matches no account and no seed");
            return ResolutionOutcome::NotFound(NotFoundReason::UnknownEmail);
        };
        self.provision(email, seed).await
    }

    async fn resolve_legacy_id(&self, token: &str) -> ResolutionOutcome {
        let seeds = self.seeds.seed_accounts();
        let Some(seed) = seeds.iter().find(|seed| seed.matches_legacy_id(token)) else {
            debug!(reference = token, "legacy id matches no seed");
            return ResolutionOutcome::NotFound(NotFoundReason::UnknownLegacyId);
        };

        match self.store.find_account_by_email(&seed.email).await {
            Ok(Some(record)) => ResolutionOutcome::Existing { id: record.id },
            Ok(None) => self.provision(token, seed).await,
            Err(err) => store_failure(token, "find_account_by_email", err),
        }
    }

    /// Insert the seed's row. Only called after a lookup found nothing.
    async fn provision(&self, reference: &str, seed: &SeedAccount) -> ResolutionOutcome {
        match self.store.insert_account(&seed.email, seed.role).await {
            Ok(record) => {
                info!(
                    reference,
                    id = %record.id,
                    role = %record.role,
                    "provisioned account from seed"
                );
                ResolutionOutcome::Provisioned { id: record.id }
            }
            Err(err)
                if err.is_conflict() && self.config.race_recovery == RaceRecovery::Relookup =>
            {
                warn!(reference, error = %err, "provisioning raced, looking up winner");
                match self.store.find_account_by_email(&seed.email).await {
                    Ok(Some(record)) => ResolutionOutcome::Existing { id: record.id },
                    Ok(None) => store_failure(reference, "insert_account", err),
                    Err(lookup_err) => {
                        store_failure(reference, "find_account_by_email", lookup_err)
                    }
                }
            }
            Err(err) => store_failure(reference, "insert_account", err),
        }
    }
}

fn store_failure(reference: &str, operation: &str, err: StorageError) -> ResolutionOutcome {
    warn!(reference, operation, error = %err, "account store failure, reporting not found");
    ResolutionOutcome::NotFound(NotFoundReason::StoreFailure {
        operation: operation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::StaticSeedAccounts;
    use campus_storage::{InMemoryAccountStore, RoleTag};

    fn resolver_with(seeds: Vec<SeedAccount>) -> (Arc<InMemoryAccountStore>, IdentityResolver) {
        let store = Arc::new(InMemoryAccountStore::new());
        let seeds = Arc::new(StaticSeedAccounts::new(seeds).unwrap());
        (store.clone(), IdentityResolver::new(store, seeds))
    }

    #[tokio::test]
    async fn legacy_id_provisions_then_email_reuses_row() {
        let (store, resolver) =
            resolver_with(vec![SeedAccount::new("1", "admin@example.com", RoleTag::Admin)]);

        let first = resolver.resolve_detailed(Some("1")).await;
        let ResolutionOutcome::Provisioned { id } = first.clone() else {
            panic!("expected provisioning, got {first:?}");
        };

        assert_eq!(
            resolver.resolve_detailed(Some("admin@example.com")).await,
            ResolutionOutcome::Existing { id: id.clone() }
        );
        assert_eq!(resolver.resolve(Some("ADMIN@EXAMPLE.COM")).await, Some(id));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn blank_and_unknown_references_are_not_found() {
        let (store, resolver) = resolver_with(vec![]);

        for raw in [None, Some(""), Some("   ")] {
            assert_eq!(
                resolver.resolve_detailed(raw).await,
                ResolutionOutcome::NotFound(NotFoundReason::Blank)
            );
        }
        assert_eq!(
            resolver.resolve_detailed(Some("nobody@nowhere.example")).await,
            ResolutionOutcome::NotFound(NotFoundReason::UnknownEmail)
        );
        assert_eq!(
            resolver.resolve_detailed(Some("99")).await,
            ResolutionOutcome::NotFound(NotFoundReason::UnknownLegacyId)
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn opaque_ids_pass_through() {
        let (_, resolver) = resolver_with(vec![]);
        let outcome = resolver
            .resolve_detailed(Some("3f2b7c1e-0000-4a1b-9c2d-123456789abc"))
            .await;
        assert_eq!(
            outcome,
            ResolutionOutcome::PassThrough {
                id: CanonicalId::new("3f2b7c1e-0000-4a1b-9c2d-123456789abc")
            }
        );
    }

    #[tokio::test]
    async fn resolve_many_keeps_input_order() {
        let (_, resolver) = resolver_with(vec![
            SeedAccount::new("1", "admin@example.com", RoleTag::Admin),
            SeedAccount::new("2", "student@example.com", RoleTag::Student),
        ]);

        let ids = resolver
            .resolve_many(["2", "missing", "a-b", "1"])
            .await;
        assert_eq!(ids.len(), 4);
        assert!(ids[0].is_some());
        assert_eq!(ids[1], None);
        assert_eq!(ids[2], Some(CanonicalId::new("a-b")));
        assert!(ids[3].is_some());
        assert_ne!(ids[0], ids[3]);
    }

    #[test]
    fn outcome_serializes_with_tags() {
        let json = serde_json::to_value(ResolutionOutcome::NotFound(
            NotFoundReason::StoreFailure {
                operation: "insert_account".to_string(),
            },
        ))
        .unwrap();
        assert_eq!(json["outcome"], "not_found");
        assert_eq!(json["reason"], "store_failure");
        assert_eq!(json["operation"], "insert_account");
    }
}
