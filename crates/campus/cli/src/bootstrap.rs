//! Builds the resolver and its collaborators from configuration.

use crate::config::{CampusConfig, StorageConfig};
use crate::error::CliResult;
use campus_identity::{AccountStore, IdentityResolver, StaticSeedAccounts};
use campus_storage::InMemoryAccountStore;
use std::sync::Arc;

pub struct Services {
    pub store: Arc<dyn AccountStore>,
    pub seeds: Arc<StaticSeedAccounts>,
    pub resolver: IdentityResolver,
}

pub async fn build(config: &CampusConfig) -> CliResult<Services> {
    let store = open_store(&config.storage).await?;
    let seeds = Arc::new(load_seeds(config)?);
    let resolver =
        IdentityResolver::with_config(store.clone(), seeds.clone(), config.resolver.clone());

    tracing::debug!(
        seeds = seeds.len(),
        race_recovery = ?config.resolver.race_recovery,
        "identity resolver ready"
    );

    Ok(Services {
        store,
        seeds,
        resolver,
    })
}

fn load_seeds(config: &CampusConfig) -> CliResult<StaticSeedAccounts> {
    match &config.seed_file {
        Some(path) => {
            tracing::info!(path = %path, "loading seed accounts from file");
            Ok(StaticSeedAccounts::from_file(path)?)
        }
        None => Ok(StaticSeedAccounts::new(config.seeds.clone())?),
    }
}

async fn open_store(config: &StorageConfig) -> CliResult<Arc<dyn AccountStore>> {
    match config {
        StorageConfig::Memory => {
            tracing::info!("using in-memory account store");
            Ok(Arc::new(InMemoryAccountStore::new()))
        }
        #[cfg(feature = "postgres")]
        StorageConfig::Postgres {
            url,
            max_connections,
            connect_timeout_secs,
        } => {
            tracing::info!(max_connections, "connecting postgres account store");
            let store = campus_storage::postgres::PostgresAccountStore::connect_with_options(
                url,
                *max_connections,
                *connect_timeout_secs,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageConfig::Postgres { .. } => Err(crate::error::CliError::Config(
            "postgres storage requires the `postgres` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use campus_identity::SeedAccount;

    #[tokio::test]
    async fn test_build_with_memory_store() {
        let services = build(&CampusConfig::default()).await.unwrap();
        assert_eq!(services.seeds.len(), 4);
        assert!(services.resolver.resolve(Some("1")).await.is_some());
    }

    #[tokio::test]
    async fn test_invalid_seeds_fail_fast() {
        let config = CampusConfig {
            seeds: vec![SeedAccount::new(
                "1",
                "missing-at-sign",
                campus_identity::RoleTag::Admin,
            )],
            ..Default::default()
        };
        assert!(matches!(build(&config).await, Err(CliError::Seeds(_))));
    }
}
