//! Configuration for campusid

use campus_identity::{ResolverConfig, RoleTag, SeedAccount};
use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusConfig {
    /// Account store backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Resolver behaviour
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Seed accounts eligible for lazy provisioning
    #[serde(default = "default_seeds")]
    pub seeds: Vec<SeedAccount>,

    /// JSON or TOML file replacing `seeds` when set
    #[serde(default)]
    pub seed_file: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            resolver: ResolverConfig::default(),
            seeds: default_seeds(),
            seed_file: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage, lives for one invocation
    #[default]
    Memory,

    /// PostgreSQL storage
    Postgres {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,
    },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_seeds() -> Vec<SeedAccount> {
    vec![
        SeedAccount::new("1", "admin@example.com", RoleTag::Admin),
        SeedAccount::new("2", "instructor@example.com", RoleTag::Instructor),
        SeedAccount::new("3", "creator@example.com", RoleTag::ContentCreator),
        SeedAccount::new("4", "student@example.com", RoleTag::Student),
    ]
}

fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CampusConfig {
    /// Layer defaults, an optional file, then `CAMPUS_`-prefixed environment
    /// variables (`__` separates nested keys, e.g. `CAMPUS_STORAGE__URL`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CampusConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CAMPUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_identity::RaceRecovery;

    #[test]
    fn test_default_config() {
        let config = CampusConfig::default();
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert_eq!(config.resolver.race_recovery, RaceRecovery::NotFound);
        assert_eq!(config.seeds.len(), 4);
        assert!(config.seed_file.is_none());
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("campusid-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("campus.toml");
        std::fs::write(
            &path,
            r#"
[storage]
type = "postgres"
url = "postgres://localhost/campus"

[resolver]
race_recovery = "relookup"

[[seeds]]
legacy_id = "10"
email = "dean@example.com"
role = "admin"
"#,
        )
        .unwrap();

        let config = CampusConfig::load(path.to_str()).unwrap();
        match config.storage {
            StorageConfig::Postgres {
                url,
                max_connections,
                connect_timeout_secs,
            } => {
                assert_eq!(url, "postgres://localhost/campus");
                assert_eq!(max_connections, 10);
                assert_eq!(connect_timeout_secs, 5);
            }
            other => panic!("unexpected storage config: {other:?}"),
        }
        assert_eq!(config.resolver.race_recovery, RaceRecovery::Relookup);
        assert!(config
            .seeds
            .iter()
            .any(|seed| seed.email == "dean@example.com" && seed.role == RoleTag::Admin));

        std::fs::remove_dir_all(&dir).ok();
    }
}
