//! Seed accounts: the provisioning source for lazily created account rows.

use crate::error::{IdentityError, IdentityResult};
use crate::reference::numeric_form;
use campus_storage::{normalize_email, RoleTag};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// A known identity that may be provisioned on first use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAccount {
    #[serde(alias = "legacyId")]
    pub legacy_id: String,
    pub email: String,
    pub role: RoleTag,
}

impl SeedAccount {
    pub fn new(legacy_id: impl Into<String>, email: impl Into<String>, role: RoleTag) -> Self {
        Self {
            legacy_id: legacy_id.into(),
            email: email.into(),
            role,
        }
    }

    pub fn matches_email(&self, email: &str) -> bool {
        normalize_email(&self.email) == normalize_email(email)
    }

    /// Raw equality, or equality with the token's re-stringified numeric form.
    pub fn matches_legacy_id(&self, token: &str) -> bool {
        self.legacy_id == token || numeric_form(token).is_some_and(|n| n == self.legacy_id)
    }
}

/// Read-only source of seed accounts.
///
/// Each call returns an ordered snapshot; the resolver reads it at most once
/// per resolution.
pub trait SeedAccountProvider: Send + Sync {
    fn seed_accounts(&self) -> Arc<[SeedAccount]>;
}

/// Fixed seed list, typically taken from configuration.
#[derive(Clone, Debug)]
pub struct StaticSeedAccounts {
    seeds: Arc<[SeedAccount]>,
}

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    seeds: Vec<SeedAccount>,
}

impl StaticSeedAccounts {
    /// Validate and wrap a seed list.
    pub fn new(seeds: Vec<SeedAccount>) -> IdentityResult<Self> {
        validate(&seeds)?;
        Ok(Self {
            seeds: seeds.into(),
        })
    }

    /// Load seeds from a `.json` or `.toml` file holding a `seeds` array.
    pub fn from_file(path: impl AsRef<Path>) -> IdentityResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let file: SeedFile = match extension.as_deref() {
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| IdentityError::Parse(e.to_string()))?,
            Some("toml") => {
                toml::from_str(&contents).map_err(|e| IdentityError::Parse(e.to_string()))?
            }
            _ => {
                return Err(IdentityError::UnsupportedFormat(
                    path.display().to_string(),
                ))
            }
        };
        Self::new(file.seeds)
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}

impl SeedAccountProvider for StaticSeedAccounts {
    fn seed_accounts(&self) -> Arc<[SeedAccount]> {
        Arc::clone(&self.seeds)
    }
}

fn validate(seeds: &[SeedAccount]) -> IdentityResult<()> {
    let mut legacy_ids = HashSet::new();
    let mut emails = HashSet::new();

    for seed in seeds {
        let legacy_id = seed.legacy_id.trim();
        if legacy_id.is_empty() {
            return Err(IdentityError::InvalidSeed(format!(
                "seed for {} has an empty legacy id",
                seed.email
            )));
        }
        if !seed.email.contains('@') {
            return Err(IdentityError::InvalidSeed(format!(
                "seed {} has malformed email {:?}",
                seed.legacy_id, seed.email
            )));
        }
        if !legacy_ids.insert(legacy_id.to_string()) {
            return Err(IdentityError::DuplicateSeed(format!(
                "legacy id {}",
                seed.legacy_id
            )));
        }
        if !emails.insert(normalize_email(&seed.email)) {
            return Err(IdentityError::DuplicateSeed(format!("email {}", seed.email)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> Vec<SeedAccount> {
        vec![
            SeedAccount::new("1", "admin@example.com", RoleTag::Admin),
            SeedAccount::new("2", "teacher@example.com", RoleTag::Instructor),
        ]
    }

    #[test]
    fn legacy_id_matching_tolerates_numeric_drift() {
        let seed = SeedAccount::new("7", "s@example.com", RoleTag::Student);
        assert!(seed.matches_legacy_id("7"));
        assert!(seed.matches_legacy_id("007"));
        assert!(seed.matches_legacy_id("7.0"));
        assert!(!seed.matches_legacy_id("70"));
        assert!(!seed.matches_legacy_id("seven"));
    }

    #[test]
    fn email_matching_ignores_case() {
        let seed = SeedAccount::new("1", "Admin@Example.com", RoleTag::Admin);
        assert!(seed.matches_email("admin@EXAMPLE.com"));
        assert!(!seed.matches_email("admin@example.org"));
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut seeds = demo();
        seeds.push(SeedAccount::new("3", "ADMIN@example.com", RoleTag::Student));
        assert!(matches!(
            StaticSeedAccounts::new(seeds),
            Err(IdentityError::DuplicateSeed(_))
        ));

        let mut seeds = demo();
        seeds.push(SeedAccount::new("1", "other@example.com", RoleTag::Student));
        assert!(matches!(
            StaticSeedAccounts::new(seeds),
            Err(IdentityError::DuplicateSeed(_))
        ));
    }

    #[test]
    fn malformed_seeds_are_rejected() {
        let seeds = vec![SeedAccount::new("1", "not-an-email", RoleTag::Admin)];
        assert!(matches!(
            StaticSeedAccounts::new(seeds),
            Err(IdentityError::InvalidSeed(_))
        ));

        let seeds = vec![SeedAccount::new(" ", "a@example.com", RoleTag::Admin)];
        assert!(StaticSeedAccounts::new(seeds).is_err());
    }

    #[test]
    fn snapshots_preserve_order() {
        let provider = StaticSeedAccounts::new(demo()).unwrap();
        let snapshot = provider.seed_accounts();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].legacy_id, "1");
        assert_eq!(snapshot[1].legacy_id, "2");
    }

    #[test]
    fn seeds_load_from_json_and_toml() {
        let dir = std::env::temp_dir().join(format!("campus-seeds-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let json = dir.join("seeds.json");
        std::fs::write(
            &json,
            r#"{"seeds": [{"legacyId": "1", "email": "admin@example.com", "role": "admin"}]}"#,
        )
        .unwrap();
        let loaded = StaticSeedAccounts::from_file(&json).unwrap();
        assert_eq!(loaded.seed_accounts()[0].role, RoleTag::Admin);

        let toml_path = dir.join("seeds.toml");
        std::fs::write(
            &toml_path,
            "[[seeds]]\nlegacy_id = \"4\"\nemail = \"author@example.com\"\nrole = \"content_creator\"\n",
        )
        .unwrap();
        let loaded = StaticSeedAccounts::from_file(&toml_path).unwrap();
        assert_eq!(loaded.seed_accounts()[0].role, RoleTag::ContentCreator);

        let yaml = dir.join("seeds.yaml");
        std::fs::write(&yaml, "seeds: []").unwrap();
        assert!(matches!(
            StaticSeedAccounts::from_file(&yaml),
            Err(IdentityError::UnsupportedFormat(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
