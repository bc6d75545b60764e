use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Stable, store-issued account identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(pub String);

impl CanonicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh hyphenated UUID v4, the shape callers later pass back as an opaque id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role carried by an account row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    Student,
    Instructor,
    ContentCreator,
    Admin,
}

impl RoleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::Student => "student",
            RoleTag::Instructor => "instructor",
            RoleTag::ContentCreator => "content_creator",
            RoleTag::Admin => "admin",
        }
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role tag: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for RoleTag {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(RoleTag::Student),
            "instructor" => Ok(RoleTag::Instructor),
            "content_creator" | "content-creator" | "contentcreator" => {
                Ok(RoleTag::ContentCreator)
            }
            "admin" => Ok(RoleTag::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Persistent account row. Email is unique case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: CanonicalId,
    pub email: String,
    pub role: RoleTag,
    pub created_at: DateTime<Utc>,
}

/// Key used for case-insensitive email comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tags_parse_aliases() {
        assert_eq!("Admin".parse::<RoleTag>().unwrap(), RoleTag::Admin);
        assert_eq!(
            "content-creator".parse::<RoleTag>().unwrap(),
            RoleTag::ContentCreator
        );
        assert!("teacher".parse::<RoleTag>().is_err());
    }

    #[test]
    fn role_tag_serde_uses_snake_case() {
        let json = serde_json::to_string(&RoleTag::ContentCreator).unwrap();
        assert_eq!(json, "\"content_creator\"");
        let back: RoleTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RoleTag::ContentCreator);
    }

    #[test]
    fn generated_ids_are_hyphenated() {
        let id = CanonicalId::generate();
        assert!(id.as_str().contains('-'));
        assert_ne!(id, CanonicalId::generate());
    }
}
