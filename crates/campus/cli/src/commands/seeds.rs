//! `campusid seeds`

use crate::error::CliResult;
use campus_identity::{SeedAccountProvider, StaticSeedAccounts};

pub fn render(seeds: &StaticSeedAccounts, json: bool) -> CliResult<String> {
    let snapshot = seeds.seed_accounts();
    if json {
        return Ok(serde_json::to_string_pretty(&*snapshot)?);
    }

    let width = snapshot
        .iter()
        .map(|seed| seed.legacy_id.len())
        .max()
        .unwrap_or(0);
    Ok(snapshot
        .iter()
        .map(|seed| {
            format!(
                "{:<width$}  {:<16}  {}",
                seed.legacy_id,
                seed.role.as_str(),
                seed.email
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_identity::{RoleTag, SeedAccount};

    #[test]
    fn test_text_listing() {
        let seeds = StaticSeedAccounts::new(vec![
            SeedAccount::new("1", "admin@example.com", RoleTag::Admin),
            SeedAccount::new("12", "author@example.com", RoleTag::ContentCreator),
        ])
        .unwrap();

        let text = render(&seeds, false).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1   admin"));
        assert!(lines[1].ends_with("author@example.com"));
    }

    #[test]
    fn test_json_listing() {
        let seeds = StaticSeedAccounts::new(vec![SeedAccount::new(
            "1",
            "admin@example.com",
            RoleTag::Admin,
        )])
        .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&render(&seeds, true).unwrap()).unwrap();
        assert_eq!(value[0]["legacy_id"], "1");
        assert_eq!(value[0]["role"], "admin");
    }
}
