//! `campusid accounts`

use crate::error::CliResult;
use campus_identity::AccountStore;
use campus_storage::QueryWindow;

pub async fn render(
    store: &dyn AccountStore,
    window: QueryWindow,
    json: bool,
) -> CliResult<String> {
    let accounts = store.list_accounts(window).await?;
    if json {
        return Ok(serde_json::to_string_pretty(&accounts)?);
    }
    if accounts.is_empty() {
        return Ok("no accounts".to_string());
    }

    Ok(accounts
        .iter()
        .map(|account| {
            format!(
                "{}  {:<16}  {}  {}",
                account.id,
                account.role.as_str(),
                account.email,
                account.created_at.to_rfc3339()
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}
