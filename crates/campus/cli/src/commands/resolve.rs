//! `campusid resolve`

use crate::error::CliResult;
use campus_identity::{IdentityResolver, NotFoundReason, ResolutionOutcome};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ResolvedReference {
    pub reference: String,
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
}

/// Resolve references one after another so repeated identities in a single
/// invocation converge on the row created by the first of them.
pub async fn run(resolver: &IdentityResolver, references: &[String]) -> Vec<ResolvedReference> {
    let mut resolved = Vec::with_capacity(references.len());
    for reference in references {
        let outcome = resolver.resolve_detailed(Some(reference.as_str())).await;
        resolved.push(ResolvedReference {
            reference: reference.clone(),
            outcome,
        });
    }
    resolved
}

pub fn unresolved(resolved: &[ResolvedReference]) -> usize {
    resolved.iter().filter(|r| !r.outcome.is_found()).count()
}

pub fn render(resolved: &[ResolvedReference], json: bool) -> CliResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(resolved)?);
    }

    let lines = resolved
        .iter()
        .map(|entry| {
            let status = match &entry.outcome {
                ResolutionOutcome::Existing { id } => format!("{id}"),
                ResolutionOutcome::Provisioned { id } => format!("{id} (provisioned)"),
                ResolutionOutcome::PassThrough { id } => format!("{id} (opaque)"),
                ResolutionOutcome::NotFound(reason) => {
                    format!("not found ({})", describe(reason))
                }
            };
            format!("{} -> {}", entry.reference, status)
        })
        .collect::<Vec<_>>();
    Ok(lines.join("\n"))
}

fn describe(reason: &NotFoundReason) -> String {
    match reason {
        NotFoundReason::Blank => "blank reference".to_string(),
        NotFoundReason::UnknownEmail => "no account or seed for email".to_string(),
        NotFoundReason::UnknownLegacyId => "no seed for legacy id".to_string(),
        NotFoundReason::StoreFailure { operation } => format!("store failure in {operation}"),
    }
}
