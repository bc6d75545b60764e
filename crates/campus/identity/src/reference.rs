use serde::{Deserialize, Serialize};

/// A user reference, classified once at the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AccountReference {
    /// Contains `@`.
    Email(String),
    /// Contains `-` and no `@`; trusted as already canonical.
    OpaqueId(String),
    /// Anything else, looked up in the seed list.
    LegacyId(String),
}

impl AccountReference {
    /// Trim and classify a raw reference. Blank input yields `None`.
    ///
    /// `@` is checked before `-`, so `first-last@example.com` is an email.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let owned = trimmed.to_string();
        Some(if trimmed.contains('@') {
            AccountReference::Email(owned)
        } else if trimmed.contains('-') {
            AccountReference::OpaqueId(owned)
        } else {
            AccountReference::LegacyId(owned)
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            AccountReference::Email(value)
            | AccountReference::OpaqueId(value)
            | AccountReference::LegacyId(value) => value,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AccountReference::Email(_) => "email",
            AccountReference::OpaqueId(_) => "opaque_id",
            AccountReference::LegacyId(_) => "legacy_id",
        }
    }
}

impl std::fmt::Display for AccountReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Re-stringify a legacy token after reading it as a number, so that `"01"`,
/// `"1.0"` and `"1e0"` all compare equal to a seed id of `"1"`.
///
/// Returns `None` for tokens that are not finite numbers.
pub(crate) fn numeric_form(token: &str) -> Option<String> {
    let value = parse_number(token.trim())?;
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < 1e21 {
        // Integral values print without a fractional part; -0 prints as 0.
        Some((value as i128).to_string())
    } else {
        Some(value.to_string())
    }
}

fn parse_number(token: &str) -> Option<f64> {
    let radix = |prefixes: [&str; 2], base: u32| {
        prefixes
            .iter()
            .find_map(|p| token.strip_prefix(p))
            .map(|digits| u64::from_str_radix(digits, base).ok().map(|n| n as f64))
    };

    if let Some(parsed) = radix(["0x", "0X"], 16)
        .or_else(|| radix(["0o", "0O"], 8))
        .or_else(|| radix(["0b", "0B"], 2))
    {
        return parsed;
    }

    // f64 parsing also accepts "inf"/"nan" spellings; callers reject non-finite values.
    token.parse::<f64>().ok()
}
