// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Run-input key canonicalization: trim/lowercase/punctuation-to-underscore,
//! plus a small explicit alias table for known plural/singular pairs.
//!
//! Intentionally small: every entry here is a documented, deliberate choice,
//! not an attempt at fuzzy matching. Add to this table only for keys that
//! are genuinely the same input under two common spellings.

/// `(alias, canonical)` pairs. Only the well-known cases get an entry —
/// anything else canonicalizes through punctuation normalization alone.
const ALIAS_TABLE: &[(&str, &str)] = &[
    ("figma_links", "figma_link"),
    ("ticket_ids", "ticket_id"),
    ("pr_urls", "pr_url"),
    ("repo_urls", "repo_url"),
    ("reviewer_emails", "reviewer_email"),
];

/// Canonicalize a raw `{{input.<key>}}` key: trim surrounding whitespace,
/// lowercase, replace runs of non-alphanumeric characters with a single
/// underscore, then fold through [`ALIAS_TABLE`] if it matches a known alias.
pub fn canonicalize_key(raw: &str) -> String {
    let trimmed = raw.trim().to_ascii_lowercase();
    let mut normalized = String::with_capacity(trimmed.len());
    let mut last_was_sep = false;
    for ch in trimmed.chars() {
        if ch.is_ascii_alphanumeric() {
            normalized.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            normalized.push('_');
            last_was_sep = true;
        }
    }
    let normalized = normalized.trim_matches('_').to_string();

    for (alias, canonical) in ALIAS_TABLE {
        if normalized == *alias {
            return (*canonical).to_string();
        }
    }
    normalized
}

#[cfg(test)]
#[path = "alias_tests.rs"]
mod tests;
