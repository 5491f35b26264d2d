//! Rules for the URL set of a bookmark.
//!
//! A bookmark always owns at least one URL and exactly one of them is primary.
//! These helpers operate on submitted entries before anything touches the
//! store, so the managers only ever persist lists that already satisfy both
//! rules.

use url::Url;

use crate::types::bookmark::UrlInput;
use crate::types::errors::StoreError;

/// Checks that a submitted URL is present and absolute.
pub fn validate_url(raw: &str) -> Result<(), StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::ValidationFailed("url is required".to_string()));
    }
    Url::parse(trimmed)
        .map(|_| ())
        .map_err(|e| StoreError::ValidationFailed(format!("invalid url '{}': {}", trimmed, e)))
}

/// Trims the URL and label of an entry; blank labels become `None`.
pub fn clean_entry(entry: &UrlInput) -> UrlInput {
    UrlInput {
        url: entry.url.trim().to_string(),
        is_primary: entry.is_primary,
        label: entry
            .label
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    }
}

/// Produces a URL list with exactly one primary entry.
///
/// - no primary: the first entry in submission order becomes primary
/// - several primaries: only the first one keeps the flag
///
/// Every entry is validated and cleaned. An empty list is rejected.
pub fn normalize_primary(entries: &[UrlInput]) -> Result<Vec<UrlInput>, StoreError> {
    if entries.is_empty() {
        return Err(StoreError::ValidationFailed(
            "at least one URL is required".to_string(),
        ));
    }

    let mut normalized = Vec::with_capacity(entries.len());
    for entry in entries {
        validate_url(&entry.url)?;
        normalized.push(clean_entry(entry));
    }

    let mut seen_primary = false;
    for entry in normalized.iter_mut() {
        if entry.is_primary {
            if seen_primary {
                entry.is_primary = false;
            }
            seen_primary = true;
        }
    }
    if !seen_primary {
        normalized[0].is_primary = true;
    }

    Ok(normalized)
}
