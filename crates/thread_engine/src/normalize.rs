//! Cleanup of author handles and author tags.
use std::sync::LazyLock;

use harvest_logging::harvest_debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{TAG_PREFIX, UNKNOWN};

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(.*\)").unwrap());

// A leading run of two or more prefixes, e.g. `ID:ID: abc` or `ID: ID:ID:abc`.
static REPEATED_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*ID:(?:\s*ID:)+\s*").unwrap());

/// Anonymous-handle aliases folded into one canonical handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub anonymous_aliases: Vec<String>,
    pub anonymous_handle: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            anonymous_aliases: vec!["名無しさんの野望".to_string()],
            anonymous_handle: "名無しサモナー".to_string(),
        }
    }
}

/// [`normalize_handle_with`] using the default aliases.
pub fn normalize_handle(raw: Option<&str>) -> String {
    normalize_handle_with(raw, &NormalizerConfig::default())
}

/// Drops a `(...)` annotation block, trims, and folds anonymous aliases.
pub fn normalize_handle_with(raw: Option<&str>, config: &NormalizerConfig) -> String {
    let Some(raw) = raw else {
        return UNKNOWN.to_string();
    };
    let mut handle = ANNOTATION_RE.replace_all(raw, "").trim().to_string();
    for alias in config.anonymous_aliases.iter().filter(|a| !a.is_empty()) {
        if handle.contains(alias.as_str()) {
            handle = handle.replace(alias.as_str(), &config.anonymous_handle);
        }
    }
    if handle.is_empty() {
        return UNKNOWN.to_string();
    }
    handle
}

/// Collapses a repeated leading `ID:` prefix and guarantees the prefix on
/// any non-empty result. Idempotent.
pub fn normalize_tag(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return UNKNOWN.to_string();
    };
    let cleaned = raw.replace('\u{a0}', " ");
    let cleaned = cleaned.trim();

    let tag = REPEATED_PREFIX_RE.replace(cleaned, TAG_PREFIX);
    if tag != cleaned {
        harvest_debug!("Collapsed repeated tag prefix: {:?} -> {:?}", cleaned, tag);
    }

    if tag.is_empty() {
        UNKNOWN.to_string()
    } else if tag == UNKNOWN || tag.starts_with(TAG_PREFIX) {
        tag.into_owned()
    } else {
        format!("{TAG_PREFIX}{tag}")
    }
}
