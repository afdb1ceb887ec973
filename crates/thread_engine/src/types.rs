use serde::{Deserialize, Serialize};

/// Placeholder for any field that could not be recovered.
pub const UNKNOWN: &str = "Unknown";

/// Literal prefix every recovered author tag carries.
pub const TAG_PREFIX: &str = "ID:";

/// One post recovered from a thread document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Position of the post within the thread. `None` sorts last.
    pub number: Option<u32>,
    pub author_handle: String,
    pub author_tag: String,
    pub timestamp: String,
    /// Inner markup of the body, trimmed.
    pub body_markup: String,
    /// Plain-text rendering of the body.
    pub body_text: String,
    /// Back-references in order of appearance, duplicates kept.
    pub references: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("thread container #{container_id} not found")]
    ContainerNotFound { container_id: String },
    #[error("missing {region} region")]
    MissingRegion { region: &'static str },
    #[error("header has no matching content node")]
    PairingFailed,
    #[error("could not parse post number from {raw:?}")]
    NumberParseFailed { raw: String },
}

/// Counters for every non-fatal condition met while extracting one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScanStats {
    pub candidates: usize,
    pub structure_a: usize,
    pub structure_b: usize,
    pub missing_region: usize,
    pub number_parse_failed: usize,
    pub pairing_failed: usize,
    pub duplicates_dropped: usize,
    pub unnumbered: usize,
    pub container_missing: bool,
    pub aborted: bool,
}

impl ScanStats {
    pub(crate) fn record_failure(&mut self, err: &ExtractError) {
        match err {
            ExtractError::ContainerNotFound { .. } => self.container_missing = true,
            ExtractError::MissingRegion { .. } => self.missing_region += 1,
            ExtractError::PairingFailed => self.pairing_failed += 1,
            ExtractError::NumberParseFailed { .. } => self.number_parse_failed += 1,
        }
    }

    /// Number of candidate nodes (or pairs) that yielded no record.
    pub fn skipped(&self) -> usize {
        self.missing_region + self.number_parse_failed + self.pairing_failed
    }
}

/// Final, ordered result of extracting one thread document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ThreadExtraction {
    pub posts: Vec<PostRecord>,
    pub stats: ScanStats,
}
