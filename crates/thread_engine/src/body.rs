use scraper::ElementRef;

use crate::normalize::{normalize_handle_with, normalize_tag, NormalizerConfig};
use crate::text::{extract_references, flattened_text};
use crate::types::{PostRecord, UNKNOWN};

/// Body fields shared by both layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostBody {
    pub markup: String,
    pub text: String,
    pub references: Vec<u32>,
}

pub(crate) fn read_body(content: ElementRef) -> PostBody {
    let markup = content.inner_html().trim().to_string();
    // Space-joined so a `>>5` anchor followed by text never fuses into
    // a different number.
    let text = flattened_text(content);
    let references = extract_references(&text);
    PostBody {
        markup,
        text,
        references,
    }
}

/// Assembles a record, running both normalizers on the raw author fields.
pub(crate) fn build_record(
    number: u32,
    raw_handle: Option<&str>,
    raw_tag: Option<&str>,
    timestamp: Option<String>,
    body: PostBody,
    normalizer: &NormalizerConfig,
) -> PostRecord {
    PostRecord {
        number: Some(number),
        author_handle: normalize_handle_with(raw_handle, normalizer),
        author_tag: normalize_tag(raw_tag),
        timestamp: timestamp
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        body_markup: body.markup,
        body_text: body.text,
        references: body.references,
    }
}
