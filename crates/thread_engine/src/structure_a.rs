use scraper::ElementRef;

use crate::body::{build_record, read_body};
use crate::layout::{direct_child, find_marked, ThreadLayout};
use crate::normalize::NormalizerConfig;
use crate::text::compact_text;
use crate::types::{ExtractError, PostRecord};

/// Extracts a self-contained post node: header and content regions are
/// direct children, every header field sits in its own labeled element.
pub fn extract_structure_a(
    post: ElementRef,
    layout: &ThreadLayout,
    normalizer: &NormalizerConfig,
) -> Result<PostRecord, ExtractError> {
    let header = direct_child(post, &layout.candidate_tag, &layout.post_header_class)
        .ok_or(ExtractError::MissingRegion { region: "header" })?;
    let content = direct_child(post, &layout.candidate_tag, &layout.post_content_class)
        .ok_or(ExtractError::MissingRegion { region: "content" })?;

    let field = |class: &str| find_marked(header, &layout.inline_tag, class).map(compact_text);

    let raw_number = field(&layout.number_class).ok_or(ExtractError::MissingRegion {
        region: "number",
    })?;
    let number = parse_post_number(&raw_number)?;

    let handle = field(&layout.handle_class);
    let tag = field(&layout.tag_class);
    let timestamp = field(&layout.date_class);

    Ok(build_record(
        number,
        handle.as_deref(),
        tag.as_deref(),
        timestamp,
        read_body(content),
        normalizer,
    ))
}

pub(crate) fn parse_post_number(raw: &str) -> Result<u32, ExtractError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ExtractError::NumberParseFailed {
            raw: raw.to_string(),
        })
}
