//! Extraction for posts split across a `t_h` header and a `t_b` content node.
//!
//! Header fields have no dedicated markers in this layout, so they are located
//! by an ordered list of resolvers. Each resolver only fills fields that are
//! still unset; whatever remains unset after the last one becomes `Unknown`.
//!
//! Known limitation: only the first inline element is ever considered as the
//! author handle.
use harvest_logging::{harvest_trace, harvest_warn};
use scraper::ElementRef;

use crate::body::{build_record, read_body};
use crate::layout::ThreadLayout;
use crate::normalize::NormalizerConfig;
use crate::structure_a::parse_post_number;
use crate::text::{compact_text, find_timestamp, flattened_text, leading_number, node_text};
use crate::text::{TAG_RE, YEAR_SLASH_RE};
use crate::types::{ExtractError, PostRecord, TAG_PREFIX};

/// The header as seen by the resolvers.
#[derive(Debug, Clone)]
pub struct HeaderView<'a> {
    pub text: String,
    pub inline: Vec<ElementRef<'a>>,
}

impl<'a> HeaderView<'a> {
    pub fn new(header: ElementRef<'a>, layout: &ThreadLayout) -> Self {
        let inline = header
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case(&layout.inline_tag))
            .collect();
        Self {
            text: flattened_text(header),
            inline,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub handle: Option<String>,
    pub tag: Option<String>,
    pub timestamp: Option<String>,
}

pub type Resolver = fn(&HeaderView<'_>, &mut HeaderFields);

/// Resolvers in precedence order.
pub const HEADER_RESOLVERS: &[(&str, Resolver)] = &[
    ("leading-handle", resolve_leading_handle),
    ("tag-and-adjacent-timestamp", resolve_tag_and_adjacent_timestamp),
    ("inline-timestamp", resolve_inline_timestamp),
    ("flattened-text", resolve_from_flattened_text),
];

pub fn resolve_header_fields(view: &HeaderView<'_>) -> HeaderFields {
    let mut fields = HeaderFields::default();
    for (name, resolver) in HEADER_RESOLVERS {
        let before = fields.clone();
        resolver(view, &mut fields);
        if fields != before {
            harvest_trace!("Header resolver {} -> {:?}", name, fields);
        }
    }
    fields
}

/// The first inline element is the handle unless it looks like a date or a tag.
pub fn resolve_leading_handle(view: &HeaderView<'_>, fields: &mut HeaderFields) {
    if fields.handle.is_some() {
        return;
    }
    let Some(first) = view.inline.first() else {
        return;
    };
    let text = compact_text(*first);
    if !text.is_empty() && !YEAR_SLASH_RE.is_match(&text) && !text.contains(TAG_PREFIX) {
        fields.handle = Some(text);
    }
}

/// The last inline element starting with `ID:` is the tag; the timestamp is
/// looked for right before it, first in the preceding sibling node, then in
/// the preceding inline element.
pub fn resolve_tag_and_adjacent_timestamp(view: &HeaderView<'_>, fields: &mut HeaderFields) {
    if fields.tag.is_some() {
        return;
    }
    let found = view.inline.iter().enumerate().rev().find_map(|(idx, el)| {
        let text = compact_text(*el).replace('\u{a0}', " ").trim().to_string();
        text.starts_with(TAG_PREFIX).then_some((idx, *el, text))
    });
    let Some((idx, tag_el, tag_text)) = found else {
        return;
    };
    fields.tag = Some(tag_text);

    if fields.timestamp.is_some() {
        return;
    }
    let from_sibling = tag_el
        .prev_sibling()
        .map(node_text)
        .and_then(|text| timestamp_like(&text));
    let from_inline = || {
        idx.checked_sub(1)
            .and_then(|prev| view.inline.get(prev))
            .map(|el| compact_text(*el))
            .and_then(|text| timestamp_like(&text))
    };
    fields.timestamp = from_sibling.or_else(from_inline);
}

pub fn resolve_inline_timestamp(view: &HeaderView<'_>, fields: &mut HeaderFields) {
    if fields.timestamp.is_some() {
        return;
    }
    fields.timestamp = view
        .inline
        .iter()
        .find_map(|el| find_timestamp(&compact_text(*el)).map(str::to_string));
}

pub fn resolve_from_flattened_text(view: &HeaderView<'_>, fields: &mut HeaderFields) {
    if fields.tag.is_none() {
        fields.tag = TAG_RE.find(&view.text).map(|m| m.as_str().to_string());
    }
    if fields.timestamp.is_none() {
        fields.timestamp = find_timestamp(&view.text).map(str::to_string);
    }
}

// Full pattern when present, otherwise the whole text if it at least carries
// a year-slash.
fn timestamp_like(text: &str) -> Option<String> {
    if let Some(ts) = find_timestamp(text) {
        return Some(ts.to_string());
    }
    YEAR_SLASH_RE
        .is_match(text)
        .then(|| text.trim().to_string())
}

/// Extracts a header/content pair.
pub fn extract_structure_b(
    header: ElementRef,
    content: ElementRef,
    layout: &ThreadLayout,
    normalizer: &NormalizerConfig,
) -> Result<PostRecord, ExtractError> {
    let view = HeaderView::new(header, layout);
    let Some(raw_number) = leading_number(&view.text) else {
        harvest_warn!(
            "Structure B: no post number at start of header {:?}",
            view.text.chars().take(50).collect::<String>()
        );
        return Err(ExtractError::MissingRegion { region: "number" });
    };
    let number = parse_post_number(raw_number)?;

    let fields = resolve_header_fields(&view);
    Ok(build_record(
        number,
        fields.handle.as_deref(),
        fields.tag.as_deref(),
        fields.timestamp,
        read_body(content),
        normalizer,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn with_header<R>(markup: &str, f: impl FnOnce(&HeaderView<'_>) -> R) -> R {
        let doc = Html::parse_fragment(&format!(r#"<div class="t_h">{markup}</div>"#));
        let header = doc
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "div")
            .unwrap();
        let view = HeaderView::new(header, &ThreadLayout::default());
        f(&view)
    }

    #[test]
    fn leading_handle_skips_dates_and_tags() {
        with_header("1 : <span>bob</span>", |view| {
            let mut fields = HeaderFields::default();
            resolve_leading_handle(view, &mut fields);
            assert_eq!(fields.handle.as_deref(), Some("bob"));
        });
        with_header("1 : <span>2024/01/02(火) 10:00:00</span>", |view| {
            let mut fields = HeaderFields::default();
            resolve_leading_handle(view, &mut fields);
            assert_eq!(fields.handle, None);
        });
        with_header("1 : <span>ID:abc</span>", |view| {
            let mut fields = HeaderFields::default();
            resolve_leading_handle(view, &mut fields);
            assert_eq!(fields.handle, None);
        });
    }

    #[test]
    fn tag_takes_timestamp_from_preceding_text_node() {
        with_header(
            "3 : <span>bob</span> 2024/01/02(火) 10:00:00.12<span>ID:xyz</span>",
            |view| {
                let mut fields = HeaderFields::default();
                resolve_tag_and_adjacent_timestamp(view, &mut fields);
                assert_eq!(fields.tag.as_deref(), Some("ID:xyz"));
                assert_eq!(fields.timestamp.as_deref(), Some("2024/01/02(火) 10:00:00.12"));
            },
        );
    }

    #[test]
    fn tag_falls_back_to_preceding_inline_element() {
        with_header(
            "3 : <span>bob</span> <span>2024/01/02(火) 10:00:00</span> <span>ID:\u{a0}xyz</span>",
            |view| {
                let mut fields = HeaderFields::default();
                resolve_tag_and_adjacent_timestamp(view, &mut fields);
                assert_eq!(fields.tag.as_deref(), Some("ID: xyz"));
                assert_eq!(fields.timestamp.as_deref(), Some("2024/01/02(火) 10:00:00"));
            },
        );
    }

    #[test]
    fn last_tag_element_wins() {
        with_header("3 : <span>ID:first</span> <span>ID:second</span>", |view| {
            let mut fields = HeaderFields::default();
            resolve_tag_and_adjacent_timestamp(view, &mut fields);
            assert_eq!(fields.tag.as_deref(), Some("ID:second"));
            assert_eq!(fields.timestamp, None);
        });
    }

    #[test]
    fn inline_timestamp_scan_takes_first_match() {
        with_header(
            "3 : <span>at 2024/01/02(火) 10:00:00</span><span>2025/01/02(木) 11:00:00</span>",
            |view| {
                let mut fields = HeaderFields::default();
                resolve_inline_timestamp(view, &mut fields);
                assert_eq!(fields.timestamp.as_deref(), Some("2024/01/02(火) 10:00:00"));
            },
        );
    }

    #[test]
    fn flattened_text_fallback_fills_remaining_fields() {
        with_header("3 : bob 2024/01/02(火) 10:00:00 ID:plain", |view| {
            let fields = resolve_header_fields(view);
            assert_eq!(fields.handle, None);
            assert_eq!(fields.tag.as_deref(), Some("ID:plain"));
            assert_eq!(fields.timestamp.as_deref(), Some("2024/01/02(火) 10:00:00"));
        });
    }

    #[test]
    fn resolvers_never_overwrite_earlier_results() {
        with_header(
            "3 : <span>bob</span> <span>2024/01/02(火) 10:00:00</span> <span>ID:one</span> ID:two",
            |view| {
                let fields = resolve_header_fields(view);
                assert_eq!(fields.handle.as_deref(), Some("bob"));
                assert_eq!(fields.tag.as_deref(), Some("ID:one"));
            },
        );
    }
}
