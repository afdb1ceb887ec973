//! Text renderings of markup nodes and the field patterns matched against them.
use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;

/// Four-digit year followed by a slash; the loose "looks like a date" test.
pub(crate) static YEAR_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}/").unwrap());

/// `YYYY/MM/DD(曜) HH:MM:SS[.fff]`
pub(crate) static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{4}/[0-9]{2}/[0-9]{2}\(.*?\)\s*[0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]+)?")
        .unwrap()
});

pub(crate) static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ID:\s?\S+").unwrap());

static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\s*:?").unwrap());

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">>([0-9]+)").unwrap());

/// Text nodes trimmed and concatenated without a separator.
pub(crate) fn compact_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Text nodes trimmed and joined with single spaces; element boundaries act
/// as separators so adjacent fields never run together.
pub(crate) fn flattened_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{a0}', " ")
}

/// Trimmed text of an arbitrary node: a text node's content or an element's
/// compact text. Other node kinds render empty.
pub(crate) fn node_text(node: NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Text(text) => text.trim().to_string(),
        Node::Element(_) => ElementRef::wrap(node).map(compact_text).unwrap_or_default(),
        _ => String::new(),
    }
}

pub(crate) fn is_blank_text(node: NodeRef<'_, Node>) -> bool {
    matches!(node.value(), Node::Text(text) if text.trim().is_empty())
}

pub(crate) fn leading_number(text: &str) -> Option<&str> {
    LEADING_NUMBER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Every `>>N` marker in order, duplicates kept. Numbers too large for `u32`
/// are dropped.
pub fn extract_references(text: &str) -> Vec<u32> {
    REFERENCE_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

pub(crate) fn find_timestamp(text: &str) -> Option<&str> {
    TIMESTAMP_RE.find(text).map(|m| m.as_str())
}
