//! Default publishable markup for a cluster of posts.
use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::types::{PostRecord, UNKNOWN};

pub const DEFAULT_TITLE: &str = "まとめ";
const TITLE_CHARS: usize = 30;
const TITLE_MIN_BACKTRACK: usize = 15;
const BODY_STYLE: &str = "font-weight:bold;margin-bottom:90px;";
const REPLY_COLOR: &str = "color: blue;";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

static REPLY_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>>[0-9]+$").unwrap());

/// Turns a list of records into a publishable body.
pub trait Renderer: Send + Sync {
    fn render(&self, posts: &[PostRecord]) -> String;
}

/// Renders posts back into header/content pairs, with reply anchors
/// highlighted and a read-more marker after the first post.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadMarkupRenderer;

impl Renderer for ThreadMarkupRenderer {
    fn render(&self, posts: &[PostRecord]) -> String {
        if posts.is_empty() {
            return "<p>No posts selected for this topic.</p>".to_string();
        }

        let mut parts = Vec::with_capacity(posts.len() * 6 + 2);
        for (i, post) in posts.iter().enumerate() {
            if i == 1 {
                parts.push("<!-- Body -->".to_string());
                parts.push("<!--more-->".to_string());
            }
            parts.push(r#"<div class="t_h">"#.to_string());
            parts.push(render_header(post));
            parts.push("</div>".to_string());
            parts.push(format!(r#"<div class="t_b" style="{BODY_STYLE}">"#));
            parts.push(format!("  {}", render_body(&post.body_markup)));
            parts.push("</div><br />".to_string());
        }
        parts.join("\n")
    }
}

fn render_header(post: &PostRecord) -> String {
    let number = post
        .number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let mut header = format!(
        r#"{number}: <span style="color: green;">{}</span> <span style="color: gray;"> {}</span>"#,
        html_escape::encode_text(&post.author_handle),
        html_escape::encode_text(&post.timestamp),
    );
    if post.author_tag != UNKNOWN {
        header.push_str(&format!(
            r#"<span style="color: gray;"> {}</span>"#,
            html_escape::encode_text(&post.author_tag)
        ));
    }
    header
}

fn render_body(markup: &str) -> String {
    if markup.trim().is_empty() {
        return "<p><i>Content not available.</i></p>".to_string();
    }
    highlight_reply_anchors(markup)
}

/// Appends a blue color to anchors whose text is exactly `>>N`, unless the
/// anchor already declares a color. The markup is parsed as a fragment and
/// written back out node by node.
pub fn highlight_reply_anchors(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut out = String::with_capacity(markup.len() + REPLY_COLOR.len());
    for child in fragment.root_element().children() {
        write_node(child, &mut out);
    }
    out
}

fn write_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            let raw_text = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .is_some_and(|el| matches!(el.name(), "script" | "style"));
            if raw_text {
                out.push_str(text);
            } else {
                html_escape::encode_text_to_string(&**text, out);
            }
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                write_element(element, out);
            }
        }
        _ => {
            for child in node.children() {
                write_node(child, out);
            }
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let value = element.value();
    let name = value.name();
    let existing_style = value.attr("style");
    let restyled = if is_reply_anchor(element) {
        reply_style(existing_style)
    } else {
        None
    };

    out.push('<');
    out.push_str(name);
    for (key, attr_value) in value.attrs() {
        match &restyled {
            Some(style) if key == "style" => write_attr(out, key, style),
            _ => write_attr(out, key, attr_value),
        }
    }
    if let (Some(style), None) = (&restyled, existing_style) {
        write_attr(out, "style", style);
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    for child in element.children() {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    html_escape::encode_double_quoted_attribute_to_string(value, out);
    out.push('"');
}

fn is_reply_anchor(element: ElementRef<'_>) -> bool {
    element.value().name().eq_ignore_ascii_case("a")
        && REPLY_TEXT_RE.is_match(element.text().collect::<String>().trim())
}

/// The style a reply anchor should carry, or `None` when it already has a
/// color.
fn reply_style(existing: Option<&str>) -> Option<String> {
    let existing = existing.unwrap_or("").trim().trim_end_matches(';').trim_end();
    if existing.contains("color:") {
        return None;
    }
    if existing.is_empty() {
        return Some(REPLY_COLOR.to_string());
    }
    Some(format!("{existing}; {REPLY_COLOR}"))
}

/// Title for a cluster: the opening of its first post's body text.
pub fn cluster_title(posts: &[PostRecord], prefix: &str) -> String {
    let Some(first) = posts.first() else {
        return DEFAULT_TITLE.to_string();
    };
    let chars: Vec<char> = first.body_text.chars().collect();
    let head: String = chars.iter().take(TITLE_CHARS).collect();
    let mut title: Vec<char> = head.trim().chars().collect();
    if chars.len() > TITLE_CHARS {
        if let Some(last_space) = title.iter().rposition(|c| *c == ' ') {
            if last_space > TITLE_MIN_BACKTRACK {
                title.truncate(last_space);
            }
        }
        title.extend("...".chars());
    }
    format!("{prefix}{}", title.into_iter().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::{highlight_reply_anchors, reply_style};
    use scraper::{Html, Selector};

    fn anchor_attr(markup: &str, attr: &str) -> Option<String> {
        let fragment = Html::parse_fragment(markup);
        let selector = Selector::parse("a").unwrap();
        let anchor = fragment.select(&selector).next().unwrap();
        anchor.value().attr(attr).map(str::to_string)
    }

    #[test]
    fn reply_anchor_without_style_gets_color() {
        assert_eq!(
            highlight_reply_anchors(r#"<a href="/r/5">&gt;&gt;5</a> hi"#),
            r#"<a href="/r/5" style="color: blue;">&gt;&gt;5</a> hi"#
        );
    }

    #[test]
    fn non_reply_anchor_untouched() {
        let markup = r#"<a href="https://x.example">link</a>"#;
        assert_eq!(highlight_reply_anchors(markup), markup);
    }

    #[test]
    fn surrounding_markup_survives() {
        let markup = "<p>a &amp; b<br>c</p><!-- note --><img src=\"x.png\">";
        assert_eq!(highlight_reply_anchors(markup), markup);
    }

    #[test]
    fn existing_style_is_extended_once() {
        assert_eq!(
            reply_style(Some("font-size: 1em;")).as_deref(),
            Some("font-size: 1em; color: blue;")
        );
        assert_eq!(reply_style(Some("color: red")), None);
        assert_eq!(reply_style(Some(" ")).as_deref(), Some("color: blue;"));
    }

    #[test]
    fn data_style_attribute_is_not_mistaken_for_style() {
        let html = highlight_reply_anchors(r#"<a data-style="x" href="/r/5">&gt;&gt;5</a>"#);
        assert_eq!(anchor_attr(&html, "data-style").as_deref(), Some("x"));
        assert_eq!(anchor_attr(&html, "style").as_deref(), Some("color: blue;"));
        assert_eq!(anchor_attr(&html, "href").as_deref(), Some("/r/5"));
    }

    #[test]
    fn angle_bracket_inside_attribute_value() {
        let html = highlight_reply_anchors(r#"<a title="a>b" href="/r/5">&gt;&gt;5</a>"#);
        assert_eq!(anchor_attr(&html, "title").as_deref(), Some("a>b"));
        assert_eq!(anchor_attr(&html, "style").as_deref(), Some("color: blue;"));
    }

    #[test]
    fn nested_reply_text_is_matched() {
        let html = highlight_reply_anchors(r#"<a href="/r/2"><b>&gt;&gt;2</b></a>"#);
        assert_eq!(anchor_attr(&html, "style").as_deref(), Some("color: blue;"));
    }
}
