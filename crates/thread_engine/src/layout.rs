use scraper::node::Element;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// Upper bound on candidate nodes examined per document.
pub const DEFAULT_MAX_CANDIDATES: usize = 2_500;

/// Marker literals that identify the thread container and both post layouts.
///
/// Structure A is a self-contained `post` node with `post-header` and
/// `post-content` children. Structure B splits a post into a `t_h` header
/// node followed (possibly after line breaks) by a `t_b` content node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadLayout {
    pub container_id: String,
    pub candidate_tag: String,
    pub max_candidates: usize,
    pub post_class: String,
    pub post_header_class: String,
    pub post_content_class: String,
    pub number_class: String,
    pub tag_class: String,
    pub handle_class: String,
    pub date_class: String,
    pub header_class: String,
    pub content_class: String,
    pub inline_tag: String,
}

impl Default for ThreadLayout {
    fn default() -> Self {
        Self {
            container_id: "threadcontent".to_string(),
            candidate_tag: "div".to_string(),
            max_candidates: DEFAULT_MAX_CANDIDATES,
            post_class: "post".to_string(),
            post_header_class: "post-header".to_string(),
            post_content_class: "post-content".to_string(),
            number_class: "postid".to_string(),
            tag_class: "uid".to_string(),
            handle_class: "postusername".to_string(),
            date_class: "date".to_string(),
            header_class: "t_h".to_string(),
            content_class: "t_b".to_string(),
            inline_tag: "span".to_string(),
        }
    }
}

/// Layout convention recognized on a candidate node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    StructureA,
    HeaderB,
    ContentB,
    Unrecognized,
}

impl ThreadLayout {
    pub fn classify(&self, element: &Element) -> NodeKind {
        if has_class(element, &self.post_class) {
            NodeKind::StructureA
        } else if has_class(element, &self.header_class) {
            NodeKind::HeaderB
        } else if self.is_content_b(element) {
            NodeKind::ContentB
        } else {
            NodeKind::Unrecognized
        }
    }

    pub(crate) fn is_content_b(&self, element: &Element) -> bool {
        element.name().eq_ignore_ascii_case(&self.candidate_tag)
            && has_class(element, &self.content_class)
    }
}

pub(crate) fn has_class(element: &Element, class: &str) -> bool {
    element.classes().any(|c| c == class)
}

fn is_marked(element: &Element, tag: &str, class: &str) -> bool {
    element.name().eq_ignore_ascii_case(tag) && has_class(element, class)
}

/// First direct child element with the given tag and class.
pub(crate) fn direct_child<'a>(
    parent: ElementRef<'a>,
    tag: &str,
    class: &str,
) -> Option<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| is_marked(child.value(), tag, class))
}

/// First descendant element (excluding `scope` itself) with the given tag and class.
pub(crate) fn find_marked<'a>(scope: ElementRef<'a>, tag: &str, class: &str) -> Option<ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| is_marked(el.value(), tag, class))
}
