//! Pairs a Structure-B header with the content node that follows it.
//!
//! The walk goes forward through the header's siblings only. Line breaks and
//! whitespace-only text are stepped over; the first content node ends the walk
//! with a pairing, and anything else ends it without one. A header can
//! therefore never reach past another header to claim its content.
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::ElementRef;

use crate::layout::ThreadLayout;
use crate::text::is_blank_text;

/// How a sibling affects the pairing walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingKind {
    Content,
    Skippable,
    Barrier,
}

#[derive(Debug, Clone, Copy)]
enum PairingState<'a> {
    Scanning(Option<NodeRef<'a, Node>>),
    Paired(ElementRef<'a>),
    Unpaired,
}

pub fn classify_sibling(node: NodeRef<'_, Node>, layout: &ThreadLayout) -> SiblingKind {
    match node.value() {
        Node::Element(element) if layout.is_content_b(element) => SiblingKind::Content,
        Node::Element(element) if element.name().eq_ignore_ascii_case("br") => {
            SiblingKind::Skippable
        }
        Node::Text(_) if is_blank_text(node) => SiblingKind::Skippable,
        _ => SiblingKind::Barrier,
    }
}

/// Returns the content node paired with `header`, if any.
pub fn find_paired_content<'a>(
    header: ElementRef<'a>,
    layout: &ThreadLayout,
) -> Option<ElementRef<'a>> {
    let mut state = PairingState::Scanning(header.next_sibling());
    loop {
        state = match state {
            PairingState::Scanning(None) => PairingState::Unpaired,
            PairingState::Scanning(Some(node)) => match classify_sibling(node, layout) {
                SiblingKind::Content => match ElementRef::wrap(node) {
                    Some(content) => PairingState::Paired(content),
                    None => PairingState::Unpaired,
                },
                SiblingKind::Skippable => PairingState::Scanning(node.next_sibling()),
                SiblingKind::Barrier => PairingState::Unpaired,
            },
            PairingState::Paired(content) => return Some(content),
            PairingState::Unpaired => return None,
        };
    }
}
