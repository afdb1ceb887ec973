//! Thread engine: structured post extraction from archived discussion threads.
mod aggregate;
mod body;
mod cluster;
mod decode;
mod layout;
mod loader;
mod normalize;
mod pairing;
mod pipeline;
mod publish;
mod render;
mod scanner;
mod structure_a;
mod structure_b;
mod text;
mod types;

pub use aggregate::{aggregate, Aggregated};
pub use cluster::{Clusterer, LengthFilterClusterer, DEFAULT_MIN_POST_LENGTH};
pub use decode::{decode_thread_bytes, DecodeError, DecodedHtml};
pub use layout::{NodeKind, ThreadLayout, DEFAULT_MAX_CANDIDATES};
pub use loader::{DocumentLoader, FileLoader, LoadError};
pub use normalize::{normalize_handle, normalize_handle_with, normalize_tag, NormalizerConfig};
pub use pairing::{classify_sibling, find_paired_content, SiblingKind};
pub use pipeline::{Pipeline, RunSummary};
pub use publish::{PublishError, PublishSink};
pub use render::{cluster_title, highlight_reply_anchors, Renderer, ThreadMarkupRenderer, DEFAULT_TITLE};
pub use scanner::{isolate_document, ScanOutput, ThreadScanner};
pub use structure_a::extract_structure_a;
pub use structure_b::{
    extract_structure_b, resolve_from_flattened_text, resolve_header_fields,
    resolve_inline_timestamp, resolve_leading_handle, resolve_tag_and_adjacent_timestamp,
    HeaderFields, HeaderView, Resolver, HEADER_RESOLVERS,
};
pub use text::extract_references;
pub use types::{ExtractError, PostRecord, ScanStats, ThreadExtraction, TAG_PREFIX, UNKNOWN};
