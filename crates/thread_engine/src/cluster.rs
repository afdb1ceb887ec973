use harvest_logging::{harvest_info, harvest_warn};

use crate::types::PostRecord;

pub const DEFAULT_MIN_POST_LENGTH: usize = 8;

/// Partitions a record set into topic clusters.
pub trait Clusterer: Send + Sync {
    fn cluster(&self, posts: &[PostRecord]) -> Vec<Vec<PostRecord>>;
}

/// Drops short posts and returns the rest as one cluster, ordered by number.
/// No semantic grouping is attempted.
#[derive(Debug, Clone, Copy)]
pub struct LengthFilterClusterer {
    pub min_post_length: usize,
}

impl Default for LengthFilterClusterer {
    fn default() -> Self {
        Self {
            min_post_length: DEFAULT_MIN_POST_LENGTH,
        }
    }
}

impl Clusterer for LengthFilterClusterer {
    fn cluster(&self, posts: &[PostRecord]) -> Vec<Vec<PostRecord>> {
        let mut kept: Vec<PostRecord> = posts
            .iter()
            .filter(|post| post.body_text.chars().count() >= self.min_post_length)
            .cloned()
            .collect();
        harvest_info!(
            "Removed {} posts shorter than {} characters.",
            posts.len() - kept.len(),
            self.min_post_length
        );
        if kept.is_empty() {
            harvest_warn!("No posts remaining after filtering.");
            return Vec::new();
        }
        kept.sort_by_key(|post| (post.number.is_none(), post.number));
        vec![kept]
    }
}
