use std::collections::HashSet;

use harvest_logging::{harvest_debug, harvest_warn};

use crate::types::PostRecord;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregated {
    pub posts: Vec<PostRecord>,
    pub duplicates_dropped: usize,
    pub unnumbered: usize,
}

/// Orders records by number (unnumbered last, scan order kept for ties) and
/// keeps only the first record for each number. Unnumbered records are all
/// retained.
pub fn aggregate(mut records: Vec<PostRecord>) -> Aggregated {
    records.sort_by_key(|post| (post.number.is_none(), post.number));

    let mut seen = HashSet::new();
    let mut out = Aggregated::default();
    for post in records {
        match post.number {
            Some(number) if !seen.insert(number) => {
                harvest_debug!("Skipping duplicate post number: {}", number);
                out.duplicates_dropped += 1;
            }
            Some(_) => out.posts.push(post),
            None => {
                harvest_warn!(
                    "Including post with missing number: {:?}",
                    post.body_text.chars().take(50).collect::<String>()
                );
                out.unnumbered += 1;
                out.posts.push(post);
            }
        }
    }

    if out.duplicates_dropped > 0 {
        harvest_warn!(
            "Removed {} duplicate posts based on post number.",
            out.duplicates_dropped
        );
    }
    out
}
