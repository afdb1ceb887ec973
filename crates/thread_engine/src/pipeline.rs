use std::path::Path;

use harvest_logging::{harvest_error, harvest_info, harvest_warn};

use crate::cluster::Clusterer;
use crate::loader::{DocumentLoader, LoadError};
use crate::publish::PublishSink;
use crate::render::{cluster_title, Renderer};
use crate::scanner::ThreadScanner;
use crate::types::ScanStats;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub posts: usize,
    pub clusters: usize,
    pub published: usize,
    pub failed: usize,
    pub stats: ScanStats,
}

/// Load -> extract -> cluster -> (title, render, publish) per cluster.
pub struct Pipeline<'a> {
    pub loader: &'a dyn DocumentLoader,
    pub scanner: &'a ThreadScanner,
    pub clusterer: &'a dyn Clusterer,
    pub renderer: &'a dyn Renderer,
    pub sink: &'a dyn PublishSink,
    pub title_prefix: &'a str,
}

impl Pipeline<'_> {
    pub fn run(&self, path: &Path) -> Result<RunSummary, LoadError> {
        harvest_info!("Parsing posts from {:?}", path);
        let html = self.loader.load(path)?;
        let extraction = self.scanner.extract_document(&html);

        let mut summary = RunSummary {
            posts: extraction.posts.len(),
            stats: extraction.stats,
            ..RunSummary::default()
        };
        if extraction.posts.is_empty() {
            harvest_error!("Failed to parse any posts from {:?}", path);
            return Ok(summary);
        }

        let clusters = self.clusterer.cluster(&extraction.posts);
        summary.clusters = clusters.len();
        if clusters.is_empty() {
            harvest_warn!("No topic clusters identified.");
            return Ok(summary);
        }

        for (i, cluster) in clusters.iter().enumerate() {
            let cluster_id = i + 1;
            let title = cluster_title(cluster, self.title_prefix);
            harvest_info!(
                "Cluster {} ({} posts): {}",
                cluster_id,
                cluster.len(),
                title
            );
            let body = self.renderer.render(cluster);
            match self.sink.publish(&title, &body) {
                Ok(()) => summary.published += 1,
                Err(err) => {
                    harvest_error!("Publishing failed for cluster {}: {}", cluster_id, err);
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }
}
