use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use ego_tree::NodeId;
use harvest_logging::{harvest_debug, harvest_error, harvest_info, harvest_warn};
use scraper::{ElementRef, Html};

use crate::aggregate::aggregate;
use crate::layout::{NodeKind, ThreadLayout};
use crate::normalize::NormalizerConfig;
use crate::pairing::find_paired_content;
use crate::structure_a::extract_structure_a;
use crate::structure_b::extract_structure_b;
use crate::types::{ExtractError, PostRecord, ScanStats, ThreadExtraction};

/// Records produced by one forward pass, before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanOutput {
    pub records: Vec<PostRecord>,
    pub stats: ScanStats,
}

/// Walks a thread container, dispatching every candidate node to the
/// extractor for its layout.
#[derive(Debug, Clone, Default)]
pub struct ThreadScanner {
    layout: ThreadLayout,
    normalizer: NormalizerConfig,
}

impl ThreadScanner {
    pub fn new(layout: ThreadLayout, normalizer: NormalizerConfig) -> Self {
        Self { layout, normalizer }
    }

    pub fn layout(&self) -> &ThreadLayout {
        &self.layout
    }

    /// Extracts the final, ordered record set of one document.
    pub fn extract_document(&self, html: &str) -> ThreadExtraction {
        isolate_document(|| self.scan(html))
    }

    /// Parses `html`, locates the container and runs one forward pass.
    pub fn scan(&self, html: &str) -> Result<ScanOutput, ExtractError> {
        let document = Html::parse_document(html);
        let container = self.locate_container(&document)?;
        let candidates = self.enumerate_candidates(container);
        harvest_info!(
            "Found {} potential post start elements to check.",
            candidates.len()
        );
        let mut consumed = HashSet::new();
        Ok(self.dispatch(&candidates, &mut consumed))
    }

    pub fn locate_container<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ExtractError> {
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(self.layout.container_id.as_str()))
            .ok_or_else(|| ExtractError::ContainerNotFound {
                container_id: self.layout.container_id.clone(),
            })
    }

    /// Direct child candidates, or every descendant candidate when the
    /// container has none. Both are capped at `max_candidates`.
    pub fn enumerate_candidates<'a>(&self, container: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let is_candidate =
            |el: &ElementRef<'a>| el.value().name().eq_ignore_ascii_case(&self.layout.candidate_tag);

        let direct: Vec<_> = container
            .children()
            .filter_map(ElementRef::wrap)
            .filter(is_candidate)
            .take(self.layout.max_candidates)
            .collect();
        if !direct.is_empty() {
            return direct;
        }

        harvest_warn!("No direct candidates in thread container, searching recursively.");
        container
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(is_candidate)
            .take(self.layout.max_candidates)
            .collect()
    }

    /// One forward pass over `candidates` in order. Nodes folded into a
    /// record (or rejected headers) go into `consumed` and are skipped if
    /// reached again.
    pub fn dispatch(
        &self,
        candidates: &[ElementRef<'_>],
        consumed: &mut HashSet<NodeId>,
    ) -> ScanOutput {
        let mut output = ScanOutput::default();
        output.stats.candidates = candidates.len();

        for &candidate in candidates {
            if consumed.contains(&node_id(candidate)) {
                continue;
            }
            match self.layout.classify(candidate.value()) {
                NodeKind::StructureA => {
                    consumed.insert(node_id(candidate));
                    match extract_structure_a(candidate, &self.layout, &self.normalizer) {
                        Ok(post) => {
                            output.stats.structure_a += 1;
                            output.records.push(post);
                        }
                        Err(err) => {
                            log_skip("Structure A", candidate, &err);
                            output.stats.record_failure(&err);
                        }
                    }
                }
                NodeKind::HeaderB => {
                    consumed.insert(node_id(candidate));
                    let Some(content) = find_paired_content(candidate, &self.layout) else {
                        let err = ExtractError::PairingFailed;
                        log_skip("Structure B", candidate, &err);
                        output.stats.record_failure(&err);
                        continue;
                    };
                    consumed.insert(node_id(content));
                    match extract_structure_b(candidate, content, &self.layout, &self.normalizer)
                    {
                        Ok(post) => {
                            output.stats.structure_b += 1;
                            output.records.push(post);
                        }
                        Err(err) => {
                            log_skip("Structure B", candidate, &err);
                            output.stats.record_failure(&err);
                        }
                    }
                }
                NodeKind::ContentB | NodeKind::Unrecognized => {}
            }
        }
        harvest_debug!("Scan finished: {:?}", output.stats);
        output
    }
}

/// Runs one document's scan and aggregates its records.
///
/// A missing container or a panic inside `scan` yields an empty result for
/// this document only; the panic does not propagate.
pub fn isolate_document<F>(scan: F) -> ThreadExtraction
where
    F: FnOnce() -> Result<ScanOutput, ExtractError>,
{
    let output = match panic::catch_unwind(AssertUnwindSafe(scan)) {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            harvest_error!("Could not extract thread: {}", err);
            let mut stats = ScanStats::default();
            stats.record_failure(&err);
            return ThreadExtraction {
                posts: Vec::new(),
                stats,
            };
        }
        Err(_) => {
            harvest_error!("Structural fault while scanning thread; document skipped");
            return ThreadExtraction {
                posts: Vec::new(),
                stats: ScanStats {
                    aborted: true,
                    ..ScanStats::default()
                },
            };
        }
    };

    let aggregated = aggregate(output.records);
    let mut stats = output.stats;
    stats.duplicates_dropped = aggregated.duplicates_dropped;
    stats.unnumbered = aggregated.unnumbered;
    harvest_info!(
        "Parsed {} unique posts ({} skipped, {} duplicates)",
        aggregated.posts.len(),
        stats.skipped(),
        stats.duplicates_dropped
    );
    ThreadExtraction {
        posts: aggregated.posts,
        stats,
    }
}

fn node_id(element: ElementRef<'_>) -> NodeId {
    (*element).id()
}

fn log_skip(layout: &str, element: ElementRef<'_>, err: &ExtractError) {
    let label = element
        .value()
        .id()
        .map(str::to_string)
        .unwrap_or_else(|| crate::text::flattened_text(element).chars().take(30).collect());
    match err {
        ExtractError::MissingRegion { region: "number" } => {
            harvest_error!("{}: failed to extract number from {:?}", layout, label);
        }
        _ => harvest_warn!("{}: skipping {:?}: {}", layout, label, err),
    }
}
