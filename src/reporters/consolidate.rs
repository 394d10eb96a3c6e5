use crate::core::models::ArtifactPaths;
use crate::core::parser::{crawl_line_url, probe_line_target, probe_line_url};
use crate::utils::fs::{read_optional, write_lines};
use anyhow::Result;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// A file written by a reporting step and the number of entries it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub path: PathBuf,
    pub count: usize,
}

/// Union of the URLs in the service-probe and crawl artifacts, deduplicated
/// by exact string and sorted ascending.
pub fn collect_urls(http_services: Option<&str>, crawl: Option<&str>) -> BTreeSet<String> {
    let probed = http_services.into_iter().flat_map(str::lines).filter_map(probe_line_url);
    let crawled = crawl.into_iter().flat_map(str::lines).filter_map(crawl_line_url);
    probed.chain(crawled).map(str::to_string).collect()
}

/// Write the consolidated URL artifact. Missing inputs count as empty.
pub fn build_consolidated(paths: &ArtifactPaths) -> Result<WrittenArtifact> {
    let http_services = read_optional(&paths.http_services)?;
    let crawl = read_optional(&paths.crawl)?;

    let urls = collect_urls(http_services.as_deref(), crawl.as_deref());
    write_lines(&paths.consolidated, &urls)?;

    tracing::info!("Consolidated {} unique URLs into {:?}", urls.len(), paths.consolidated);
    Ok(WrittenArtifact {
        path: paths.consolidated.clone(),
        count: urls.len(),
    })
}

/// Strip service-probe annotations so the crawler receives one bare target per line.
/// First occurrence wins; order is otherwise preserved.
pub fn crawl_targets(http_services: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    http_services
        .lines()
        .filter_map(probe_line_target)
        .filter(|target| seen.insert(*target))
        .collect()
}

pub fn prepare_crawl_input(http_services: &Path, crawl_input: &Path) -> Result<usize> {
    let content = read_optional(http_services)?.unwrap_or_default();
    let targets = crawl_targets(&content);
    write_lines(crawl_input, &targets)?;
    Ok(targets.len())
}
