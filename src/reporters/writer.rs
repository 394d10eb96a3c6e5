use crate::core::models::{ArtifactPaths, Target};
use crate::core::parser::count_raw;
use crate::utils::fs::{atomic_write, read_optional};
use crate::utils::time::iso_timestamp;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw line count of every well-known artifact, zero when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub subdomains: usize,
    pub resolved: usize,
    pub ports: usize,
    pub http_services: usize,
    pub endpoints: usize,
    pub consolidated_urls: usize,
}

impl SummaryStats {
    pub fn rows(&self) -> [(&'static str, usize); 6] {
        [
            ("subdomains", self.subdomains),
            ("resolved", self.resolved),
            ("ports", self.ports),
            ("http_services", self.http_services),
            ("endpoints", self.endpoints),
            ("consolidated_urls", self.consolidated_urls),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub target: String,
    pub timestamp: String,
    pub stats: SummaryStats,
}

fn line_count(path: &Path) -> Result<usize> {
    Ok(read_optional(path)?.as_deref().map(count_raw).unwrap_or(0))
}

pub fn collect_stats(paths: &ArtifactPaths) -> Result<SummaryStats> {
    Ok(SummaryStats {
        subdomains: line_count(&paths.subdomains)?,
        resolved: line_count(&paths.resolved)?,
        ports: line_count(&paths.ports)?,
        http_services: line_count(&paths.http_services)?,
        endpoints: line_count(&paths.crawl)?,
        consolidated_urls: line_count(&paths.consolidated)?,
    })
}

/// Build the run summary and persist it, replacing any earlier one.
pub fn write_summary(paths: &ArtifactPaths, target: &Target) -> Result<RunSummary> {
    let summary = RunSummary {
        target: target.identity(),
        timestamp: iso_timestamp(),
        stats: collect_stats(paths)?,
    };

    let json = serde_json::to_string_pretty(&summary)?;
    atomic_write(&paths.summary, json.as_bytes())?;

    tracing::info!("Summary saved to {:?}", paths.summary);
    Ok(summary)
}
