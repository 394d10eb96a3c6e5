use super::consolidate::WrittenArtifact;
use crate::core::models::ArtifactPaths;
use crate::utils::fs::{atomic_write, read_optional};
use anyhow::Result;
use minijinja::{context, Environment};

const PROMPT_TEMPLATE: &str = "Analyze these URLs and find high-risk endpoints:\n{{ urls }}";

/// First `max_urls` non-blank crawl lines, in file order.
pub fn select_urls(crawl: &str, max_urls: usize) -> Vec<&str> {
    crawl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(max_urls)
        .collect()
}

pub fn render_prompt(urls: &[&str]) -> Result<String> {
    let listing = serde_json::to_string_pretty(urls)?;
    let env = Environment::new();
    Ok(env.render_str(PROMPT_TEMPLATE, context! { urls => listing })?)
}

/// Write the analysis prompt. Returns `None` when there are no crawl results.
pub fn write_prompt(paths: &ArtifactPaths, max_urls: usize) -> Result<Option<WrittenArtifact>> {
    let Some(crawl) = read_optional(&paths.crawl)? else {
        return Ok(None);
    };

    let urls = select_urls(&crawl, max_urls);
    if urls.is_empty() {
        return Ok(None);
    }

    let prompt = render_prompt(&urls)?;
    atomic_write(&paths.prompt, prompt.as_bytes())?;

    tracing::info!("Analysis prompt with {} URLs written to {:?}", urls.len(), paths.prompt);
    Ok(Some(WrittenArtifact {
        path: paths.prompt.clone(),
        count: urls.len(),
    }))
}
