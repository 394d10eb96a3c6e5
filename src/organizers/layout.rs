use crate::core::models::ArtifactPaths;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Compute the artifact layout under `root`, creating the directory unless
/// this is a dry run.
pub fn prepare_output_dir(root: &Path, dry_run: bool) -> Result<ArtifactPaths> {
    let paths = ArtifactPaths::new(root);

    if dry_run {
        tracing::debug!("Dry run, not creating {:?}", root);
        return Ok(paths);
    }

    fs::create_dir_all(&paths.root)
        .with_context(|| format!("Failed to create directory: {:?}", paths.root))?;
    tracing::info!("Output directory ready: {:?}", paths.root);

    Ok(paths)
}
