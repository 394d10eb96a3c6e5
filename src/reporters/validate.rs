use anyhow::{Result, bail};
use std::fs;
use crate::core::models::ArtifactPaths;

pub fn validate_reports(paths: &ArtifactPaths) -> Result<()> {
    let file = &paths.summary;
    if !file.exists() {
        bail!("Required report file missing: {:?}", file);
    }

    let metadata = fs::metadata(file)?;
    if metadata.len() == 0 {
        bail!("Report file is empty: {:?}", file);
    }

    tracing::info!("Summary report validated");
    Ok(())
}
