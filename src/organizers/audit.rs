use anyhow::{Result, bail};
use crate::core::models::ArtifactPaths;
use std::fs;
use std::path::Path;

pub fn preflight_checks(paths: &ArtifactPaths) -> Result<()> {
    let mut errors = Vec::new();

    if !paths.root.is_dir() {
        errors.push(format!("output: not a directory: {:?}", paths.root));
    } else if let Err(e) = verify_writable(&paths.root) {
        errors.push(format!("output: {}", e));
    }

    // Stage artifacts are rewritten in place, so a read-only leftover blocks the run
    for artifact in [
        &paths.subdomains,
        &paths.resolved,
        &paths.ports,
        &paths.http_services,
        &paths.crawl_input,
        &paths.crawl,
    ] {
        if let Ok(metadata) = fs::metadata(artifact) {
            if metadata.permissions().readonly() {
                errors.push(format!("{:?} is read-only", artifact));
            }
        }
    }

    if !errors.is_empty() {
        bail!("Preflight checks failed:\n{}", errors.join("\n"));
    }

    Ok(())
}

fn verify_writable(path: &Path) -> Result<()> {
    let test_file = path.join(".audit_test");
    fs::write(&test_file, b"test")?;
    fs::remove_file(&test_file)?;
    Ok(())
}
