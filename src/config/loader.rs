use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use super::types::PipelineConfig;
use crate::core::errors::ReconError;
use crate::core::models::StageKind;

const LOCAL_CONFIG: &str = "./recon-chain.yaml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `custom_path`, or from the usual locations,
    /// falling back to defaults when no file exists
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<PipelineConfig> {
        // An explicit path must exist
        if let Some(path) = custom_path {
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from custom path: {:?}", path));
        }

        for path in Self::default_paths() {
            if path.exists() {
                let config = Self::load_from_file(&path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?;
                tracing::info!("Loaded configuration from: {:?}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using default settings");
        Ok(PipelineConfig::default())
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dirs) = directories::ProjectDirs::from("", "", "recon-chain") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }
        paths
    }

    fn load_from_file(path: &Path) -> Result<PipelineConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: PipelineConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {:?}", path))?;

        Self::validate_config(&config)?;

        Ok(config)
    }

    fn validate_config(config: &PipelineConfig) -> Result<(), ReconError> {
        for stage in StageKind::ALL {
            if config.tools.command(stage).trim().is_empty() {
                return Err(ReconError::Config(format!("{} command cannot be empty", stage.tool())));
            }
        }

        if config.ports.0.trim().is_empty() {
            return Err(ReconError::Config("ports cannot be empty".into()));
        }

        if config.crawl.concurrency == 0 {
            return Err(ReconError::Config("crawl.concurrency must be greater than 0".into()));
        }

        if config.crawl.depth == 0 {
            return Err(ReconError::Config("crawl.depth must be greater than 0".into()));
        }

        if config.prompt.max_urls == 0 {
            return Err(ReconError::Config("prompt.max_urls must be greater than 0".into()));
        }

        Ok(())
    }
}
