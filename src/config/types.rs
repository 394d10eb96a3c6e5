use serde::{Deserialize, Serialize};
use crate::core::models::StageKind;

pub const DEFAULT_PORTS: &str = "80,443,8080,8443,8000,8008,8888";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tools: ToolsConfig,
    pub ports: PortsSetting,
    pub crawl: CrawlConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PortsSetting(pub String);

impl Default for PortsSetting {
    fn default() -> Self {
        Self(DEFAULT_PORTS.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub subfinder: ToolConfig,
    pub dnsx: ToolConfig,
    pub naabu: ToolConfig,
    pub httpx: ToolConfig,
    pub katana: ToolConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            subfinder: ToolConfig::named("subfinder"),
            dnsx: ToolConfig::named("dnsx"),
            naabu: ToolConfig::named("naabu"),
            httpx: ToolConfig::named("httpx"),
            katana: ToolConfig::named("katana"),
        }
    }
}

impl ToolsConfig {
    pub fn command(&self, stage: StageKind) -> &str {
        let tool = match stage {
            StageKind::SubdomainEnum => &self.subfinder,
            StageKind::Resolve => &self.dnsx,
            StageKind::PortScan => &self.naabu,
            StageKind::ServiceProbe => &self.httpx,
            StageKind::Crawl => &self.katana,
        };
        &tool.command
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolConfig {
    pub command: String,
}

impl ToolConfig {
    fn named(command: &str) -> Self {
        Self { command: command.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub concurrency: u32,
    pub depth: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            depth: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    pub max_urls: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { max_urls: 200 }
    }
}
