use crate::core::models::Target;
use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "recon-chain",
    version,
    about = "Chains subfinder, dnsx, naabu, httpx and katana into one reconnaissance run"
)]
#[command(group(ArgGroup::new("target").required(true).args(["domain", "list"])))]
pub struct Cli {
    /// Root domain to enumerate
    #[arg(short = 'd', long = "domain", value_parser = parse_domain)]
    pub domain: Option<String>,

    /// File with one domain per line
    #[arg(short = 'l', long = "list")]
    pub list: Option<PathBuf>,

    /// Directory receiving every artifact
    #[arg(short = 'o', long = "output", default_value = "recon_results")]
    pub output: PathBuf,

    /// Proxy URL forwarded to httpx and katana
    #[arg(short = 'p', long = "proxy")]
    pub proxy: Option<String>,

    /// Print the commands without running them
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Write an analysis prompt from the crawl results
    #[arg(long = "llm", action = ArgAction::SetTrue)]
    pub llm: bool,

    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Verbose human output
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Debug logs (implies verbose)
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
}

fn parse_domain(value: &str) -> Result<String, String> {
    let domain = value.trim();
    if domain.is_empty() {
        return Err("domain cannot be empty".to_string());
    }
    Ok(domain.to_string())
}

impl Cli {
    /// The argument group makes this `Some` for any parsed command line.
    pub fn target(&self) -> Option<Target> {
        match (&self.domain, &self.list) {
            (Some(domain), _) => Some(Target::Domain(domain.clone())),
            (None, Some(list)) => Some(Target::List(list.clone())),
            (None, None) => None,
        }
    }
}
