use std::fmt;
use std::path::{Path, PathBuf};

/// Fixed artifact layout inside the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub root: PathBuf,
    pub subdomains: PathBuf,    // subfinder.txt
    pub resolved: PathBuf,      // dnsx.txt
    pub ports: PathBuf,         // naabu.txt
    pub http_services: PathBuf, // httpx.txt
    pub crawl_input: PathBuf,   // katana_input_clean.txt
    pub crawl: PathBuf,         // katana.txt
    pub consolidated: PathBuf,
    pub summary: PathBuf,
    pub prompt: PathBuf,
}

impl ArtifactPaths {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            subdomains: root.join("subfinder.txt"),
            resolved: root.join("dnsx.txt"),
            ports: root.join("naabu.txt"),
            http_services: root.join("httpx.txt"),
            crawl_input: root.join("katana_input_clean.txt"),
            crawl: root.join("katana.txt"),
            consolidated: root.join("urls_consolidated.txt"),
            summary: root.join("summary.json"),
            prompt: root.join("llm_prompt.txt"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Domain(String),
    List(PathBuf),
}

impl Target {
    /// The identity recorded in the run summary.
    pub fn identity(&self) -> String {
        match self {
            Target::Domain(domain) => domain.clone(),
            Target::List(path) => path.display().to_string(),
        }
    }

    pub fn root_domain(&self) -> Option<&str> {
        match self {
            Target::Domain(domain) => Some(domain),
            Target::List(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    SubdomainEnum,
    Resolve,
    PortScan,
    ServiceProbe,
    Crawl,
}

impl StageKind {
    /// Execution order of the pipeline.
    pub const ALL: [StageKind; 5] = [
        StageKind::SubdomainEnum,
        StageKind::Resolve,
        StageKind::PortScan,
        StageKind::ServiceProbe,
        StageKind::Crawl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StageKind::SubdomainEnum => "Subfinder",
            StageKind::Resolve => "DNSx",
            StageKind::PortScan => "Naabu",
            StageKind::ServiceProbe => "HTTPx",
            StageKind::Crawl => "Katana",
        }
    }

    /// Default binary name of the tool backing this stage.
    pub fn tool(self) -> &'static str {
        match self {
            StageKind::SubdomainEnum => "subfinder",
            StageKind::Resolve => "dnsx",
            StageKind::PortScan => "naabu",
            StageKind::ServiceProbe => "httpx",
            StageKind::Crawl => "katana",
        }
    }

    fn fixed_flags(self) -> &'static [&'static str] {
        match self {
            StageKind::SubdomainEnum => &["-all"],
            _ => &[],
        }
    }

    fn list_flag(self) -> &'static str {
        match self {
            StageKind::Crawl => "-list",
            _ => "-l",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Overwrite,
    /// Keep earlier lines; none of the built-in stages use it.
    #[allow(dead_code)]
    Append,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageInput {
    Target(Target),
    Artifact(PathBuf),
}

/// One step of the pipeline, fully resolved before it runs.
#[derive(Clone, Debug)]
pub struct Stage {
    pub kind: StageKind,
    pub tool: PathBuf,
    pub input: StageInput,
    pub output: PathBuf,
    pub extra_args: Vec<String>,
    pub write_mode: WriteMode,
}

impl Stage {
    pub fn new(kind: StageKind, tool: &Path, input: StageInput, output: &Path) -> Self {
        Self {
            kind,
            tool: tool.to_path_buf(),
            input,
            output: output.to_path_buf(),
            extra_args: Vec::new(),
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Full argument vector: tool, fixed flags, input, extra arguments, output.
    pub fn command(&self) -> Vec<String> {
        let mut argv = vec![self.tool.display().to_string()];
        argv.extend(self.kind.fixed_flags().iter().map(|f| f.to_string()));

        match &self.input {
            StageInput::Target(Target::Domain(domain)) => {
                argv.extend(["-d".to_string(), domain.clone()]);
            }
            StageInput::Target(Target::List(path)) => {
                argv.extend(["-dL".to_string(), path.display().to_string()]);
            }
            StageInput::Artifact(path) => {
                argv.extend([self.kind.list_flag().to_string(), path.display().to_string()]);
            }
        }

        argv.extend(self.extra_args.iter().cloned());
        argv.extend(["-o".to_string(), self.output.display().to_string()]);
        argv
    }
}

/// Immutable settings for one run, built once from the CLI and config file.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub target: Target,
    pub paths: ArtifactPaths,
    pub proxy: Option<String>,
    pub dry_run: bool,
    pub llm: bool,
    pub ports: String,
    pub crawl_concurrency: u32,
    pub crawl_depth: u32,
    pub prompt_max_urls: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subdomain_command_for_domain() {
        let stage = Stage::new(
            StageKind::SubdomainEnum,
            Path::new("/go/bin/subfinder"),
            StageInput::Target(Target::Domain("example.com".into())),
            Path::new("out/subfinder.txt"),
        );
        assert_eq!(
            stage.command(),
            vec!["/go/bin/subfinder", "-all", "-d", "example.com", "-o", "out/subfinder.txt"]
        );
    }

    #[test]
    fn test_subdomain_command_for_list() {
        let stage = Stage::new(
            StageKind::SubdomainEnum,
            Path::new("subfinder"),
            StageInput::Target(Target::List("scope.txt".into())),
            Path::new("out/subfinder.txt"),
        );
        assert_eq!(
            stage.command(),
            vec!["subfinder", "-all", "-dL", "scope.txt", "-o", "out/subfinder.txt"]
        );
    }

    #[test]
    fn test_crawl_command_uses_list_flag_and_extra_args() {
        let stage = Stage::new(
            StageKind::Crawl,
            Path::new("katana"),
            StageInput::Artifact("out/katana_input_clean.txt".into()),
            Path::new("out/katana.txt"),
        )
        .with_args(["-c", "10"]);
        assert_eq!(
            stage.command(),
            vec!["katana", "-list", "out/katana_input_clean.txt", "-c", "10", "-o", "out/katana.txt"]
        );
    }

    #[test]
    fn test_artifact_layout() {
        let paths = ArtifactPaths::new(Path::new("recon_results"));
        assert_eq!(paths.http_services, PathBuf::from("recon_results/httpx.txt"));
        assert_eq!(paths.summary, PathBuf::from("recon_results/summary.json"));
        assert_eq!(paths.crawl_input, PathBuf::from("recon_results/katana_input_clean.txt"));
    }
}
