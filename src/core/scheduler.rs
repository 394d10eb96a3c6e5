use super::errors::StageFailure;
use super::events::{Event, Observer};
use super::models::{RunConfig, Stage, StageInput, StageKind};
use super::parser::contains_line;
use super::stage::{StageOutcome, StageRunner};
use crate::executors::command::CommandExecutor;
use crate::executors::toolchain::Toolchain;
use crate::reporters::consolidate::{self, WrittenArtifact};
use crate::reporters::writer::{self, RunSummary};
use crate::reporters::{prompt, validate};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Artifacts produced by the reporting steps of a completed run.
/// Each is `None` when its step failed or, for the prompt, was not requested.
#[derive(Debug, Default)]
pub struct RunReport {
    pub consolidated: Option<WrittenArtifact>,
    pub summary: Option<RunSummary>,
    pub prompt: Option<WrittenArtifact>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    Previewed,
    Halted {
        stage: StageKind,
        failure: StageFailure,
    },
}

/// Drives the fixed stage sequence, threading each artifact into the next stage.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    toolchain: &'a Toolchain,
    runner: StageRunner<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig, toolchain: &'a Toolchain, executor: &'a dyn CommandExecutor) -> Self {
        Self {
            config,
            toolchain,
            runner: StageRunner::new(executor, config.dry_run),
        }
    }

    fn stage(&self, kind: StageKind, input: StageInput, output: &Path) -> Stage {
        Stage::new(kind, self.toolchain.path(kind), input, output)
    }

    fn proxy_args(&self, flag: &str) -> Vec<String> {
        match &self.config.proxy {
            Some(proxy) => vec![flag.to_string(), proxy.clone()],
            None => Vec::new(),
        }
    }

    async fn run_stage(&self, stage: &Stage, observer: &mut dyn Observer) -> Result<(), RunOutcome> {
        match self.runner.run(stage, observer).await {
            StageOutcome::Failed(failure) => Err(RunOutcome::Halted {
                stage: stage.kind,
                failure,
            }),
            outcome => {
                tracing::debug!("{} finished with {} results", stage.kind, outcome.result_count());
                Ok(())
            }
        }
    }

    pub async fn run(&self, observer: &mut dyn Observer) -> RunOutcome {
        observer.on_event(&Event::RunStarted {
            target: self.config.target.identity(),
            output: self.config.paths.root.clone(),
            proxy: self.config.proxy.clone(),
        });

        match self.run_stages(observer).await {
            Ok(()) if self.config.dry_run => RunOutcome::Previewed,
            Ok(()) => RunOutcome::Completed(self.report(observer)),
            Err(halted) => halted,
        }
    }

    async fn run_stages(&self, observer: &mut dyn Observer) -> Result<(), RunOutcome> {
        let config = self.config;
        let paths = &config.paths;

        let subdomains = self.stage(
            StageKind::SubdomainEnum,
            StageInput::Target(config.target.clone()),
            &paths.subdomains,
        );
        self.run_stage(&subdomains, observer).await?;

        if let (false, Some(domain)) = (config.dry_run, config.target.root_domain()) {
            match ensure_root_domain(&paths.subdomains, domain) {
                Ok(true) => observer.on_event(&Event::RootDomainAdded(domain.to_string())),
                Ok(false) => {}
                Err(e) => return Err(self.halt(StageKind::SubdomainEnum, e, observer)),
            }
        }

        let resolve = self.stage(
            StageKind::Resolve,
            StageInput::Artifact(paths.subdomains.clone()),
            &paths.resolved,
        );
        self.run_stage(&resolve, observer).await?;

        let port_scan = self
            .stage(StageKind::PortScan, StageInput::Artifact(paths.resolved.clone()), &paths.ports)
            .with_args(["-p", config.ports.as_str()]);
        self.run_stage(&port_scan, observer).await?;

        let probe = self
            .stage(
                StageKind::ServiceProbe,
                StageInput::Artifact(paths.ports.clone()),
                &paths.http_services,
            )
            .with_args(["-title", "-tech-detect", "-status-code"])
            .with_args(self.proxy_args("-http-proxy"));
        self.run_stage(&probe, observer).await?;

        let crawl_input: PathBuf = if config.dry_run {
            paths.http_services.clone()
        } else {
            match consolidate::prepare_crawl_input(&paths.http_services, &paths.crawl_input) {
                Ok(count) => tracing::debug!("{} crawl targets written to {:?}", count, paths.crawl_input),
                Err(e) => return Err(self.halt(StageKind::Crawl, format!("{:#}", e), observer)),
            }
            paths.crawl_input.clone()
        };

        let crawl = self
            .stage(StageKind::Crawl, StageInput::Artifact(crawl_input), &paths.crawl)
            .with_args(["-jc", "-kf", "all"])
            .with_args([
                "-c".to_string(),
                config.crawl_concurrency.to_string(),
                "-d".to_string(),
                config.crawl_depth.to_string(),
            ])
            .with_args(self.proxy_args("-proxy"));
        self.run_stage(&crawl, observer).await?;

        Ok(())
    }

    /// Failure of the controller's own file handling between stages.
    fn halt(&self, stage: StageKind, error: impl std::fmt::Display, observer: &mut dyn Observer) -> RunOutcome {
        let failure = StageFailure::Output(error.to_string());
        observer.on_event(&Event::StageFailed {
            stage,
            failure: failure.clone(),
        });
        RunOutcome::Halted { stage, failure }
    }

    /// Reporting steps; each failure is reported and the next step still runs.
    fn report(&self, observer: &mut dyn Observer) -> RunReport {
        let paths = &self.config.paths;
        let mut report = RunReport::default();

        match consolidate::build_consolidated(paths) {
            Ok(artifact) => {
                observer.on_event(&Event::ArtifactWritten {
                    artifact: "consolidated URLs",
                    path: artifact.path.clone(),
                    count: artifact.count,
                });
                report.consolidated = Some(artifact);
            }
            Err(e) => observer.on_event(&Event::PostProcessFailed {
                step: "consolidation",
                error: format!("{:#}", e),
            }),
        }

        match writer::write_summary(paths, &self.config.target).and_then(|summary| {
            validate::validate_reports(paths)?;
            Ok(summary)
        }) {
            Ok(summary) => {
                observer.on_event(&Event::SummaryWritten(paths.summary.clone()));
                report.summary = Some(summary);
            }
            Err(e) => observer.on_event(&Event::PostProcessFailed {
                step: "summary",
                error: format!("{:#}", e),
            }),
        }

        if self.config.llm {
            match prompt::write_prompt(paths, self.config.prompt_max_urls) {
                Ok(Some(artifact)) => {
                    observer.on_event(&Event::ArtifactWritten {
                        artifact: "analysis prompt",
                        path: artifact.path.clone(),
                        count: artifact.count,
                    });
                    report.prompt = Some(artifact);
                }
                Ok(None) => observer.on_event(&Event::PromptSkipped),
                Err(e) => observer.on_event(&Event::PostProcessFailed {
                    step: "analysis prompt",
                    error: format!("{:#}", e),
                }),
            }
        }

        report
    }
}

/// Append `domain` to the subdomain artifact unless it is already one of its lines.
fn ensure_root_domain(path: &Path, domain: &str) -> std::io::Result<bool> {
    let content = fs::read_to_string(path)?;
    if contains_line(&content, domain) {
        return Ok(false);
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    if !content.is_empty() && !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    writeln!(file, "{}", domain)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsConfig;
    use crate::core::models::{ArtifactPaths, Target};
    use crate::core::state::RunState;
    use crate::executors::testing::ScriptedExecutor;
    use crate::executors::toolchain::{resolve_toolchain, testing::StaticLocator};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[derive(Default)]
    struct EventLog(Vec<Event>);

    impl Observer for EventLog {
        fn on_event(&mut self, event: &Event) {
            self.0.push(event.clone());
        }
    }

    fn run_config(root: &Path, target: Target) -> RunConfig {
        RunConfig {
            target,
            paths: ArtifactPaths::new(root),
            proxy: None,
            dry_run: false,
            llm: false,
            ports: "80,443".to_string(),
            crawl_concurrency: 10,
            crawl_depth: 2,
            prompt_max_urls: 200,
        }
    }

    fn toolchain() -> Toolchain {
        resolve_toolchain(&StaticLocator::all_present(), &ToolsConfig::default()).unwrap()
    }

    fn happy_executor() -> ScriptedExecutor {
        ScriptedExecutor::new()
            .stdout("subfinder", "www.example.com\napi.example.com\n")
            .stdout("dnsx", "www.example.com\napi.example.com\nexample.com\n")
            .stdout("naabu", "www.example.com:443\napi.example.com:8080\n")
            .stdout(
                "httpx",
                "https://www.example.com [200] [Home] [nginx]\nhttp://api.example.com:8080 [403]\n",
            )
            .stdout("katana", "https://www.example.com/login\nhttps://www.example.com\n")
    }

    fn argv_of<'c>(calls: &'c [Vec<String>], tool: &str) -> &'c Vec<String> {
        calls.iter().find(|argv| argv[0] == tool).unwrap()
    }

    fn flag_value<'c>(argv: &'c [String], flag: &str) -> Option<&'c str> {
        argv.iter()
            .position(|a| a == flag)
            .map(|i| argv[i + 1].as_str())
    }

    #[tokio::test]
    async fn test_full_run_threads_artifacts_in_order() {
        let dir = tempdir().unwrap();
        let config = run_config(dir.path(), Target::Domain("example.com".into()));
        let toolchain = toolchain();
        let executor = happy_executor();
        let mut state = RunState::default();

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut state).await;

        assert_eq!(executor.tools_run(), vec!["subfinder", "dnsx", "naabu", "httpx", "katana"]);
        let calls = executor.calls();
        let paths = &config.paths;
        let as_str = |p: &PathBuf| p.display().to_string();

        assert_eq!(flag_value(argv_of(&calls, "dnsx"), "-l"), Some(as_str(&paths.subdomains).as_str()));
        assert_eq!(flag_value(argv_of(&calls, "naabu"), "-l"), Some(as_str(&paths.resolved).as_str()));
        assert_eq!(flag_value(argv_of(&calls, "naabu"), "-p"), Some("80,443"));
        assert_eq!(flag_value(argv_of(&calls, "httpx"), "-l"), Some(as_str(&paths.ports).as_str()));
        let katana = argv_of(&calls, "katana");
        assert_eq!(flag_value(katana, "-list"), Some(as_str(&paths.crawl_input).as_str()));
        assert_eq!(flag_value(katana, "-c"), Some("10"));
        assert_eq!(flag_value(katana, "-d"), Some("2"));
        assert!(katana.contains(&"-jc".to_string()));
        assert_eq!(flag_value(katana, "-kf"), Some("all"));

        assert_eq!(
            fs::read_to_string(&paths.crawl_input).unwrap(),
            "https://www.example.com\nhttp://api.example.com:8080\n"
        );
        assert_eq!(
            fs::read_to_string(&paths.consolidated).unwrap(),
            "http://api.example.com:8080\nhttps://www.example.com\nhttps://www.example.com/login\n"
        );

        let RunOutcome::Completed(report) = outcome else {
            panic!("expected completed run, got {outcome:?}");
        };
        assert_eq!(report.consolidated.unwrap().count, 3);
        let summary = report.summary.unwrap();
        assert_eq!(summary.target, "example.com");
        assert_eq!(summary.stats.subdomains, 3);
        assert_eq!(summary.stats.resolved, 3);
        assert_eq!(summary.stats.consolidated_urls, 3);
        assert!(report.prompt.is_none());
        assert!(!paths.prompt.exists());
        assert_eq!(state.completed.len(), 5);
    }

    #[tokio::test]
    async fn test_root_domain_appended_once() {
        let dir = tempdir().unwrap();
        let config = run_config(dir.path(), Target::Domain("example.com".into()));
        let toolchain = toolchain();
        let executor = happy_executor();
        let mut log = EventLog::default();

        Pipeline::new(&config, &toolchain, &executor).run(&mut log).await;

        assert_eq!(
            fs::read_to_string(&config.paths.subdomains).unwrap(),
            "www.example.com\napi.example.com\nexample.com\n"
        );
        assert!(log.0.contains(&Event::RootDomainAdded("example.com".into())));
    }

    #[tokio::test]
    async fn test_root_domain_added_when_enumeration_is_empty() {
        let dir = tempdir().unwrap();
        let config = run_config(dir.path(), Target::Domain("example.com".into()));
        let toolchain = toolchain();
        let executor = ScriptedExecutor::new();

        Pipeline::new(&config, &toolchain, &executor).run(&mut RunState::default()).await;

        assert_eq!(fs::read_to_string(&config.paths.subdomains).unwrap(), "example.com\n");
    }

    #[test]
    fn test_ensure_root_domain_skips_existing_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subfinder.txt");
        fs::write(&path, "example.com\nwww.example.com").unwrap();

        assert!(!ensure_root_domain(&path, "example.com").unwrap());
        assert!(ensure_root_domain(&path, "www.example.org").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "example.com\nwww.example.com\nwww.example.org\n"
        );
    }

    #[tokio::test]
    async fn test_domain_list_target_is_passed_through() {
        let dir = tempdir().unwrap();
        let config = run_config(dir.path(), Target::List("scope.txt".into()));
        let toolchain = toolchain();
        let executor = happy_executor();

        Pipeline::new(&config, &toolchain, &executor).run(&mut RunState::default()).await;

        let calls = executor.calls();
        assert_eq!(flag_value(argv_of(&calls, "subfinder"), "-dL"), Some("scope.txt"));
        assert_eq!(
            fs::read_to_string(&config.paths.subdomains).unwrap(),
            "www.example.com\napi.example.com\n"
        );
    }

    #[tokio::test]
    async fn test_proxy_only_reaches_probe_and_crawl() {
        let dir = tempdir().unwrap();
        let mut config = run_config(dir.path(), Target::Domain("example.com".into()));
        config.proxy = Some("http://127.0.0.1:8080".into());
        let toolchain = toolchain();
        let executor = happy_executor();

        Pipeline::new(&config, &toolchain, &executor).run(&mut RunState::default()).await;

        let calls = executor.calls();
        assert_eq!(flag_value(argv_of(&calls, "httpx"), "-http-proxy"), Some("http://127.0.0.1:8080"));
        assert_eq!(flag_value(argv_of(&calls, "katana"), "-proxy"), Some("http://127.0.0.1:8080"));
        for tool in ["subfinder", "dnsx", "naabu"] {
            assert!(
                !argv_of(&calls, tool).iter().any(|a| a.contains("127.0.0.1")),
                "{tool} received the proxy"
            );
        }
    }

    #[tokio::test]
    async fn test_stage_failure_short_circuits() {
        let dir = tempdir().unwrap();
        let config = run_config(dir.path(), Target::Domain("example.com".into()));
        let toolchain = toolchain();
        let executor = happy_executor().fail("naabu", 1, "permission denied");
        let mut state = RunState::default();

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut state).await;

        assert!(matches!(outcome, RunOutcome::Halted { stage: StageKind::PortScan, .. }));
        assert_eq!(executor.tools_run(), vec!["subfinder", "dnsx", "naabu"]);
        let paths = &config.paths;
        for later in [&paths.ports, &paths.http_services, &paths.crawl_input, &paths.crawl, &paths.consolidated, &paths.summary] {
            assert!(!later.exists(), "{later:?} should not exist");
        }
        assert_eq!(state.failed.as_ref().map(|(stage, _)| *stage), Some(StageKind::PortScan));
    }

    #[tokio::test]
    async fn test_enumeration_failure_leaves_no_downstream_artifacts() {
        let dir = tempdir().unwrap();
        let config = run_config(dir.path(), Target::Domain("example.com".into()));
        fs::write(&config.paths.subdomains, "stale.example.com\n").unwrap();
        let toolchain = toolchain();
        let executor = happy_executor().fail("subfinder", 1, "rate limited");
        let mut log = EventLog::default();

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut log).await;

        assert!(matches!(outcome, RunOutcome::Halted { stage: StageKind::SubdomainEnum, .. }));
        assert_eq!(executor.tools_run(), vec!["subfinder"]);
        assert_eq!(fs::read_to_string(&config.paths.subdomains).unwrap(), "stale.example.com\n");
        assert!(!log.0.iter().any(|e| matches!(e, Event::RootDomainAdded(_))));
        assert!(!config.paths.resolved.exists());
        assert!(!config.paths.summary.exists());
    }

    #[tokio::test]
    async fn test_probe_failure_skips_crawl_input_preparation() {
        let dir = tempdir().unwrap();
        let config = run_config(dir.path(), Target::Domain("example.com".into()));
        let toolchain = toolchain();
        let executor = happy_executor().fail("httpx", 2, "Error: No such option: -title");

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut RunState::default()).await;

        assert!(matches!(
            outcome,
            RunOutcome::Halted { stage: StageKind::ServiceProbe, failure: StageFailure::VersionConflict { .. } }
        ));
        assert_eq!(executor.tools_run(), vec!["subfinder", "dnsx", "naabu", "httpx"]);
        let paths = &config.paths;
        for later in [&paths.http_services, &paths.crawl_input, &paths.crawl, &paths.consolidated, &paths.summary] {
            assert!(!later.exists(), "{later:?} should not exist");
        }
    }

    #[tokio::test]
    async fn test_unspawnable_tool_halts() {
        let dir = tempdir().unwrap();
        let config = run_config(dir.path(), Target::Domain("example.com".into()));
        let toolchain = toolchain();
        let executor = happy_executor().unspawnable("katana");

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut RunState::default()).await;

        assert!(matches!(
            outcome,
            RunOutcome::Halted { stage: StageKind::Crawl, failure: StageFailure::Spawn(_) }
        ));
        assert!(!config.paths.summary.exists());
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("recon_results");
        let mut config = run_config(&root, Target::Domain("example.com".into()));
        config.dry_run = true;
        config.llm = true;
        config.proxy = Some("http://127.0.0.1:8080".into());
        let toolchain = toolchain();
        let executor = happy_executor();
        let mut log = EventLog::default();

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut log).await;

        assert!(matches!(outcome, RunOutcome::Previewed));
        assert!(executor.calls().is_empty());
        assert!(!root.exists());

        let previews: Vec<&String> = log
            .0
            .iter()
            .filter_map(|e| match e {
                Event::StagePreview { command, .. } => Some(command),
                _ => None,
            })
            .collect();
        assert_eq!(previews.len(), 5);
        assert!(previews[4].contains(&format!("-list {}", config.paths.http_services.display())));
        assert!(previews[4].contains("-proxy http://127.0.0.1:8080"));
    }

    #[tokio::test]
    async fn test_dry_run_with_domain_list() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("recon_results");
        let mut config = run_config(&root, Target::List("scope.txt".into()));
        config.dry_run = true;
        let toolchain = toolchain();
        let executor = happy_executor();
        let mut log = EventLog::default();

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut log).await;

        assert!(matches!(outcome, RunOutcome::Previewed));
        assert!(executor.calls().is_empty());
        assert!(!root.exists());
        match &log.0[1] {
            Event::StagePreview { stage, command } => {
                assert_eq!(*stage, StageKind::SubdomainEnum);
                assert!(command.contains("-dL scope.txt"), "{command}");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prompt_written_when_requested() {
        let dir = tempdir().unwrap();
        let mut config = run_config(dir.path(), Target::Domain("example.com".into()));
        config.llm = true;
        let toolchain = toolchain();
        let executor = happy_executor();

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut RunState::default()).await;

        let RunOutcome::Completed(report) = outcome else {
            panic!("expected completed run");
        };
        assert_eq!(report.prompt.unwrap().count, 2);
        let prompt = fs::read_to_string(&config.paths.prompt).unwrap();
        assert!(prompt.starts_with("Analyze these URLs and find high-risk endpoints:\n"));
        assert!(prompt.contains("\"https://www.example.com/login\""));
    }

    #[tokio::test]
    async fn test_prompt_skipped_without_crawl_results() {
        let dir = tempdir().unwrap();
        let mut config = run_config(dir.path(), Target::Domain("example.com".into()));
        config.llm = true;
        let toolchain = toolchain();
        let executor = happy_executor().stdout("katana", "");
        let mut log = EventLog::default();

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut log).await;

        assert!(matches!(outcome, RunOutcome::Completed(RunReport { prompt: None, .. })));
        assert!(log.0.contains(&Event::PromptSkipped));
        assert!(!config.paths.prompt.exists());
    }

    #[tokio::test]
    async fn test_reporting_failures_are_isolated() {
        let dir = tempdir().unwrap();
        let mut config = run_config(dir.path(), Target::Domain("example.com".into()));
        config.llm = true;
        // A directory where the consolidated file belongs makes that step fail
        fs::create_dir(&config.paths.consolidated).unwrap();
        let toolchain = toolchain();
        let executor = happy_executor();
        let mut state = RunState::default();

        let outcome = Pipeline::new(&config, &toolchain, &executor).run(&mut state).await;

        let RunOutcome::Completed(report) = outcome else {
            panic!("expected completed run");
        };
        assert!(report.consolidated.is_none());
        assert!(state.post_errors.iter().any(|e| e.starts_with("consolidation")));
        assert!(report.prompt.is_some());
        assert!(config.paths.crawl.exists());
    }
}
