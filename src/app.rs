use crate::{
    cli::args::Cli,
    config::ConfigLoader,
    core::{
        errors::ReconError,
        models::RunConfig,
        scheduler::{Pipeline, RunOutcome},
        state::RunState,
    },
    executors::{
        command::ProcessExecutor,
        toolchain::{self, SystemLocator},
    },
    organizers::{audit, layout},
    ui::{console::ConsoleObserver, printer, progress::ProgressManager},
    utils::logging,
};
use anyhow::Result;

pub async fn run(cli: Cli) -> Result<()> {
    let start_time = std::time::Instant::now();

    let level = logging::level_from_cli(&cli);
    logging::init(level)?;

    let target = cli
        .target()
        .ok_or_else(|| ReconError::Config("one of --domain or --list is required".into()))?;
    tracing::info!("Starting recon chain for target: {}", target.identity());

    let config = ConfigLoader::load_with_custom_path(cli.config.as_deref())?;

    let mut progress = ProgressManager::new();
    progress.start_spinner("Locating tools...");
    // A dry run spawns nothing, not even the locator's probes
    let locator = if cli.dry_run {
        SystemLocator::offline()
    } else {
        SystemLocator::default()
    };
    let tools = toolchain::resolve_toolchain(&locator, &config.tools);
    progress.clear_spinner();
    let tools = tools?;

    let paths = layout::prepare_output_dir(&cli.output, cli.dry_run)?;
    if !cli.dry_run {
        audit::preflight_checks(&paths)?;
    }

    let run_config = RunConfig {
        target,
        paths,
        proxy: cli.proxy.clone(),
        dry_run: cli.dry_run,
        llm: cli.llm,
        ports: config.ports.0.clone(),
        crawl_concurrency: config.crawl.concurrency,
        crawl_depth: config.crawl.depth,
        prompt_max_urls: config.prompt.max_urls,
    };

    let executor = ProcessExecutor;
    let pipeline = Pipeline::new(&run_config, &tools, &executor);
    let mut observers = (
        RunState::new(&run_config.target.identity()),
        ConsoleObserver::new(progress, cli.verbose || cli.debug),
    );

    let outcome = pipeline.run(&mut observers).await;
    let (state, mut console) = observers;
    console.finish();

    tracing::info!("Run finished in {:.2}s", start_time.elapsed().as_secs_f64());

    match outcome {
        RunOutcome::Completed(report) => {
            printer::print_summary(&run_config, &state, &report);
            Ok(())
        }
        RunOutcome::Previewed => {
            printer::print_preview(&run_config, &state);
            Ok(())
        }
        RunOutcome::Halted { stage, failure } => Err(ReconError::StageFailed { stage, failure }.into()),
    }
}
