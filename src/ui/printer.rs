use super::table::TableBuilder;
use crate::core::models::RunConfig;
use crate::core::scheduler::RunReport;
use crate::core::state::RunState;
use colored::*;

const RULE: &str = "═══════════════════════════════════════";

fn banner(title: &str, color: Color) {
    println!("\n{}", RULE.color(color).bold());
    println!("{}", title.color(color).bold());
    println!("{}", RULE.color(color).bold());
}

pub fn print_summary(config: &RunConfig, state: &RunState, report: &RunReport) {
    banner("Recon Chain Complete", Color::Green);

    println!("\n{}: {}", "Target".cyan().bold(), state.target);
    println!("{}: {}", "Output".cyan().bold(), config.paths.root.display());

    println!("\n{}", "Stages:".yellow().bold());
    for record in &state.completed {
        let results = record.results.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
        println!("  • {}: {}", record.stage.to_string().cyan(), results.green().bold());
    }

    if let Some(consolidated) = &report.consolidated {
        println!(
            "\n{}: {} ({} unique URLs)",
            "Consolidated".yellow().bold(),
            consolidated.path.display(),
            consolidated.count.to_string().green().bold()
        );
    }

    if let Some(summary) = &report.summary {
        println!("\n{}", TableBuilder::stats_summary(&summary.stats));
    }

    if let Some(prompt) = &report.prompt {
        println!(
            "{}: {} ({} URLs)",
            "Analysis prompt".yellow().bold(),
            prompt.path.display(),
            prompt.count
        );
    }

    if !state.post_errors.is_empty() {
        println!("\n{}", "Reporting errors:".red().bold());
        for error in &state.post_errors {
            println!("  • {}", error);
        }
    }

    if let Some(proxy) = &config.proxy {
        println!(
            "\n{}",
            format!("Traffic from httpx and katana went through {}", proxy).dimmed()
        );
    }
}

pub fn print_preview(config: &RunConfig, state: &RunState) {
    banner("Dry Run", Color::Magenta);
    println!(
        "\n{} commands previewed for {}; nothing was executed or written under {}",
        state.completed.len(),
        state.target,
        config.paths.root.display()
    );
}
