mod display;

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::{bail, Context};
use beacon_core::bulk::{read_domains_file, ProgressCallback};
use beacon_core::colors::PaletteExt;
use beacon_core::output::{get_formatter, HumanFormatter, OutputFormat, OutputFormatter};
use beacon_core::{BatchRunner, CheckConfig};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use display::{attach_progress_bar, batch_progress_bar, detach_progress_bar, LogWriterFactory};

/// Exit status after Ctrl-C, following the shell convention for SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Domain health checker - repeated HTTP, HTTPS and TLS certificate probes")]
#[command(version)]
struct Cli {
    /// File containing domains, one per line
    #[arg(default_value = "domains.txt")]
    file: PathBuf,

    /// Trials per domain (overrides TEST_COUNT)
    #[arg(short, long)]
    trials: Option<usize>,

    /// Domains checked in parallel (overrides BEACON_CONCURRENCY)
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Output format (human or json)
    #[arg(short, long, default_value = "human")]
    format: String,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment and flags still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(LogWriterFactory)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".failing(), e);
        std::process::exit(1);
    }

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<CheckConfig> {
    let mut config = CheckConfig::from_env()?;
    if let Some(trials) = cli.trials {
        config = config.with_trial_count(trials);
    }
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let use_colors = !cli.no_color;
    if !use_colors {
        colored::control::set_override(false);
    }

    let config = build_config(&cli)?;
    let output_format: OutputFormat = cli.format.parse().unwrap_or_default();

    if !cli.file.exists() {
        bail!(
            "Domain list file '{}' not found. Create it with one domain per line.",
            cli.file.display()
        );
    }

    let domains = read_domains_file(&cli.file)
        .with_context(|| format!("failed to read '{}'", cli.file.display()))?;
    if domains.is_empty() {
        bail!("No domains found in '{}'", cli.file.display());
    }

    eprintln!("{}", "===== Domain Health Checker =====".heading());
    eprintln!(
        "Current time (UTC): {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
    );
    eprintln!(
        "Loaded {} domains from '{}'. Test count: {}",
        domains.len(),
        cli.file.display(),
        config.trial_count
    );

    let runner = BatchRunner::from_config(&config)?;

    let cancel = runner.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing in-flight probes without starting new ones");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let bar = batch_progress_bar(domains.len());
    attach_progress_bar(bar.clone());
    let bar_for_progress = bar.clone();
    let progress: ProgressCallback = Box::new(move |_, _, domain| {
        bar_for_progress.inc(1);
        bar_for_progress.set_message(domain.to_string());
    });

    let report = runner.run(domains, Some(progress)).await;

    bar.finish_and_clear();
    detach_progress_bar();

    let formatter = get_formatter(output_format, use_colors && cli.output.is_none());
    let rendered = formatter.format_report(&report);

    match &cli.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))
                .with_context(|| format!("failed to write report to '{}'", path.display()))?;
            eprintln!("Report saved as '{}'", path.display());
        }
        None => println!("{}", rendered),
    }

    if !report.expiry_warnings.is_empty() {
        let table = if use_colors {
            HumanFormatter::new()
        } else {
            HumanFormatter::new().without_colors()
        };
        eprintln!();
        eprintln!("{}", table.format_expiry_warnings(&report.expiry_warnings));
    }

    if runner.cancel_flag().load(Ordering::SeqCst) {
        eprintln!(
            "{} {} domain(s) were not checked",
            "Interrupted:".caution(),
            report.skipped.len()
        );
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }

    eprintln!("{}", "Domain health check completed.".healthy());
    Ok(())
}
