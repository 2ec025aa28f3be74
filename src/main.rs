//! AOCC - Airport Operations Command Center
//!
//! Runs the operator console core headless: a scripted demo walkthrough
//! that prints session snapshots, and a dump of the effective configuration.
//!
//! ## Usage
//!
//! ```bash
//! # Scripted demo in real time
//! aocc demo
//!
//! # Same walkthrough, timers fast-forwarded, JSON snapshot per line
//! aocc demo --fast --json
//!
//! # Effective configuration as YAML
//! aocc config --config ./aocc.yaml
//!
//! # With verbose logging and a custom log directory
//! aocc -v --log-dir /path/to/logs/ demo
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use aocc_console::{Session, SessionSnapshot, driver};
use aocc_core::{AoccConfig, LogGuard, ScreenId, TokioClock, init_logging};
use clap::{Parser, Subcommand};
use tracing::{error, info};

/// Slack added to every wait so the deadline has fired before the snapshot.
const SETTLE: Duration = Duration::from_millis(50);

/// AOCC operator console
///
/// Alert registry, staff recommendations, toasts and confirmations for the
/// airport operations command center.
#[derive(Parser, Debug)]
#[command(name = "aocc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.aocc/logs/)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Configuration file (defaults to ~/.aocc/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the scripted pitch-demo walkthrough
    Demo {
        /// Print each snapshot as one JSON line
        #[arg(long)]
        json: bool,

        /// Fast-forward timers instead of waiting in real time
        #[arg(long)]
        fast: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("aocc failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            if let Some(guidance) = e.downcast_ref::<aocc_core::AoccError>().and_then(|e| e.guidance()) {
                eprintln!("Hint: {}", guidance);
            }
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> aocc_core::Result<LogGuard> {
    init_logging(cli.log_dir.clone(), cli.verbose > 0)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AoccConfig> {
    let config = match path {
        Some(path) => AoccConfig::load(path)?,
        None => AoccConfig::load_or_default()?,
    };
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Config => {
            let yaml = serde_yaml::to_string(&config).context("serializing configuration")?;
            print!("{yaml}");
            Ok(())
        }
        Command::Demo { json, fast } => {
            // tokio::time::pause needs a current-thread runtime
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("building tokio runtime")?;
            runtime.block_on(run_demo(config, json, fast))
        }
    }
}

async fn run_demo(config: AoccConfig, json: bool, fast: bool) -> anyhow::Result<()> {
    if fast {
        tokio::time::pause();
    }
    info!(fast, "starting demo walkthrough");

    let presentation_wait = config.recommendations.presentation_delay() + SETTLE;
    let navigation_wait = config.recommendations.accept_navigation_delay() + SETTLE;
    let toast_wait = config.toasts.default_duration() + SETTLE;

    let session = Session::new(config, Arc::new(TokioClock))
        .with_navigator(|screen: ScreenId| info!(%screen, "navigation requested"));
    let handle = driver::spawn(session);
    let print = |label: &str, snapshot: &SessionSnapshot| print_snapshot(label, snapshot, json);

    print("start", &handle.snapshot());

    handle.call(|s| s.demo_next()).await??;
    print("alert raised", &handle.call(|s| s.snapshot()).await?);

    handle.call(|s| s.demo_next()).await??;
    tokio::time::sleep(presentation_wait).await;
    print("recommendation presented", &handle.snapshot());

    handle.call(|s| s.request_protocol()).await??;
    print("protocol requested", &handle.call(|s| s.snapshot()).await?);
    handle.call(|s| s.confirm()).await??;
    print("protocol confirmed", &handle.call(|s| s.snapshot()).await?);

    handle.call(|s| s.demo_next()).await??;
    print("recommendation accepted", &handle.call(|s| s.snapshot()).await?);
    tokio::time::sleep(navigation_wait).await;
    print("navigated", &handle.snapshot());

    tokio::time::sleep(toast_wait).await;
    print("toasts expired", &handle.snapshot());

    let last = handle.shutdown().await?;
    print("shutdown", &last);
    info!("demo walkthrough finished");
    Ok(())
}

fn print_snapshot(label: &str, snapshot: &SessionSnapshot, json: bool) {
    if json {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => error!(error = %e, "snapshot not serializable"),
        }
        return;
    }

    println!("== {label} ==");
    println!(
        "  status: {}  protocol: {}  screen: {}",
        snapshot.status,
        if snapshot.protocol.is_active() { "active" } else { "idle" },
        snapshot.screen
    );
    if snapshot.badge.should_display() {
        println!("  alerts: {}", snapshot.badge.format_header());
    }
    for alert in snapshot.alerts.iter().filter(|a| a.is_active()) {
        println!("    {}", alert.format_compact());
    }
    if let Some(view) = &snapshot.recommendation {
        println!(
            "  recommendation: {} ({}% confidence, {}s left)",
            view.recommendation.title, view.recommendation.confidence, view.seconds_remaining
        );
    }
    if let Some(prompt) = &snapshot.confirmation {
        println!("  confirm: {} [{}]", prompt.title, prompt.confirm_label);
    }
    for toast in &snapshot.toasts {
        println!("  toast: {}", toast.format_line());
    }
    let deployed: Vec<_> = snapshot
        .staff
        .iter()
        .filter(|m| !m.available)
        .map(|m| format!("{} -> {}", m.name, m.assignment.as_deref().unwrap_or("-")))
        .collect();
    if !deployed.is_empty() {
        println!("  assigned: {}", deployed.join(", "));
    }
}
