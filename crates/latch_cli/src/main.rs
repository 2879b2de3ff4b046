//! Latch CLI
//!
//! Replay widget scenarios and inspect the view model after every input.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use latch_cn::WidgetKind;

mod replay;
mod scenario;

use scenario::Scenario;

#[derive(Parser)]
#[command(name = "latch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Latch headless widget playground", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and print the widget view after each step
    Replay {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Print all frames as one JSON array
        #[arg(long)]
        json: bool,
    },

    /// List the widget kinds a scenario can use
    Widgets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Replay { scenario, json } => cmd_replay(&scenario, json),
        Commands::Widgets => cmd_widgets(),
    }
}

fn cmd_replay(path: &Path, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    info!("Loaded {} ({} steps)", path.display(), scenario.steps.len());

    let frames = replay::run(&scenario)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
        return Ok(());
    }

    for frame in &frames {
        println!(
            "#{:<3} {:<28} changed={:<5} open={:<5} listeners={}",
            frame.step, frame.action, frame.changed, frame.open, frame.listeners
        );
    }

    if let Some(last) = frames.last() {
        println!();
        println!("Final view:");
        println!("{}", serde_json::to_string_pretty(&last.view)?);
    }

    Ok(())
}

fn cmd_widgets() -> Result<()> {
    println!("Widget kinds:");
    for kind in WidgetKind::ALL {
        println!("  {:<16} {}", kind.name(), kind.summary());
    }
    Ok(())
}
