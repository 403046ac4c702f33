//! Glide CLI
//!
//! Simulate the landing page's scroll-driven motion frame by frame.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod page;
mod sections;
mod simulate;

use simulate::SimulateOptions;

#[derive(Parser)]
#[command(name = "glide")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scroll-synchronized motion for landing pages", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the landing page, replay scroll and pointer input, and report
    Simulate {
        /// Motion config file (defaults to ./glide.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Lay the page out right-to-left
        #[arg(long)]
        rtl: bool,

        /// Number of frames to run
        #[arg(short, long, default_value = "240")]
        frames: u32,

        /// Pixels scrolled before each frame
        #[arg(long, default_value = "8")]
        scroll_per_frame: f32,

        /// Hold the pointer at X,Y for the first half of the run
        #[arg(long)]
        pointer: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default glide.toml
    Init {
        /// Output path
        #[arg(default_value = config::CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            config,
            rtl,
            frames,
            scroll_per_frame,
            pointer,
            json,
        } => cmd_simulate(
            config.as_deref(),
            SimulateOptions {
                frames,
                scroll_per_frame,
                pointer: pointer.as_deref().map(simulate::parse_pointer).transpose()?,
                is_rtl: rtl,
            },
            json,
        ),

        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

fn cmd_simulate(config_path: Option<&Path>, options: SimulateOptions, json: bool) -> Result<()> {
    let config = config::load(config_path)?;
    info!(
        "Simulating {} frames at {:.2}ms per frame",
        options.frames, config.frame.frame_ms
    );

    let report = simulate::run(&options, &config)?;
    if json {
        let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    config::write_default(path, force)?;
    info!("Wrote default motion config to {}", path.display());
    println!("Created {}", path.display());
    Ok(())
}
