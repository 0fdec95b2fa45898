mod config;
mod demos;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use config::DemoConfig;
use demos::Demo;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ripple-cli")]
#[command(about = "Ripple CLI - runs the reactive streams tutorial demos", long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available demos
    List,
    /// Run a single demo
    Run {
        #[arg(value_enum)]
        demo: Demo,
    },
    /// Run every demo in order
    All,
}

fn init_tracing(config: &DemoConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(config.logging.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run_demo(demo: Demo, config: &DemoConfig) -> Result<()> {
    let start = Instant::now();
    println!("{}", format!("== {} ==", demo.name()).bold());

    let lines = demos::run(demo, &config.timing)
        .await
        .with_context(|| format!("demo '{}' failed", demo.name()))?;
    for line in lines {
        if line.starts_with("ERROR") {
            println!("{}", line.red());
        } else {
            println!("{}", line.green());
        }
    }

    println!("{}", format!("({:.2?})", start.elapsed()).dimmed());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DemoConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => DemoConfig::default(),
    };
    init_tracing(&config, args.log_level.as_deref());

    info!("Ripple CLI v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::List => {
            for demo in Demo::value_variants() {
                println!("{:<24} {}", demo.name().cyan(), demo.about());
            }
        }
        Command::Run { demo } => run_demo(demo, &config).await?,
        Command::All => {
            let mut failed = 0;
            for demo in Demo::value_variants() {
                if let Err(e) = run_demo(*demo, &config).await {
                    error!("{:#}", e);
                    failed += 1;
                }
                println!();
            }
            if failed > 0 {
                anyhow::bail!("{} demos failed", failed);
            }
        }
    }

    Ok(())
}
