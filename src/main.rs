//! Stackform CLI - declare, validate, and synthesize the network stack.
//!
//! This is the main entry point for the Stackform command-line tool.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stackform::prelude::*;

/// Declarative cloud network topology synthesizer
#[derive(Parser)]
#[command(name = "stackform", version, about, long_about = None)]
struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to a stack config file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the declaration and write the provisioning document
    Synth {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Evaluate and validate the declaration without emitting anything
    Validate,
    /// Print the creation order implied by the resource references
    Order {
        /// Emit the dependency graph in DOT format instead
        #[arg(long)]
        dot: bool,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        let code = err.downcast_ref::<Error>().map_or(1, Error::exit_code);
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = StackConfig::load(cli.config.as_deref())?;
    let topology = network_stack(&config)?;

    match &cli.command {
        Commands::Synth { format, output } => {
            let manifest = synthesize(&topology)?;
            let rendered = match format {
                OutputFormat::Json => manifest.to_json()?,
                OutputFormat::Yaml => manifest.to_yaml()?,
            };
            match output {
                Some(path) => std::fs::write(path, rendered)
                    .with_context(|| format!("failed to write '{}'", path.display()))?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    writeln!(stdout, "{rendered}")?;
                }
            }
        }
        Commands::Validate => {
            // network_stack already validated; say so explicitly
            topology.validate()?;
            println!(
                "topology is valid: {} resources, {} outputs",
                topology.len(),
                topology.outputs().count()
            );
        }
        Commands::Order { dot } => {
            if *dot {
                print!("{}", topology.to_dot()?);
            } else {
                for id in topology.deployment_order()? {
                    println!("{id}");
                }
            }
        }
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
