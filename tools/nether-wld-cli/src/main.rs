//! nether-wld - WLD fragment container tool
//!
//! Lists, decodes, encodes and verifies WLD containers.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use nether_wld::ReadOptions;
use nether_wld_cli::commands;
use nether_wld_cli::config::CliConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nether-wld")]
#[command(about = "Inspect, decode, encode and verify WLD fragment containers", version)]
struct Cli {
    /// Config file (defaults to ./nether-wld.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every record and entity
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Read tolerance flags; each one overrides the config file
#[derive(Args)]
struct ReadArgs {
    /// Fail when the header region count disagrees with the Region records
    #[arg(long)]
    strict_region_count: bool,

    /// Fail on records with unregistered type codes instead of skipping them
    #[arg(long)]
    no_skip_unknown: bool,

    /// Keep records whose payload fails to decode as skipped slots
    #[arg(long)]
    skip_malformed: bool,
}

impl ReadArgs {
    fn apply(&self, mut options: ReadOptions) -> ReadOptions {
        if self.strict_region_count {
            options.strict_region_count = true;
        }
        if self.no_skip_unknown {
            options.skip_unknown = false;
        }
        if self.skip_malformed {
            options.skip_malformed = true;
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every record of a container
    Inspect {
        /// Input .wld file
        input: PathBuf,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Decode a container into a JSON scene graph
    Decode {
        /// Input .wld file
        input: PathBuf,

        /// Output JSON file (defaults to input with .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write what the decode skipped to this JSON file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write JSON on a single line
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        read: ReadArgs,
    },

    /// Encode a JSON scene graph into a container
    Encode {
        /// Input JSON file
        input: PathBuf,

        /// Output .wld file (defaults to input with .wld extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that a container round-trips byte for byte and graph for graph
    Verify {
        /// Input .wld files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        read: ReadArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let config = CliConfig::discover(cli.config.as_deref(), Path::new("."))?;

    match cli.command {
        Commands::Inspect { input, read } => {
            let options = read.apply(config.read);
            print!("{}", commands::inspect_file(&input, &options)?);
        }
        Commands::Decode {
            input,
            output,
            report,
            compact,
            read,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("json"));
            let options = read.apply(config.read);
            let pretty = config.output.pretty_json && !compact;
            tracing::info!("Decoding {:?} -> {:?}", input, output);
            commands::decode_file(&input, &output, report.as_deref(), &options, pretty)?;
        }
        Commands::Encode { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("wld"));
            tracing::info!("Encoding {:?} -> {:?}", input, output);
            commands::encode_file(&input, &output)?;
        }
        Commands::Verify { inputs, read } => {
            let options = read.apply(config.read);
            let mut failed = 0;
            for input in &inputs {
                let result = commands::verify_file(input, &options)?;
                if result.passed() {
                    tracing::info!(
                        "{:?}: ok ({} records, {} entities)",
                        input,
                        result.records,
                        result.entities
                    );
                } else {
                    failed += 1;
                    tracing::error!(
                        "{:?}: byte exact {}, graph round trip {}{}",
                        input,
                        result.byte_exact(),
                        result.graph_round_trip,
                        result
                            .graph_error
                            .as_deref()
                            .map(|reason| format!(" ({reason})"))
                            .unwrap_or_default()
                    );
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} containers failed verification", failed, inputs.len());
            }
        }
    }

    Ok(())
}
