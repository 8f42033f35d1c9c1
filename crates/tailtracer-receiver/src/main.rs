use clap::{Parser, Subcommand};
use std::time::Duration;
use tailtracer::CodePolicy;
use tailtracer_receiver::{parse_interval, JsonLinesSink, Receiver, ReceiverConfig, TraceSink};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tailtracer")]
#[command(about = "Synthetic ATM traces for exercising trace pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a batch on every interval until interrupted
    Run {
        /// Time between batches (e.g. 250ms, 30s, 1m)
        #[arg(short, long, default_value = "1m", value_parser = parse_interval_arg)]
        interval: Duration,

        /// Traces per batch
        #[arg(short, long, default_value = "1")]
        traces: usize,

        /// Seed for device and endpoint selection
        #[arg(long)]
        seed: Option<u64>,

        /// Fail on unrecognized catalog codes instead of emitting blanks
        #[arg(long)]
        strict: bool,
    },

    /// Emit a single batch and exit
    Generate {
        /// Traces in the batch
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed for device and endpoint selection
        #[arg(long)]
        seed: Option<u64>,

        /// Fail on unrecognized catalog codes instead of emitting blanks
        #[arg(long)]
        strict: bool,
    },
}

fn parse_interval_arg(s: &str) -> Result<Duration, String> {
    parse_interval(s).map_err(|e| e.to_string())
}

fn code_policy(strict: bool) -> CodePolicy {
    if strict {
        CodePolicy::Reject
    } else {
        CodePolicy::Blank
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the trace stream, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            interval,
            traces,
            seed,
            strict,
        } => {
            let config = ReceiverConfig {
                interval,
                traces_per_tick: traces,
                seed,
                code_policy: code_policy(strict),
            };

            let mut receiver = Receiver::new(config)?;
            receiver.start(JsonLinesSink::stdout())?;

            tokio::signal::ctrl_c().await?;
            receiver.shutdown().await;
        }
        Commands::Generate {
            count,
            seed,
            strict,
        } => {
            let config = ReceiverConfig {
                seed,
                code_policy: code_policy(strict),
                ..Default::default()
            };

            let receiver = Receiver::new(config)?;
            let batch = receiver.generator().generate_batch(count)?;
            JsonLinesSink::stdout().consume(batch).await?;
        }
    }

    Ok(())
}
