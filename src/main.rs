//! Lava Entropy CLI
//!
//! Command-line interface for generating random bytes from a pool of
//! simulated lava lamps, watching the pool run, or serving it over HTTP.

use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use lava_entropy::{
    analysis::ByteStatistics,
    config::FileConfig,
    lamp::{LampServices, LogSink},
    pool::{LampPool, LampSelection, MAX_REQUEST_BYTES},
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "lava-entropy", version, about = "Random bytes from simulated lava lamps")]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the number of lamps in the pool.
    #[arg(long, global = true)]
    lamps: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print random bytes as lowercase hex.
    Generate {
        /// Number of bytes to produce.
        #[arg(short, long, default_value_t = 32, value_parser = parse_byte_count)]
        bytes: usize,

        /// Lamp id, or `all` to XOR-combine every lamp.
        #[arg(short, long, default_value = "all")]
        lamp: LampSelection,

        /// Log byte statistics of the output.
        #[arg(long)]
        stats: bool,
    },

    /// Generate continuously until interrupted.
    Watch {
        /// Seconds between generation rounds.
        #[arg(long, default_value_t = 3)]
        interval_secs: u64,

        /// Bytes per round.
        #[arg(short, long, default_value_t = 32, value_parser = parse_byte_count)]
        bytes: usize,
    },

    /// Serve the pool over HTTP.
    Serve {
        /// Port to listen on. Overrides the configuration file.
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Parses a byte count no larger than [`MAX_REQUEST_BYTES`].
fn parse_byte_count(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a byte count", s))?;
    if n > MAX_REQUEST_BYTES {
        return Err(format!("at most {} bytes per request", MAX_REQUEST_BYTES));
    }
    Ok(n)
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut file_config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if let Some(lamps) = cli.lamps {
        file_config.pool.lamps = lamps;
    }
    file_config.validate()?;

    info!("Lava Entropy v{}", lava_entropy::VERSION);

    match cli.command {
        Command::Generate { bytes, lamp, stats } => {
            let pool = build_pool(&file_config, false);
            let output = pool.combined_random(bytes, lamp)?;

            if stats {
                let s = ByteStatistics::analyze(&output);
                info!(
                    bytes = s.sample_size,
                    shannon_per_byte = s.shannon_per_byte,
                    chi_square = s.chi_square,
                    bit_bias = s.bit_bias,
                    "Output statistics"
                );
            }

            println!("{}", hex::encode(output));
            Ok(())
        }
        Command::Watch {
            interval_secs,
            bytes,
        } => watch(&file_config, Duration::from_secs(interval_secs.max(1)), bytes),
        Command::Serve { port } => serve(file_config, port),
    }
}

fn build_pool(file_config: &FileConfig, log_snapshots: bool) -> LampPool {
    let services = if log_snapshots {
        LampServices::system().with_sink(Arc::new(LogSink))
    } else {
        LampServices::system()
    };
    LampPool::from_config(&file_config.pool_config(), &services)
}

fn watch(file_config: &FileConfig, interval: Duration, bytes: usize) -> Result<(), Box<dyn Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    let pool = build_pool(file_config, true);
    info!(
        interval_secs = interval.as_secs(),
        bytes, "Watching pool (Ctrl-C to stop)"
    );

    let mut rounds = 0u64;
    while running.load(Ordering::SeqCst) {
        let started = Instant::now();
        match pool.combined_random(bytes, LampSelection::All) {
            Ok(output) => {
                rounds += 1;
                println!("{}", hex::encode(output));
            }
            Err(e) => warn!(error = %e, "Generation round failed"),
        }

        // Sleep in short slices so Ctrl-C is noticed promptly
        while running.load(Ordering::SeqCst) && started.elapsed() < interval {
            std::thread::sleep(Duration::from_millis(100));
        }
    }

    let stats = pool.stats()?;
    info!(
        rounds,
        generations = stats.generations(),
        frames = stats.frames_rendered(),
        snapshots = stats.snapshots_saved(),
        "Stopped"
    );
    Ok(())
}

#[cfg(feature = "server")]
fn serve(file_config: FileConfig, port: Option<u16>) -> Result<(), Box<dyn Error>> {
    use lava_entropy::metrics::MetricsRegistry;
    use lava_entropy::server::{ApiServer, ServerConfig};

    let pool = build_pool(&file_config, true);
    let config = ServerConfig::with_port(port.unwrap_or(file_config.server.port));
    let server = ApiServer::new(config, pool, MetricsRegistry::new()?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.run())?;
    Ok(())
}

#[cfg(not(feature = "server"))]
fn serve(_file_config: FileConfig, _port: Option<u16>) -> Result<(), Box<dyn Error>> {
    Err("this binary was built without the `server` feature".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_count_limits() {
        assert_eq!(parse_byte_count("0"), Ok(0));
        assert_eq!(parse_byte_count("32"), Ok(32));
        assert_eq!(parse_byte_count(&MAX_REQUEST_BYTES.to_string()), Ok(MAX_REQUEST_BYTES));
        assert!(parse_byte_count(&(MAX_REQUEST_BYTES + 1).to_string()).is_err());
        assert!(parse_byte_count("4611686018427387904").is_err());
        assert!(parse_byte_count("lots").is_err());
    }

    #[test]
    fn test_generate_rejects_oversized_bytes() {
        let result = Cli::try_parse_from(["lava-entropy", "generate", "--bytes", "4611686018427387904"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["lava-entropy", "watch", "--bytes", "2000000"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["lava-entropy", "generate"]).unwrap();
        match cli.command {
            Command::Generate { bytes, lamp, stats } => {
                assert_eq!(bytes, 32);
                assert_eq!(lamp, LampSelection::All);
                assert!(!stats);
            }
            _ => panic!("expected generate"),
        }
    }
}
