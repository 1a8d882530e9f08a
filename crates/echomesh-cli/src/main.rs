//! # echomesh CLI Entry Point
//!
//! Main binary for echomesh. Starts a serving process or talks to a running
//! one.
//!
//! ## Usage
//!
//! ```bash
//! # Start a server with five local workers and the default 5s deadline
//! echomesh serve -b 0.0.0.0:8080 --pool-size 5
//!
//! # Dispatch one request (prints the raw reply for piping)
//! echomesh hit http://127.0.0.1:8080
//!
//! # Dispatch with a caller-supplied correlation id
//! echomesh hit -c ABC123 http://127.0.0.1:8080
//!
//! # Fetch the metrics snapshot as raw JSON
//! echomesh metrics http://127.0.0.1:8080
//! ```
//!
//! Server URLs must include the `http://` or `https://` prefix.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use argh::FromArgs;
use echomesh_common::{DispatchOutcome, ServeConfig};

/// Main CLI structure parsed from command-line arguments.
#[derive(FromArgs)]
/// echomesh - clustered echo dispatch service
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
    Hit(HitArgs),
    Metrics(MetricsArgs),
}

/// Arguments for starting an echomesh server.
///
/// The server starts `pool-size` local workers behind the forwarding actor
/// and answers dispatches on the bind address until shutdown.
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// start an echomesh server
struct ServeArgs {
    /// address to bind the HTTP server to
    ///
    /// Defaults to "0.0.0.0:8080" for accessibility from other machines.
    #[argh(option, short = 'b', default = "\"0.0.0.0:8080\".into()")]
    bind: String,

    /// number of local workers to start into the routing pool
    ///
    /// Each worker is an independent sequential task; requests are spread
    /// across them uniformly at random. Defaults to 5.
    #[argh(option, long = "pool-size", default = "5")]
    pool_size: usize,

    /// dispatch deadline in milliseconds
    ///
    /// A call that has not received its reply within this window returns a
    /// timeout. Defaults to 5000ms (5 seconds).
    #[argh(option, long = "deadline-ms", default = "5000")]
    deadline_ms: u64,
}

/// Arguments for dispatching requests against a running server.
///
/// Prints each reply as raw text on stdout, one line per dispatch, which
/// makes the command usable in pipelines. Failures go to stderr with a
/// non-zero exit code.
#[derive(FromArgs)]
#[argh(subcommand, name = "hit")]
/// dispatch a request through the cluster
struct HitArgs {
    /// address of the server to call
    ///
    /// Must include the http:// or https:// prefix (e.g. http://127.0.0.1:8080).
    #[argh(positional)]
    server_address: String,

    /// optional caller-supplied correlation id
    ///
    /// Sent as the x-correlation-id header and echoed back inside the reply.
    /// The server generates one when absent.
    #[argh(option, short = 'c', long = "correlation")]
    correlation: Option<String>,

    /// number of dispatches to perform sequentially
    ///
    /// Defaults to 1.
    #[argh(option, short = 'n', long = "count", default = "1")]
    count: usize,
}

/// Arguments for fetching a server's metrics snapshot.
///
/// Outputs raw JSON to stdout for processing with `jq` and friends.
#[derive(FromArgs)]
#[argh(subcommand, name = "metrics")]
/// fetch the metrics snapshot of a server
struct MetricsArgs {
    /// address of the server to query
    ///
    /// Must include the http:// or https:// prefix (e.g. http://127.0.0.1:8080).
    #[argh(positional)]
    server_address: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Initialize tracing only for the server: hit and metrics keep stdout
    // clean for unix tool usage (piping to jq, etc.)
    if matches!(cli.command, Commands::Serve(_)) {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Hit(args) => run_hit(args).await,
        Commands::Metrics(args) => run_metrics(args).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let listen_addr: SocketAddr = args
        .bind
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address {}: {}", args.bind, e))?;

    if args.pool_size == 0 {
        tracing::warn!("pool size is 0; every dispatch will fail until workers join");
    }

    let config = ServeConfig::default()
        .with_listen_addr(listen_addr)
        .with_pool_size(args.pool_size)
        .with_ask_deadline(Duration::from_millis(args.deadline_ms));

    tracing::info!(
        "starting echomesh server on {} with {} workers, {}ms deadline",
        config.listen_addr,
        config.pool_size,
        args.deadline_ms
    );

    echomesh_server::serve(config).await?;
    Ok(())
}

async fn run_hit(args: HitArgs) -> Result<()> {
    let client = echomesh_client::MeshClient::new(&args.server_address)?;

    for _ in 0..args.count {
        let outcome = match &args.correlation {
            Some(correlation) => client.hit_with_correlation(correlation).await?,
            None => client.hit().await?,
        };

        match outcome {
            DispatchOutcome::Success { reply } => println!("{reply}"),
            DispatchOutcome::Timeout => anyhow::bail!("request timed out"),
            DispatchOutcome::NoAvailableTarget => anyhow::bail!("no reachable workers"),
            DispatchOutcome::RoutingFailure { detail } => {
                anyhow::bail!("routing failure: {detail}")
            }
        }
    }

    Ok(())
}

async fn run_metrics(args: MetricsArgs) -> Result<()> {
    let client = echomesh_client::MeshClient::new(&args.server_address)?;
    let snapshot = client.metrics().await?;

    // Raw JSON to stdout
    println!("{}", serde_json::to_string(&snapshot)?);

    Ok(())
}

/// CLI argument parsing tests.
///
/// Each test simulates a command-line invocation and validates the resulting
/// structure.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let args: Cli = Cli::from_args(&["echomesh"], &["serve"]).unwrap();
        match args.command {
            Commands::Serve(ServeArgs {
                bind,
                pool_size,
                deadline_ms,
            }) => {
                assert_eq!(bind, "0.0.0.0:8080");
                assert_eq!(pool_size, 5);
                assert_eq!(deadline_ms, 5000);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_custom() {
        let args: Cli = Cli::from_args(
            &["echomesh"],
            &[
                "serve",
                "-b",
                "127.0.0.1:9090",
                "--pool-size",
                "2",
                "--deadline-ms",
                "250",
            ],
        )
        .unwrap();
        match args.command {
            Commands::Serve(ServeArgs {
                bind,
                pool_size,
                deadline_ms,
            }) => {
                assert_eq!(bind, "127.0.0.1:9090");
                assert_eq!(pool_size, 2);
                assert_eq!(deadline_ms, 250);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_hit() {
        let args: Cli = Cli::from_args(&["echomesh"], &["hit", "http://127.0.0.1:8080"]).unwrap();
        match args.command {
            Commands::Hit(HitArgs {
                server_address,
                correlation,
                count,
            }) => {
                assert_eq!(server_address, "http://127.0.0.1:8080");
                assert!(correlation.is_none());
                assert_eq!(count, 1);
            }
            _ => panic!("Expected Hit command"),
        }
    }

    #[test]
    fn test_cli_parse_hit_with_correlation_and_count() {
        let args: Cli = Cli::from_args(
            &["echomesh"],
            &[
                "hit",
                "-c",
                "ABC123",
                "--count",
                "10",
                "http://127.0.0.1:8080",
            ],
        )
        .unwrap();
        match args.command {
            Commands::Hit(HitArgs {
                server_address,
                correlation,
                count,
            }) => {
                assert_eq!(server_address, "http://127.0.0.1:8080");
                assert_eq!(correlation, Some("ABC123".to_string()));
                assert_eq!(count, 10);
            }
            _ => panic!("Expected Hit command"),
        }
    }

    #[test]
    fn test_cli_parse_metrics() {
        let args: Cli =
            Cli::from_args(&["echomesh"], &["metrics", "http://127.0.0.1:8080"]).unwrap();
        match args.command {
            Commands::Metrics(MetricsArgs { server_address }) => {
                assert_eq!(server_address, "http://127.0.0.1:8080");
            }
            _ => panic!("Expected Metrics command"),
        }
    }
}
