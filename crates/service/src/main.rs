pub mod client;
pub mod config;
pub mod csv_loader;
pub mod error;
pub mod protocol;
pub mod server;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, DetectionMode};
use crate::csv_loader::CsvGraphLoader;
use crate::error::Error;
use crate::protocol::{GraphResponse, encode_response, fallback_reply, handle_request};
use crate::server::GraphServer;
use bellman_ford_core::{BellmanFordSolver, ShortestPathSolver, collect_results};
use common::types::VertexId;

/// Single-source shortest paths (Bellman-Ford) over a line-delimited JSON socket.
#[derive(Parser)]
#[command(name = "graph-service")]
#[command(version)]
#[command(about = "Bellman-Ford shortest-path service")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to crates/service/Config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accept one JSON request per connection and reply with the distances
    Serve,
    /// Solve a JSON request file and print the response
    Solve {
        path: PathBuf,
        /// Override the configured negative-loop detection
        #[arg(long, value_enum)]
        detect: Option<DetectionMode>,
    },
    /// Solve a `from,to,weight` CSV edge list and print the response
    SolveCsv {
        path: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        start: VertexId,
        /// Override the configured negative-loop detection
        #[arg(long, value_enum)]
        detect: Option<DetectionMode>,
    },
    /// Send a JSON request file to a running service and print its reply
    Query {
        path: PathBuf,
        /// Service address; defaults to the configured bind address
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match crate::config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags pick the level.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn solver_for(config: &Config, detect: Option<DetectionMode>) -> BellmanFordSolver {
    let mode = detect.unwrap_or(config.solver.negative_loop_detection);
    BellmanFordSolver::new(mode.into())
}

async fn run(command: Commands, config: Config) -> Result<(), Error> {
    match command {
        Commands::Serve => {
            let solver = solver_for(&config, None);
            info!(
                "Starting graph service on {} (detection: {:?})",
                config.server.bind_address(),
                solver.detection()
            );
            GraphServer::new(config.server, solver).run().await
        }
        Commands::Solve { path, detect } => {
            let request = read_file(&path)?;
            println!("{}", handle_request(&request, &solver_for(&config, detect)));
            Ok(())
        }
        Commands::SolveCsv {
            path,
            start,
            detect,
        } => {
            let solver = solver_for(&config, detect);
            println!("{}", solve_csv(&path, start, &solver));
            Ok(())
        }
        Commands::Query { path, addr } => {
            let payload = read_file(&path)?;
            let addr = addr.unwrap_or_else(|| config.server.bind_address());
            let deadline = config.server.read_timeout() + config.server.solve_timeout();
            let reply = client::query(&addr, &payload, deadline).await?;
            println!("{}", reply);
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|e| {
        error!("Failed to read file {}: {}", path.display(), e);
        Error::IoError(e)
    })
}

fn solve_csv<S: ShortestPathSolver>(path: &Path, start: VertexId, solver: &S) -> String {
    let outcome = CsvGraphLoader::new(path).load().and_then(|mut graph| {
        solver.solve(&mut graph, start)?;
        encode_response(&GraphResponse::from_results(collect_results(&graph)))
    });

    outcome.unwrap_or_else(|e| fallback_reply(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_parses_solve_csv() {
        let cli = Cli::try_parse_from([
            "graph-service",
            "-vv",
            "solve-csv",
            "edges.csv",
            "--start",
            "-3",
            "--detect",
            "single-pass",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::SolveCsv {
                path,
                start,
                detect,
            } => {
                assert_eq!(path, PathBuf::from("edges.csv"));
                assert_eq!(start, -3);
                assert_eq!(detect, Some(DetectionMode::SinglePass));
            }
            _ => panic!("Expected the solve-csv command"),
        }
    }

    #[test]
    fn test_cli_requires_a_command() {
        assert!(Cli::try_parse_from(["graph-service"]).is_err());
    }

    #[test]
    fn test_solve_csv_reports_missing_start() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(b"from,to,weight\n0,1,2\n")
            .expect("Failed to write mock content");

        let reply = solve_csv(temp_file.path(), 9, &BellmanFordSolver::default());

        assert!(reply.starts_with(protocol::FALLBACK_PREFIX));
        assert!(reply.contains("Start vertex 9"));
    }

    #[test]
    fn test_solve_csv_success() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(b"from,to,weight\n0,1,2\n1,2,-1\n")
            .expect("Failed to write mock content");

        let reply = solve_csv(temp_file.path(), 0, &BellmanFordSolver::default());
        let response: GraphResponse = serde_json::from_str(&reply).expect("reply is JSON");

        let distances: Vec<_> = response.vertices.iter().map(|v| (v.id, v.distance)).collect();
        assert_eq!(distances, vec![(0, 0), (1, 2), (2, 1)]);
    }
}
