//! `score`: the CLI entry point (spec.md §5/§6). A thin wrapper — argument
//! parsing and process wiring only — over [`score_server::pipeline`].

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use score_cache::Cache;
use score_config::{CacheLocation, Config};
use score_server::http::{router, AppState};
use score_server::partition::partition_of;
use score_server::pipeline::Pipeline;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "score", about = "Compute open-source package quality scores")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve {
        #[arg(long, env = "SCORE_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "SCORE_PORT", default_value_t = 8000)]
        port: u16,
    },
    /// Compute and print the score for one package.
    Score {
        ecosystem: String,
        name: String,
        #[arg(long)]
        source_url: Option<String>,
        #[arg(long)]
        invalidate_cache: bool,
    },
    /// Fetch and print the registry record for one package.
    Pkg {
        ecosystem: String,
        name: String,
        #[arg(long)]
        invalidate_cache: bool,
    },
    /// Clone and ingest one git repository, printing its `Source`.
    Source {
        source_url: String,
        #[arg(long)]
        invalidate_cache: bool,
    },
    /// Print which batch-partition bucket `name` falls into.
    Partition {
        name: String,
        #[arg(long, default_value_t = 16)]
        num_partitions: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn open_cache(config: &Config) -> anyhow::Result<(Cache, Option<tempfile::TempDir>)> {
    match &config.cache_location {
        CacheLocation::Disabled => {
            let (cache, dir) = Cache::temp()?;
            Ok((cache, Some(dir)))
        }
        CacheLocation::Path(path) => Ok((Cache::new(path)?, None)),
    }
}

async fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Serve { host, port } => {
            let (cache, _temp_dir) = open_cache(config)?;
            let client = score_client::build_client(concat!("opensourcescore/", env!("CARGO_PKG_VERSION")));
            let pipeline = Arc::new(Pipeline::new(cache, client).with_clone_timeout(config.max_clone_time));
            let app = router(AppState { pipeline });

            let addr: SocketAddr = format!("{host}:{port}").parse()?;
            info!(%addr, "listening");
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
            Ok(())
        }
        Command::Score { ecosystem, name, source_url, invalidate_cache } => {
            let (cache, _temp_dir) = open_cache(config)?;
            let client = score_client::build_client(concat!("opensourcescore/", env!("CARGO_PKG_VERSION")));
            let pipeline = Pipeline::new(cache, client).with_clone_timeout(config.max_clone_time);
            let result = pipeline.run(&ecosystem, &name, source_url.as_deref(), invalidate_cache).await?;
            println!("{}", serde_json::to_string_pretty(&result.score)?);
            Ok(())
        }
        Command::Pkg { ecosystem, name, invalidate_cache } => {
            let (cache, _temp_dir) = open_cache(config)?;
            let client = score_client::build_client(concat!("opensourcescore/", env!("CARGO_PKG_VERSION")));
            let pipeline = Pipeline::new(cache, client).with_clone_timeout(config.max_clone_time);
            let (package, _cache_header) = pipeline.package(&ecosystem, &name, invalidate_cache).await?;
            println!("{}", serde_json::to_string_pretty(&package)?);
            Ok(())
        }
        Command::Source { source_url, invalidate_cache } => {
            let (cache, _temp_dir) = open_cache(config)?;
            let client = score_client::build_client(concat!("opensourcescore/", env!("CARGO_PKG_VERSION")));
            let pipeline = Pipeline::new(cache, client).with_clone_timeout(config.max_clone_time);
            let (source, _cache_header) = pipeline.source(&source_url, invalidate_cache).await;
            println!("{}", serde_json::to_string_pretty(&source)?);
            Ok(())
        }
        Command::Partition { name, num_partitions } => {
            println!("{}", partition_of(&name, num_partitions));
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
