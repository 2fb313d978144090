//! Flight surety daemon: entry point for running a node.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use surety_node::{init_logging, LogFormat, NodeConfig, StopReason, SuretyNode};
use tokio::signal;

#[derive(Parser)]
#[command(name = "surety-daemon", about = "Flight delay insurance oracle and airline node")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "SURETY_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the node until SIGINT or SIGTERM.
    Run(RunArgs),
    /// Print the default configuration as TOML.
    #[command(name = "default-config")]
    DefaultConfig,
}

#[derive(clap::Args)]
struct RunArgs {
    /// REST server port.
    #[arg(long, env = "SURETY_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Disable the REST server.
    #[arg(long, env = "SURETY_DISABLE_RPC")]
    no_rpc: bool,

    /// Enable Prometheus metrics endpoint.
    #[arg(long, env = "SURETY_ENABLE_METRICS")]
    metrics: bool,

    /// Log format: "human" or "json".
    #[arg(long, env = "SURETY_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SURETY_LOG_LEVEL")]
    log_level: Option<String>,
}

impl RunArgs {
    fn apply(self, config: NodeConfig) -> NodeConfig {
        NodeConfig {
            rpc_port: self.rpc_port.unwrap_or(config.rpc_port),
            enable_rpc: config.enable_rpc && !self.no_rpc,
            enable_metrics: self.metrics || config.enable_metrics,
            log_format: self.log_format.unwrap_or(config.log_format),
            log_level: self.log_level.unwrap_or(config.log_level),
            ..config
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<NodeConfig> {
    match path {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(NodeConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::DefaultConfig => {
            print!("{}", NodeConfig::default().to_toml_string()?);
        }
        Command::Run(args) => {
            let config = args.apply(load_config(cli.config.as_ref())?);
            let format: LogFormat = config.log_format.parse()?;
            init_logging(format, &config.log_level)?;
            if let Some(path) = &cli.config {
                tracing::info!("loaded config from {}", path.display());
            }

            tracing::info!(
                "starting flight surety node (REST:{}, metrics:{}, oracles:{}, airlines:{})",
                if config.enable_rpc {
                    config.rpc_port.to_string()
                } else {
                    "off".into()
                },
                config.enable_metrics,
                config.oracles.len(),
                config.airlines.len(),
            );

            let mut node = SuretyNode::new(config)?;
            node.start().await?;

            let reason = wait_for_signal().await;
            tracing::info!(%reason, "shutdown signal received, stopping node");
            node.stop_for(reason).await?;

            tracing::info!("flight surety daemon exited cleanly");
        }
    }

    Ok(())
}

/// Block until SIGINT or SIGTERM arrives.
async fn wait_for_signal() -> StopReason {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "SIGINT handler failed");
            }
            StopReason::Interrupt
        }
        _ = terminate => StopReason::Terminate,
    }
}
