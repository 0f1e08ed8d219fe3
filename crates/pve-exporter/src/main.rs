//! pve-exporter — Prometheus exporter for Proxmox VE.
//!
//! Serves `/pve?target=<host>&module=<name>`, scraping the given PVE API on
//! every request with the credentials of the named module.
//!
//! # Usage
//!
//! ```text
//! pve-exporter --config-file /etc/prometheus/pve.toml --listen-address 0.0.0.0:9221
//! PVE_USER=prometheus@pve PVE_PASSWORD=... pve-exporter --no-collector-config
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pve_core::{CollectorsOptions, ExporterConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pve-exporter", about = "Proxmox VE exporter for the Prometheus monitoring system")]
struct Cli {
    /// Path to the TOML config file. Without it, a `default` module is read
    /// from `PVE_*` environment variables.
    #[arg(long, env = "PVE_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:9221")]
    listen_address: SocketAddr,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,

    /// Exclude the up/down status of nodes, guests and the cluster.
    #[arg(long)]
    no_collector_status: bool,

    /// Exclude PVE version info.
    #[arg(long)]
    no_collector_version: bool,

    /// Exclude node info.
    #[arg(long)]
    no_collector_node: bool,

    /// Exclude cluster info.
    #[arg(long)]
    no_collector_cluster: bool,

    /// Exclude resource usage of nodes, guests and storages.
    #[arg(long)]
    no_collector_resources: bool,

    /// Exclude guest config values (onboot).
    #[arg(long)]
    no_collector_config: bool,

    /// Exclude volume sizes.
    #[arg(long)]
    no_collector_volumes: bool,
}

impl Cli {
    fn collectors(&self) -> CollectorsOptions {
        CollectorsOptions {
            status: !self.no_collector_status,
            version: !self.no_collector_version,
            node: !self.no_collector_node,
            cluster: !self.no_collector_cluster,
            resources: !self.no_collector_resources,
            config: !self.no_collector_config,
            volumes: !self.no_collector_volumes,
        }
    }

    fn load_config(&self) -> anyhow::Result<ExporterConfig> {
        match &self.config_file {
            Some(path) => ExporterConfig::from_file(path)
                .with_context(|| format!("loading config file {}", path.display())),
            None => ExporterConfig::from_env().context("reading PVE_* environment"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pve_collector=debug,pve_api=debug"));
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = cli.load_config()?;
    let options = cli.collectors();
    info!(
        modules = ?config.modules.keys().collect::<Vec<_>>(),
        ?options,
        "PVE exporter starting"
    );

    let router = pve_api::build_router(pve_api::ApiState::new(config, options));
    let listener = tokio::net::TcpListener::bind(cli.listen_address)
        .await
        .with_context(|| format!("binding {}", cli.listen_address))?;
    info!(addr = %cli.listen_address, "listening");

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to install Ctrl-C handler");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("PVE exporter stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_collectors_enabled_by_default() {
        let cli = Cli::parse_from(["pve-exporter"]);
        assert_eq!(cli.collectors(), CollectorsOptions::default());
        assert_eq!(cli.listen_address, "0.0.0.0:9221".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn no_collector_flags_disable_toggles() {
        let cli = Cli::parse_from([
            "pve-exporter",
            "--no-collector-config",
            "--no-collector-volumes",
            "--listen-address",
            "127.0.0.1:9000",
        ]);
        let options = cli.collectors();
        assert!(!options.config);
        assert!(!options.volumes);
        assert!(options.status && options.version && options.node);
        assert!(options.cluster && options.resources);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
