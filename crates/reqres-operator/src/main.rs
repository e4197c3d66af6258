//! reqres operator - keeps reqres.in users in sync with User resources

use clap::{Parser, Subcommand};
use kube::{Client, CustomResourceExt};

use reqres_common::crd::User;
use reqres_common::telemetry::{init_telemetry, TelemetryConfig};
use reqres_operator::controller_runner::{build_context, build_user_controller};
use reqres_operator::startup::ensure_crds_installed;
use reqres_operator::OperatorConfig;

/// reqres - CRD-driven operator for remote users
#[derive(Parser, Debug)]
#[command(name = "reqres-operator", version, about, long_about = None)]
struct Cli {
    /// Generate CRD manifests and exit
    #[arg(long)]
    crd: bool,

    /// Log human-readable lines instead of JSON
    #[arg(long)]
    text_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as controller (default mode)
    ///
    /// Watches User resources in all namespaces and drives the remote users
    /// API toward them.
    Controller,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // kube and reqwest share one rustls provider
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("WARNING: a rustls crypto provider was already installed: {e:?}");
    }

    let cli = Cli::parse();

    if cli.crd {
        let crd = serde_yaml::to_string(&User::crd())
            .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
        println!("{crd}");
        return Ok(());
    }

    init_telemetry(TelemetryConfig {
        json: !cli.text_logs,
        ..TelemetryConfig::default()
    })?;

    match cli.command {
        Some(Commands::Controller) | None => run_controller().await,
    }
}

async fn run_controller() -> anyhow::Result<()> {
    let config = OperatorConfig::from_env()?;
    tracing::info!(
        remote = %config.remote_base_url,
        resync = ?config.resync,
        retry_delay = ?config.retry_delay,
        "Starting reqres operator"
    );

    let client = Client::try_default()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

    if config.install_crds {
        ensure_crds_installed(&client).await?;
    }

    let ctx = build_context(client.clone(), &config)?;
    build_user_controller(client, ctx).await;

    tracing::info!("Controller stopped");
    Ok(())
}
