//! navlink daemon/CLI.
//!
//! `display` runs the dash-mounted role: the control-plane HTTP server
//! plus the radio relay listener. The remaining subcommands drive the
//! sender role against a paired display.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tokio::net::TcpListener;

use nl_app::{AppDeps, CommandSender, PairDevice, StatusCheck, TokenService};
use nl_core::config::AppConfig;
use nl_core::link::normalize;
use nl_core::pairing::{PairingCode, PairingPayload};
use nl_core::ports::{ControlPlanePort, OpenerPort};
use nl_infra::{FileConfigRepository, FileStateStore, ProcessOpener};
use nl_network::{ControlPlaneServer, HttpControlPlane, RadioDisplay, RadioSender, ShortLinkResolver};

#[derive(Parser)]
#[command(
    name = "navlink",
    version,
    about = "Hand off navigation destinations to a dash-mounted display"
)]
struct Cli {
    /// Directory holding config and durable state.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the display role: control-plane server and radio relay listener.
    Display {
        /// Control-plane port (overrides the configured value).
        #[arg(long)]
        port: Option<u16>,

        /// Bind address of the radio relay listener.
        #[arg(long, default_value = "0.0.0.0:8766")]
        radio_bind: String,
    },

    /// Save the pairing payload shown by a display (JSON or navlink:// URI).
    Pair { payload: String },

    /// Normalize a destination and deliver it to the paired display.
    Send {
        /// Destination: URI, coordinates, maps link, or free text.
        input: String,

        /// Deliver over the radio relay at this address instead of HTTP.
        #[arg(long, requires = "code")]
        radio: Option<String>,

        /// Pairing code shown by the display (radio delivery only).
        #[arg(long)]
        code: Option<String>,
    },

    /// Probe the paired display and compare token hints.
    Status,

    /// Retry commands left in the pending queue.
    Retry,

    /// Rotate the co-resident display's pairing token.
    RefreshToken,
}

fn data_dir(cli: &Cli) -> PathBuf {
    cli.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("navlink")
    })
}

async fn open_deps(dir: &PathBuf, config: &AppConfig) -> Result<(Arc<FileStateStore>, AppDeps)> {
    let store = Arc::new(FileStateStore::open(dir.join("state.json")).await?);
    let opener: Arc<dyn OpenerPort> = Arc::new(ProcessOpener::new(
        config.maps_open_command.clone(),
        config.browser_open_command.clone(),
    ));
    let control: Arc<dyn ControlPlanePort> = Arc::new(HttpControlPlane::new(
        Duration::from_secs(config.http_timeout_secs),
    )?);
    let deps = AppDeps {
        token_store: store.clone(),
        pairing_record: store.clone(),
        pending_queue: store.clone(),
        resolve_cache: store.clone(),
        opener,
        control_plane: control,
    };
    Ok((store, deps))
}

fn command_sender(deps: &AppDeps) -> CommandSender {
    CommandSender::new(
        deps.pairing_record.clone(),
        deps.pending_queue.clone(),
        deps.control_plane.clone(),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let dir = data_dir(&cli);
    let config = FileConfigRepository::new(dir.join("config.json"))
        .load_or_init()
        .await?;

    match cli.command {
        Commands::Display { port, radio_bind } => {
            run_display(&dir, &config, port, &radio_bind).await
        }
        Commands::Pair { payload } => {
            let (_store, deps) = open_deps(&dir, &config).await?;
            let record = PairDevice::new(deps.pairing_record.clone())
                .pair_from_payload(&payload)
                .await?;
            println!("paired with {}:{}", record.address, record.port);
            Ok(())
        }
        Commands::Send { input, radio, code } => run_send(&dir, &config, input, radio, code).await,
        Commands::Status => {
            let (_store, deps) = open_deps(&dir, &config).await?;
            let sender = command_sender(&deps);
            match sender.check_status().await? {
                StatusCheck::NotPaired => println!("not paired"),
                StatusCheck::Verified => println!("paired and verified"),
                StatusCheck::RemoteUnpaired => println!("display is not paired; re-pair required"),
                StatusCheck::TokenMismatch => println!("token mismatch; re-pair required"),
                StatusCheck::Unreachable(reason) => println!("display unreachable: {}", reason),
            }
            Ok(())
        }
        Commands::Retry => {
            let (_store, deps) = open_deps(&dir, &config).await?;
            let sender = command_sender(&deps);
            let summary = sender.retry_pending().await?;
            println!(
                "retried {}: {} delivered, {} failed permanently, {} still pending",
                summary.attempted,
                summary.delivered,
                summary.failed_permanently,
                summary.still_pending
            );
            Ok(())
        }
        Commands::RefreshToken => {
            let client = HttpControlPlane::with_default_timeout()?;
            let token = client.refresh_local_token(config.server_port).await?;
            println!("new token: {}", token);
            Ok(())
        }
    }
}

async fn run_display(
    dir: &PathBuf,
    config: &AppConfig,
    port: Option<u16>,
    radio_bind: &str,
) -> Result<()> {
    let store = Arc::new(FileStateStore::open(dir.join("state.json")).await?);
    let tokens = Arc::new(TokenService::new(store.clone()));
    let opener: Arc<dyn OpenerPort> = Arc::new(ProcessOpener::new(
        config.maps_open_command.clone(),
        config.browser_open_command.clone(),
    ));

    let port = port.unwrap_or(config.server_port);
    let token = tokens.get_token().await?;
    let ip = local_ip_address::local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let payload = PairingPayload::new(ip, port, token.as_str());
    println!("pairing payload: {}", payload.to_json());
    println!("pairing link:    {}", payload.to_uri());

    let code = PairingCode::generate();
    println!("radio pairing code: {}", code);

    let http_listener = TcpListener::bind((config.bind_addr.as_str(), port))
        .await
        .with_context(|| format!("bind control plane on {}:{} failed", config.bind_addr, port))?;
    let radio_listener = TcpListener::bind(radio_bind)
        .await
        .with_context(|| format!("bind radio relay on {} failed", radio_bind))?;

    let server = ControlPlaneServer::new(tokens, opener.clone(), port);
    let radio = Arc::new(RadioDisplay::new(code, opener));

    info!("display role running");
    tokio::try_join!(server.serve(http_listener), radio.serve(radio_listener))?;
    Ok(())
}

async fn run_send(
    dir: &PathBuf,
    config: &AppConfig,
    input: String,
    radio: Option<String>,
    code: Option<String>,
) -> Result<()> {
    let (store, deps) = open_deps(dir, config).await?;

    let Some(normalized) = normalize(&input) else {
        bail!("could not understand destination input: {}", input);
    };
    let resolver = ShortLinkResolver::new(store.clone())?;
    let url = resolver.resolve_if_needed(&normalized).await;

    if let Some(radio_addr) = radio {
        let code = code
            .as_deref()
            .and_then(PairingCode::parse)
            .context("--code must be the 6-digit code shown by the display")?;
        let sender = RadioSender::new(radio_addr, code);
        sender.send_open_url(&url).await?;
        println!("sent");
        return Ok(());
    }

    let sender = command_sender(&deps);
    let outcome = sender.send_command(&url).await?;
    if outcome.delivered {
        println!("sent");
    } else if outcome.queued {
        println!(
            "failed, queued for retry: {}",
            outcome.reason.unwrap_or_default()
        );
        std::process::exit(1);
    } else {
        println!("failed: {}", outcome.reason.unwrap_or_default());
        std::process::exit(1);
    }
    Ok(())
}
