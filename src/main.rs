use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use rover_gateway::transport::Transport;
use rover_gateway::{Command as DriveCommand, Config, DeliveryOutcome, Dispatcher, TcpTransport};

/// Rover - voice command gateway for RC rover controllers
#[derive(Parser)]
#[command(name = "rover", version, about)]
struct Cli {
    /// Transport used for delivery
    #[arg(short, long, env = "ROVER_TRANSPORT", value_enum, default_value = "tcp")]
    transport: TransportKind,

    /// Path to a TOML config file (default: ~/.config/omni/rover/config.toml)
    #[arg(short, long, env = "ROVER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the TCP controller host
    #[arg(long, env = "ROVER_HOST")]
    host: Option<String>,

    /// Override the TCP controller port
    #[arg(long, env = "ROVER_PORT")]
    port: Option<u16>,

    /// Override the BLE device name
    #[arg(long, env = "ROVER_DEVICE")]
    device: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Selectable transport variant
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TransportKind {
    /// Newline-framed TCP to the controller's socket server
    Tcp,
    /// Single-byte GATT write to the controller's characteristic
    Ble,
}

#[derive(Subcommand)]
enum Command {
    /// Deliver a single phrase or command name and exit
    Send {
        /// Recognized text ("turn left please") or a command name ("left")
        text: String,
    },
    /// Show which command a phrase resolves to, without delivering
    Resolve {
        /// Recognized text to resolve
        text: String,
    },
    /// List the active phrase table in resolution order
    Phrases,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,rover_gateway=info",
        1 => "info,rover_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;

    // CLI/env flags win over the config file
    if let Some(host) = cli.host {
        config.tcp.host = host;
    }
    if let Some(port) = cli.port {
        config.tcp.port = port;
    }
    if let Some(device) = cli.device {
        config.ble.device_name = device;
    }

    match cli.command {
        Some(Command::Resolve { text }) => {
            match config.table.resolve(&text) {
                Some(cmd) => println!("{cmd}"),
                None => println!("no match"),
            }
            Ok(())
        }
        Some(Command::Phrases) => {
            for (phrase, cmd) in config.table.entries() {
                println!("{phrase:20} -> {cmd}");
            }
            Ok(())
        }
        Some(Command::Send { text }) => send_once(cli.transport, &config, &text).await,
        None => run_loop(cli.transport, config).await,
    }
}

/// Run the dispatch loop over stdin transcripts until end-of-stream
async fn run_loop(kind: TransportKind, config: Config) -> anyhow::Result<()> {
    let transport = build_transport(kind, &config).await?;

    tracing::info!(
        transport = transport.name(),
        target = %transport.target(),
        phrases = config.table.len(),
        "rover gateway ready - reading transcripts from stdin"
    );

    let transcripts = rover_gateway::transcript::stdin_transcripts(16);
    let dispatcher = Dispatcher::new(config.table, transport, config.retry);
    dispatcher.run(transcripts).await;

    Ok(())
}

/// Resolve `text` (phrase first, then command name) and deliver it once
async fn send_once(kind: TransportKind, config: &Config, text: &str) -> anyhow::Result<()> {
    let cmd = match config.table.resolve(text) {
        Some(cmd) => cmd,
        None => text.parse::<DriveCommand>().map_err(|_| {
            anyhow::anyhow!("'{text}' matches no phrase and is not a command name")
        })?,
    };

    let transport = build_transport(kind, config).await?;
    let dispatcher = Dispatcher::new(config.table.clone(), transport, config.retry.clone());

    match dispatcher.deliver(cmd).await {
        DeliveryOutcome::Delivered(Some(reply)) if !reply.is_empty() => {
            println!("delivered {cmd}, reply: {reply}");
            Ok(())
        }
        DeliveryOutcome::Delivered(_) => {
            println!("delivered {cmd}");
            Ok(())
        }
        DeliveryOutcome::Failed(reason) => anyhow::bail!("delivery failed: {reason}"),
    }
}

/// Construct the selected transport from configuration
#[allow(clippy::unused_async)]
async fn build_transport(
    kind: TransportKind,
    config: &Config,
) -> anyhow::Result<Arc<dyn Transport>> {
    match kind {
        TransportKind::Tcp => Ok(Arc::new(TcpTransport::new(config.tcp.clone()))),
        TransportKind::Ble => {
            #[cfg(feature = "bluer-backend")]
            {
                let connector = Arc::new(rover_gateway::BluerConnector::new().await?);
                let transport = rover_gateway::BleTransport::new(config.ble.clone(), connector)?;
                Ok(Arc::new(transport))
            }
            #[cfg(not(feature = "bluer-backend"))]
            {
                anyhow::bail!(
                    "BLE delivery requires the bluer-backend feature (device: {})",
                    config.ble.device_name
                )
            }
        }
    }
}
