use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use bincode::deserialize;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use console_core::{load_console_config, ConsoleSession};
use console_runtime::{format_command_line, ConsoleCommand, ConsoleSnapshot};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, trace, warn};

mod app;
mod ui;

use app::{channel, InspectorApp};

/// Upper bound on a single snapshot frame.
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Exodrone console inspector", long_about = None)]
struct Cli {
    /// Address of the authority streaming console snapshots.
    #[arg(long, default_value = "127.0.0.1:42000")]
    endpoint: String,
    /// Address accepting console command lines.
    #[arg(long, default_value = "127.0.0.1:42001")]
    command_endpoint: String,
    /// Identity this console presents to the authority.
    #[arg(long, default_value = "console")]
    viewer: String,
    /// Console presentation config; falls back to EXODRONE_CONSOLE_CONFIG_PATH.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Play snapshots from a JSON array instead of connecting. Commands are
    /// logged, not sent.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Delay between replayed snapshots.
    #[arg(long, default_value_t = 1500)]
    replay_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let (log_tx, log_rx) = mpsc::channel::<String>();
    let log_writer_tx = log_tx.clone();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_writer_tx.clone(),
        })
        .init();

    let cli = Cli::parse();
    let (config, metadata) = load_console_config(cli.config.as_deref());
    info!(
        target: "exodrone::inspector",
        config = ?metadata.path(),
        viewer = %cli.viewer,
        "inspector.started"
    );

    let (sender, receiver) = channel();
    let (command_tx, command_rx) = mpsc::channel::<ConsoleCommand>();
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let command_endpoint = (cli.replay.is_none()).then(|| cli.command_endpoint.clone());
    let _command_handle =
        std::thread::spawn(move || run_command_pump(command_endpoint, command_rx));

    let session = ConsoleSession::new(cli.viewer.clone(), config);
    let _ui_handle = std::thread::spawn(move || -> color_eyre::Result<()> {
        let app = InspectorApp::new(session, receiver, command_tx, shutdown_tx, log_rx)?;
        app.run()
    });

    if let Some(path) = &cli.replay {
        let snapshots = load_replay(path).await?;
        info!(
            target: "exodrone::inspector",
            path = %path.display(),
            count = snapshots.len(),
            "replay.loaded"
        );
        let interval = Duration::from_millis(cli.replay_interval_ms);
        for snapshot in snapshots {
            if shutdown_rx.try_recv().is_ok() || sender.send(snapshot).is_err() {
                return Ok(());
            }
            tokio::time::sleep(interval).await;
        }
        info!(target: "exodrone::inspector", "replay.finished");
        // Keep the last snapshot on screen until the user quits.
        while shutdown_rx.try_recv().is_err() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        return Ok(());
    }

    info!("Connecting to authority at {}", cli.endpoint);
    loop {
        if shutdown_rx.try_recv().is_ok() {
            info!("Inspector requested shutdown");
            break;
        }
        match TcpStream::connect(&cli.endpoint).await {
            Ok(mut stream) => {
                info!("Connected. Streaming console snapshots. Press q to exit.");
                if let Err(err) = pump_snapshots(&mut stream, &sender).await {
                    warn!("Connection error: {}", err);
                    info!("Reconnecting in 2 seconds...");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
            Err(err) => {
                warn!("Failed to connect: {}", err);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }

    Ok(())
}

async fn load_replay(path: &Path) -> Result<Vec<ConsoleSnapshot>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("reading replay file {}", path.display()))?;
    let snapshots = serde_json::from_str(&text)
        .wrap_err_with(|| format!("parsing replay file {}", path.display()))?;
    Ok(snapshots)
}

async fn pump_snapshots(
    stream: &mut TcpStream,
    sender: &UnboundedSender<ConsoleSnapshot>,
) -> Result<()> {
    let mut len_buf = [0u8; 4];
    loop {
        stream.read_exact(&mut len_buf).await?;
        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_FRAME_LEN {
            color_eyre::eyre::bail!("snapshot frame of {len} bytes exceeds limit");
        }
        let mut payload = vec![0u8; len];
        stream.read_exact(&mut payload).await?;
        let snapshot: ConsoleSnapshot = deserialize(&payload)?;
        trace!(sequence = snapshot.header.sequence, "snapshot.frame");
        if sender.send(snapshot).is_err() {
            break;
        }
    }
    Ok(())
}

fn run_command_pump(endpoint: Option<String>, receiver: Receiver<ConsoleCommand>) {
    for cmd in receiver {
        let line = format_command_line(&cmd);
        let Some(endpoint) = endpoint.as_deref() else {
            info!(%line, "command.replay_only");
            continue;
        };
        match send_command(endpoint, &line) {
            Ok(_) => info!(%line, "command.sent"),
            Err(err) => warn!(%line, "Failed to send command: {}", err),
        }
    }
}

fn send_command(endpoint: &str, line: &str) -> std::io::Result<()> {
    let mut stream = std::net::TcpStream::connect(endpoint)?;
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    Ok(())
}
