//! CLI entry point for the linefetch client.

use std::io::{self, BufRead};

use anyhow::Result;
use linefetch_core::{SessionController, connect, run_session};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

mod app;
mod cli;

use app::config::{default_log_level, parse_cli_with_sources, resolve_settings};
use app::terminal::TerminalObserver;

/// Queued stdin lines waiting to be sent.
const REQUEST_QUEUE_DEPTH: usize = 16;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (args, cli_sources) = parse_cli_with_sources();
    let settings = resolve_settings(args, &cli_sources)?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (warn)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_level(&settings.args)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?settings, "settings resolved");

    let connection = connect(
        &settings.args.host,
        settings.args.port,
        settings.connect_timeout,
    )
    .await?;
    let peer = connection.peer();
    let (mut feed, mut writer) = connection.into_split();

    let observer = TerminalObserver::new(!settings.args.no_progress);
    let mut controller = SessionController::new(&settings.session, observer);
    controller.on_connected(peer.to_string());

    let (tx, mut requests) = mpsc::channel(REQUEST_QUEUE_DEPTH);
    // Blocking stdin reads stay off the runtime so shutdown never waits on them.
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(error) => {
                    warn!(error = %error, "failed to read request from stdin");
                    break;
                }
            }
        }
    });

    run_session(
        &mut feed,
        &mut writer,
        &mut requests,
        &mut controller,
        settings.session.idle_timeout,
    )
    .await?;

    info!("session finished");
    Ok(())
}
