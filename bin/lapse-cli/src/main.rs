//! lapse – terminal client for `lapse-server`.
//!
//! Runs the four-minute timer locally, has the server glitch what the user
//! types for the current stage, and prints the partner's replies with
//! narration in italics. A failed send is shown as a canned apology.

mod client;
mod render;
#[cfg(test)]
mod testing;
mod turn;

use std::io::{IsTerminal, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use lapse_core::Stage;
use lapse_core::script::{OPENING_LINE, format_clock};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use uuid::Uuid;

use crate::client::ChatClient;

#[derive(Parser)]
#[command(name = "lapse")]
#[command(about = "A four-minute anniversary dinner, in a terminal", long_about = None)]
struct Cli {
    /// Base URL of lapse-server.
    #[arg(long, env = "LAPSE_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Reuse an existing session instead of starting a new one.
    #[arg(long)]
    session_id: Option<String>,

    /// Send messages exactly as typed.
    #[arg(long)]
    no_glitch: bool,

    /// Seconds to wait for each reply.
    #[arg(long, default_value_t = 60)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = ChatClient::new(&cli.server, Duration::from_secs(cli.timeout))?;
    let session_id = cli
        .session_id
        .unwrap_or_else(|| format!("session_{}", Uuid::new_v4().simple()));
    let color = std::io::stdout().is_terminal();
    info!(%session_id, server = %cli.server, "session starting");

    let started = Instant::now();
    let mut shown_stage = Stage::One;
    let mut turns = 0usize;

    println!("{}", render::stage_header(shown_stage, 0, color));
    println!("{}", render::partner_line(OPENING_LINE, color));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let elapsed = started.elapsed().as_secs();
        let (stage, message) = turn::prepare(&client, &line, elapsed, cli.no_glitch).await;
        if stage != shown_stage {
            shown_stage = stage;
            println!();
        }
        println!("{}", render::stage_header(stage, elapsed, color));
        println!("{}", render::user_line(&message));

        let reply = turn::exchange(&client, &session_id, &message, elapsed).await;
        println!("{}", render::partner_line(&reply.content, color));
        turns += 1;
    }

    let elapsed = started.elapsed().as_secs();
    println!();
    println!("Ended at {} after {turns} exchanges.", format_clock(elapsed));
    info!(%session_id, turns, elapsed, "session ended");
    Ok(())
}
