//! Bot Runner
//!
//! Starts every bot listed in a `zulip-bots.toml` and keeps them running until
//! Ctrl+C. Besides the built-in `echo-bot` this binary registers `ping-bot`,
//! which answers every mention with "pong".
//!
//! # Usage
//!
//! ```bash
//! cargo run --package bot-runner -- --config demos/bot_runner/zulip-bots.toml
//! cargo run --package bot-runner -- --list
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use tracing::info;
use zulip::bots::{Bot, BotOptions, BotResult, BoxedBot, bot_names, find_bot};
use zulip::prelude::{BotRuntime, Message};

#[derive(Parser, Debug)]
#[command(name = "bot-runner", about = "Run Zulip bots from a configuration file")]
struct Args {
    /// Configuration file. Searched for as zulip-bots.toml when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. development or production.
    #[arg(short, long)]
    profile: Option<String>,

    /// Print the registered bots and exit.
    #[arg(long)]
    list: bool,
}

struct PingBot;

#[async_trait]
impl Bot for PingBot {
    async fn handle_message(&self, _message: &Message, _content: &str) -> BotResult<String> {
        Ok("pong".to_string())
    }
}

fn build_ping(_options: &BotOptions) -> BotResult<BoxedBot> {
    Ok(Arc::new(PingBot))
}

zulip::register_bot!(PING_BOT, "ping-bot", "Answers every mention with pong.", build_ping);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        for name in bot_names() {
            let description = find_bot(name).map_or("", |d| d.description);
            println!("{name:<16} {description}");
        }
        return Ok(());
    }

    let mut builder = BotRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }

    let runtime = builder.build()?;
    info!(bots = ?bot_names(), "Available bots");
    runtime.run().await?;
    Ok(())
}
