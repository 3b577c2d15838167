//! Deckhand table simulator.
//!
//! # Usage
//!
//! ```bash
//! # Deal five cards each from seed 7
//! deckhand-sim --seed 7
//!
//! # Full-size keys, watch every accepted action
//! RUST_LOG=debug deckhand-sim --prime-bytes 128 --key-bytes 128
//! ```

use clap::Parser;
use deckhand_harness::{SimConfig, play};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Two-player mental poker table
#[derive(Parser, Debug)]
#[command(name = "deckhand-sim")]
#[command(about = "Shuffle and deal a standard deck between two simulated players")]
#[command(version)]
struct Args {
    /// Seed for every random draw
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Shared prime size in bytes
    #[arg(long, default_value = "32")]
    prime_bytes: usize,

    /// SRA exponent size in bytes
    #[arg(long, default_value = "32")]
    key_bytes: usize,

    /// Cards dealt to each player (both hands come from one 52-card deck)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u16).range(0..=26))]
    hand_size: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = SimConfig {
        seed: args.seed,
        prime_bytes: args.prime_bytes,
        key_bytes: args.key_bytes,
        hand_size: usize::from(args.hand_size),
    };
    config.validate()?;

    let outcome = play(&config).await?;

    for player in &outcome.players {
        tracing::info!(client_id = %player.client_id, hand = ?player.hand, "final hand");
    }
    tracing::info!(entries = outcome.log.len(), "log closed");

    Ok(())
}
