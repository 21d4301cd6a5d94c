//! Print a LiveKit join token for connecting to the agent's room by hand.

use clap::Parser;
use std::time::Duration;
use voice_thermostat::config::{self, Credentials};
use voice_thermostat::token::{DEFAULT_IDENTITY, DEFAULT_ROOM, JoinTokenRequest, issue_join_token};
use voice_thermostat::telemetry;

#[derive(Debug, Parser)]
#[command(name = "generate-token", about = "Issue a LiveKit room join token")]
struct Args {
    /// Room to join.
    #[arg(long, default_value = DEFAULT_ROOM)]
    room: String,

    /// Participant identity.
    #[arg(long, default_value = DEFAULT_IDENTITY)]
    identity: String,

    /// Display name, defaults to the identity.
    #[arg(long)]
    name: Option<String>,

    /// Token lifetime in seconds.
    #[arg(long, default_value_t = 3600)]
    ttl_secs: u64,
}

fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    telemetry::init();
    let args = Args::parse();

    let credentials = Credentials::from_env();
    let mut request = JoinTokenRequest::new(args.room, args.identity).with_ttl(Duration::from_secs(args.ttl_secs));
    if let Some(name) = args.name {
        request = request.with_name(name);
    }
    let token = issue_join_token(&credentials, &request)?;

    let url = credentials.livekit_url.as_deref().unwrap_or("None");
    println!("\nRoom Name: {}", request.room);
    println!("\nYour LiveKit Token:");
    println!("{token}");
    println!("\nWebSocket URL: {url}");
    println!("\nFor Manual Connection in Playground:");
    println!("1. URL field: {url}");
    println!("2. Token field: (Copy the token above)");
    Ok(())
}
