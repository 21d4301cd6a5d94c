//! Show which connection settings the agent will see.

use std::path::Path;
use voice_thermostat::config::{self, Credentials, mask_prefix};

fn main() -> anyhow::Result<()> {
    println!("Attempting to load .env file...");
    let loaded = config::load_dotenv();

    let credentials = Credentials::from_env();
    let show = |value: Option<&str>| value.unwrap_or("None").to_string();

    println!("\nEnvironment Variables:");
    println!("{}: {}", config::LIVEKIT_URL, show(credentials.livekit_url.as_deref()));
    println!("{}: {}", config::LIVEKIT_API_KEY, show(credentials.livekit_api_key.as_deref()));
    println!(
        "{}: {}",
        config::LIVEKIT_API_SECRET,
        credentials
            .livekit_api_secret
            .as_ref()
            .map_or("None", |_| "[Secret masked for security]")
    );
    println!(
        "{}: {}",
        config::OPENAI_API_KEY,
        credentials.openai_api_key.as_deref().map_or_else(|| "None".to_string(), mask_prefix)
    );

    let env_path = loaded.unwrap_or_else(|| Path::new(".env").to_path_buf());
    match std::fs::read_to_string(&env_path) {
        Ok(contents) => {
            println!("\nContent of {}:", env_path.display());
            println!("{contents}");
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            println!("\nNo .env file found at {}", env_path.display());
        }
        Err(err) => return Err(err.into()),
    }

    println!("\nIf the environment variables above don't match the content of the .env file,");
    println!("then there might be an issue with loading the environment variables.");
    Ok(())
}
