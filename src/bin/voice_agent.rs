//! Serve the climate functions to a voice runtime speaking newline-delimited
//! JSON events on stdin/stdout.

use std::sync::Arc;
use voice_thermostat::sdk::SdkEvent;
use voice_thermostat::{Agent, Credentials, JsonLinesTransport, ZoneRegistry, climate_tools, config, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    telemetry::init();

    let credentials = Credentials::from_env();
    tracing::debug!(?credentials, "loaded credentials");

    let registry = Arc::new(ZoneRegistry::new());
    let mut session = Agent::builder()
        .tools(climate_tools(&registry))
        .start(JsonLinesTransport::stdio())
        .await?;

    while let Some(event) = session.next_event().await {
        match event {
            SdkEvent::SessionCreated { session_id, room } => {
                tracing::info!(%session_id, room = room.as_deref().unwrap_or("<none>"), "session created");
            }
            SdkEvent::ToolCall { call_id, name, arguments } => {
                tracing::info!(%call_id, %name, %arguments, "function call");
            }
            SdkEvent::ToolOutput { call_id, output, is_error } => {
                tracing::info!(%call_id, %output, is_error, "function output");
            }
            SdkEvent::UserTranscript { transcript, .. } => {
                tracing::info!(%transcript, "user transcript");
            }
            SdkEvent::Error { event_id, message } => {
                tracing::warn!(%event_id, %message, "runtime error");
            }
            SdkEvent::Closed => break,
        }
    }

    tracing::info!(zones = ?registry, "session ended");
    session.close().await;
    Ok(())
}
