#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Smart-home climate control for real-time voice agents.
//!
//! A [`ZoneRegistry`] holds the temperature of each [`Zone`] for one session.
//! [`climate_tools`] exposes it to the voice runtime as the `get_temperature`
//! and `set_temperature` functions, and [`Agent`] runs a session that answers
//! the runtime's function calls over any [`Transport`].

pub mod climate;
pub mod config;
pub mod error;
pub mod protocol;
pub mod sdk;
pub mod telemetry;
pub mod token;
pub mod transport;

pub use climate::{TemperatureReading, Zone, ZoneError, ZoneRegistry};
pub use config::Credentials;
pub use error::{Error, Result};
pub use protocol::client_events::ClientEvent;
pub use protocol::server_events::ServerEvent;
pub use sdk::{
    Agent, AgentBuilder, EventHandlers, SdkEvent, Session, SessionHandle, ToolCall, ToolRegistry, ToolResult,
    ToolSpec, climate_tools,
};
pub use token::{JoinTokenRequest, issue_join_token};
pub use transport::{ChannelTransport, JsonLinesTransport, RuntimeEnd, Transport};
