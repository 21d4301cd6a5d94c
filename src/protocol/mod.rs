//! Wire types for the callable-function contract between the agent and the
//! voice runtime. Events are JSON objects discriminated by `type`.

pub mod client_events;
pub mod models;
pub mod server_events;
