//! Links between an agent session and the voice runtime.
//!
//! [`JsonLinesTransport`] speaks newline-delimited JSON over any byte stream
//! (stdin/stdout for the `voice-agent` binary). [`ChannelTransport`] keeps the
//! runtime in-process, which is what embedding applications and tests use.

pub mod channel;
pub mod lines;

use crate::Result;
use crate::protocol::client_events::ClientEvent;
use crate::protocol::server_events::ServerEvent;
use std::future::Future;
use std::pin::Pin;

pub use channel::{ChannelTransport, RuntimeEnd};
pub use lines::JsonLinesTransport;

pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The link to the voice runtime. `next_event` yields `Ok(None)` once the
/// runtime has gone away.
pub trait Transport: Send {
    fn send(&mut self, event: ClientEvent) -> TransportFuture<'_, Result<()>>;
    fn next_event(&mut self) -> TransportFuture<'_, Result<Option<ServerEvent>>>;
}
