use super::{Transport, TransportFuture};
use crate::protocol::client_events::ClientEvent;
use crate::protocol::server_events::ServerEvent;
use crate::{Error, Result};
use tokio::sync::mpsc;

/// Agent half of an in-process runtime link.
pub struct ChannelTransport {
    incoming: mpsc::Receiver<ServerEvent>,
    outgoing: mpsc::Sender<ClientEvent>,
}

/// Runtime half: push [`ServerEvent`]s in, take [`ClientEvent`]s out.
/// Dropping `events` ends the session.
pub struct RuntimeEnd {
    pub events: mpsc::Sender<ServerEvent>,
    pub commands: mpsc::Receiver<ClientEvent>,
}

impl ChannelTransport {
    /// Create a connected pair with room for `capacity` queued messages in
    /// each direction.
    #[must_use]
    pub fn pair(capacity: usize) -> (Self, RuntimeEnd) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (command_tx, command_rx) = mpsc::channel(capacity);
        (
            Self {
                incoming: event_rx,
                outgoing: command_tx,
            },
            RuntimeEnd {
                events: event_tx,
                commands: command_rx,
            },
        )
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, event: ClientEvent) -> TransportFuture<'_, Result<()>> {
        let outgoing = self.outgoing.clone();
        Box::pin(async move {
            outgoing.send(event).await.map_err(|_| Error::ConnectionClosed)?;
            Ok(())
        })
    }

    fn next_event(&mut self) -> TransportFuture<'_, Result<Option<ServerEvent>>> {
        Box::pin(async move { Ok(self.incoming.recv().await) })
    }
}
