use crate::protocol::server_events::ServerEvent;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Session-level events surfaced to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkEvent {
    SessionCreated {
        session_id: String,
        room: Option<String>,
    },
    ToolCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    /// A tool call was answered. `is_error` is set when the output carries an
    /// error message rather than a result.
    ToolOutput {
        call_id: String,
        output: String,
        is_error: bool,
    },
    UserTranscript {
        item_id: String,
        transcript: String,
    },
    Error {
        event_id: String,
        message: String,
    },
    Closed,
}

/// [`Stream`] over a session's events; ends when the session task stops.
pub struct EventStream<'a> {
    rx: &'a mut mpsc::Receiver<SdkEvent>,
}

impl<'a> EventStream<'a> {
    #[must_use]
    pub const fn new(rx: &'a mut mpsc::Receiver<SdkEvent>) -> Self {
        Self { rx }
    }
}

impl Stream for EventStream<'_> {
    type Item = SdkEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl SdkEvent {
    /// Map a runtime event to its SDK counterpart, if it has one.
    #[must_use]
    pub fn from_server(event: ServerEvent) -> Option<Self> {
        match event {
            ServerEvent::SessionCreated { session, .. } => Some(Self::SessionCreated {
                session_id: session.id,
                room: session.room,
            }),
            ServerEvent::ResponseFunctionCallArgumentsDone { call_id, name, arguments, .. } => {
                Some(Self::ToolCall { call_id, name, arguments })
            }
            ServerEvent::InputTranscriptionCompleted { item_id, transcript, .. } => {
                Some(Self::UserTranscript { item_id, transcript })
            }
            ServerEvent::Error { event_id, message } => Some(Self::Error { event_id, message }),
            ServerEvent::SessionClosed { .. } => Some(Self::Closed),
            ServerEvent::Unknown => None,
        }
    }
}
