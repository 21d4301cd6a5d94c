use crate::protocol::client_events::ClientEvent;
use crate::protocol::models::{Item, SessionUpdate};
use crate::protocol::server_events::ServerEvent;
use crate::{Error, Result};

use super::events::{EventStream, SdkEvent};
use super::handlers::EventHandlers;
use super::tools::{ToolCall, ToolRegistry, ToolResult};
use crate::transport::Transport;
use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Cloneable command channel into a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Command>,
}

/// A live agent session.
///
/// A background task owns the transport and the tool table. It answers every
/// function call from the runtime with a `function_call_output` item and
/// forwards [`SdkEvent`]s to this value.
pub struct Session {
    sender: mpsc::Sender<Command>,
    event_rx: mpsc::Receiver<SdkEvent>,
    task: JoinHandle<()>,
}

impl Session {
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            sender: self.sender.clone(),
        }
    }

    /// Await the next SDK event. `None` once the session task has stopped.
    ///
    /// Events are informational: the session keeps serving function calls
    /// when nobody reads them, and drops events that do not fit the buffer.
    pub async fn next_event(&mut self) -> Option<SdkEvent> {
        self.event_rx.recv().await
    }

    /// Stream SDK events.
    #[must_use]
    pub fn events(&mut self) -> EventStream<'_> {
        EventStream::new(&mut self.event_rx)
    }

    /// Ask the runtime to speak `text`.
    ///
    /// # Errors
    /// Returns an error if the session is closed or the send fails.
    pub async fn say(&self, text: &str, allow_interruptions: bool) -> Result<()> {
        self.handle().say(text, allow_interruptions).await
    }

    /// Push instructions and tool definitions to the runtime.
    ///
    /// # Errors
    /// Returns an error if the session is closed or the send fails.
    pub async fn update_session(&self, update: SessionUpdate) -> Result<()> {
        self.send_raw(ClientEvent::SessionUpdate {
            event_id: None,
            session: Box::new(update),
        })
        .await
    }

    /// Dispatch a tool call through the session's tool table.
    ///
    /// # Errors
    /// Returns an error if the tool is missing or execution fails.
    pub async fn run_tool(&self, call: ToolCall) -> Result<ToolResult> {
        self.handle().run_tool(call).await
    }

    /// Send a raw protocol event.
    ///
    /// # Errors
    /// Returns an error if the session is closed or the send fails.
    pub async fn send_raw(&self, event: ClientEvent) -> Result<()> {
        self.handle().send_raw(event).await
    }

    /// Stop the session task and wait for it to finish.
    pub async fn close(self) {
        let Self { sender, event_rx, task } = self;
        // Undrained events must not hold the task open.
        drop(event_rx);
        if sender.send(Command::Close).await.is_err() {
            tracing::debug!("session task already stopped");
        }
        if let Err(err) = task.await {
            tracing::warn!(error = %err, "session task ended abnormally");
        }
    }

    /// Wait until the runtime ends the session.
    pub async fn closed(mut self) {
        while self.event_rx.recv().await.is_some() {}
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "session task ended abnormally");
        }
    }

    pub(crate) fn from_transport(
        mut transport: Box<dyn Transport>,
        handlers: EventHandlers,
        tools: ToolRegistry,
        auto_tool_response: bool,
    ) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(64);
        let (event_tx, event_rx) = mpsc::channel::<SdkEvent>(128);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        match cmd {
                            Some(Command::SendWithResponse { event, respond }) => {
                                tracing::debug!(kind = event.kind(), "sending client event");
                                let result = transport.send(event).await;
                                let _ = respond.send(result);
                            }
                            Some(Command::RunTool { call, respond }) => {
                                let result = tools.dispatch(call).await;
                                let _ = respond.send(result);
                            }
                            Some(Command::Close) | None => break,
                        }
                    }
                    event = transport.next_event() => {
                        match event {
                            Ok(Some(ServerEvent::SessionClosed { .. })) => {
                                tracing::info!("runtime closed the session");
                                break;
                            }
                            Ok(Some(evt)) => {
                                let ctx = EventContext {
                                    handlers: &handlers,
                                    tools: &tools,
                                    event_tx: &event_tx,
                                    auto_tool_response,
                                };
                                handle_server_event(evt, &ctx, &mut transport).await;
                            }
                            Ok(None) => {
                                tracing::info!("runtime transport reached end of stream");
                                break;
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "runtime transport failed");
                                break;
                            }
                        }
                    }
                }
            }
            publish(&event_tx, SdkEvent::Closed);
        });

        Self {
            sender: cmd_tx,
            event_rx,
            task,
        }
    }
}

impl SessionHandle {
    /// Ask the runtime to speak `text`.
    ///
    /// # Errors
    /// Returns an error if the session is closed or the send fails.
    pub async fn say(&self, text: &str, allow_interruptions: bool) -> Result<()> {
        self.send_raw(ClientEvent::AgentSay {
            event_id: None,
            text: text.to_string(),
            allow_interruptions,
        })
        .await
    }

    /// Dispatch a tool call to the registry.
    ///
    /// # Errors
    /// Returns an error if the tool is missing or execution fails.
    pub async fn run_tool(&self, call: ToolCall) -> Result<ToolResult> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::RunTool { call, respond: tx })
            .await
            .map_err(|_| Error::ConnectionClosed)?;
        rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Ask the session task to stop. The owning [`Session`] then sees
    /// [`SdkEvent::Closed`].
    ///
    /// # Errors
    /// Returns [`Error::ConnectionClosed`] if the session already stopped.
    pub async fn close(&self) -> Result<()> {
        self.sender.send(Command::Close).await.map_err(|_| Error::ConnectionClosed)
    }

    /// Send a raw protocol event.
    ///
    /// # Errors
    /// Returns an error if the session is closed or the send fails.
    pub async fn send_raw(&self, event: ClientEvent) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::SendWithResponse { event, respond: tx })
            .await
            .map_err(|_| Error::ConnectionClosed)?;
        rx.await.map_err(|_| Error::ConnectionClosed)??;
        Ok(())
    }
}

enum Command {
    SendWithResponse { event: ClientEvent, respond: oneshot::Sender<Result<()>> },
    RunTool { call: ToolCall, respond: oneshot::Sender<Result<ToolResult>> },
    Close,
}

struct EventContext<'a> {
    handlers: &'a EventHandlers,
    tools: &'a ToolRegistry,
    event_tx: &'a mpsc::Sender<SdkEvent>,
    auto_tool_response: bool,
}

async fn handle_server_event(
    evt: ServerEvent,
    ctx: &EventContext<'_>,
    transport: &mut Box<dyn Transport>,
) {
    if let Some(mapped) = SdkEvent::from_server(evt.clone()) {
        publish(ctx.event_tx, mapped);
    }

    match evt {
        ServerEvent::ResponseFunctionCallArgumentsDone { call_id, name, arguments, .. } => {
            let arguments = serde_json::from_str(&arguments).unwrap_or(Value::String(arguments));
            let call = ToolCall {
                name,
                call_id: call_id.clone(),
                arguments,
            };
            answer_tool_call(call, ctx, transport).await;
        }
        ServerEvent::InputTranscriptionCompleted { transcript, .. } => {
            tracing::debug!(%transcript, "user said");
            ctx.handlers.transcript(transcript).await;
        }
        ServerEvent::Error { message, .. } => {
            tracing::warn!(%message, "runtime reported an error");
            ctx.handlers.runtime_error(message).await;
        }
        _ => {}
    }
}

async fn answer_tool_call(call: ToolCall, ctx: &EventContext<'_>, transport: &mut Box<dyn Transport>) {
    let call_id = call.call_id.clone();
    let result = if let Some(handler) = &ctx.handlers.on_tool_call {
        handler(call).await
    } else {
        ctx.tools.dispatch(call).await
    };

    // Errors go back to the runtime as output so the model can correct the user.
    let (output, is_error) = match result {
        Ok(tool_result) => (tool_result.output_text(), false),
        Err(err) => (serde_json::json!({ "error": err.to_string() }).to_string(), true),
    };

    let event = ClientEvent::ConversationItemCreate {
        event_id: None,
        previous_item_id: None,
        item: Box::new(Item::function_output(call_id.clone(), output.clone())),
    };
    if let Err(err) = transport.send(event).await {
        tracing::warn!(call_id = %call_id, error = %err, "failed to send tool output");
        return;
    }
    if ctx.auto_tool_response {
        let follow_up = ClientEvent::ResponseCreate { event_id: None };
        if let Err(err) = transport.send(follow_up).await {
            tracing::warn!(call_id = %call_id, error = %err, "failed to request follow-up response");
        }
    }

    publish(ctx.event_tx, SdkEvent::ToolOutput { call_id, output, is_error });
}

fn publish(event_tx: &mpsc::Sender<SdkEvent>, event: SdkEvent) {
    match event_tx.try_send(event) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(event)) => {
            tracing::debug!(?event, "session event buffer full, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::ZoneRegistry;
    use crate::protocol::models::Session as RuntimeSession;
    use crate::sdk::climate_tools;
    use std::sync::Arc;
    use crate::transport::{ChannelTransport, RuntimeEnd};
    use std::time::Duration;

    fn function_call(call_id: &str, name: &str, arguments: &str) -> ServerEvent {
        ServerEvent::ResponseFunctionCallArgumentsDone {
            event_id: format!("evt_{call_id}"),
            response_id: Some("resp_1".to_string()),
            item_id: Some("item_1".to_string()),
            call_id: call_id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    async fn recv(out_rx: &mut mpsc::Receiver<ClientEvent>) -> ClientEvent {
        tokio::time::timeout(Duration::from_secs(1), out_rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    fn expect_output(event: ClientEvent) -> (String, String) {
        match event {
            ClientEvent::ConversationItemCreate { item, .. } => {
                let Item::FunctionCallOutput { call_id, output, .. } = *item;
                (call_id, output)
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn tool_call_sends_output() {
        let (transport, RuntimeEnd { events: event_tx, commands: mut out_rx }) = ChannelTransport::pair(8);
        let transport = Box::new(transport);

        let registry = Arc::new(ZoneRegistry::new());
        let session = Session::from_transport(transport, EventHandlers::new(), climate_tools(&registry), true);

        event_tx
            .send(function_call("call_1", "get_temperature", r#"{"zone":"kitchen"}"#))
            .await
            .unwrap();

        let (call_id, output) = expect_output(recv(&mut out_rx).await);
        assert_eq!(call_id, "call_1");
        assert_eq!(output, "The temperature in the kitchen is 24C");

        let follow_up = recv(&mut out_rx).await;
        assert!(matches!(follow_up, ClientEvent::ResponseCreate { .. }));

        session.close().await;
    }

    #[tokio::test]
    async fn invalid_zone_is_returned_as_error_output() {
        let (transport, RuntimeEnd { events: event_tx, commands: mut out_rx }) = ChannelTransport::pair(8);
        let transport = Box::new(transport);

        let registry = Arc::new(ZoneRegistry::new());
        let mut session =
            Session::from_transport(transport, EventHandlers::new(), climate_tools(&registry), false);

        event_tx
            .send(function_call("call_9", "set_temperature", r#"{"zone":"garage","temp":30}"#))
            .await
            .unwrap();

        let (call_id, output) = expect_output(recv(&mut out_rx).await);
        assert_eq!(call_id, "call_9");
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("garage"));

        // No follow-up response without auto_tool_response.
        assert!(
            tokio::time::timeout(Duration::from_millis(50), out_rx.recv())
                .await
                .is_err()
        );

        let mut saw_error_output = false;
        while let Ok(Some(evt)) = tokio::time::timeout(Duration::from_millis(200), session.next_event()).await {
            if let SdkEvent::ToolOutput { is_error: true, .. } = evt {
                saw_error_output = true;
                break;
            }
        }
        assert!(saw_error_output);
        assert_eq!(registry.read(crate::climate::Zone::Office).celsius, 21);

        session.close().await;
    }

    #[tokio::test]
    async fn custom_tool_handler_overrides_table() {
        let (transport, RuntimeEnd { events: event_tx, commands: mut out_rx }) = ChannelTransport::pair(8);
        let transport = Box::new(transport);

        let handlers = EventHandlers::new().on_tool_call(|call: ToolCall| async move {
            Ok(ToolResult {
                call_id: call.call_id,
                output: Value::String("handled".to_string()),
            })
        });
        let session = Session::from_transport(transport, handlers, ToolRegistry::new(), false);

        event_tx.send(function_call("call_2", "anything", "{}")).await.unwrap();

        let (_, output) = expect_output(recv(&mut out_rx).await);
        assert_eq!(output, "handled");

        session.close().await;
    }

    #[tokio::test]
    async fn transcript_and_error_callbacks_run() {
        let (transport, RuntimeEnd { events: event_tx, commands: _out_rx }) = ChannelTransport::pair(8);
        let transport = Box::new(transport);
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel::<String>();
        let errors_tx = seen_tx.clone();

        let handlers = EventHandlers::new()
            .on_transcript(move |text: String| {
                let seen_tx = seen_tx.clone();
                async move {
                    let _ = seen_tx.send(format!("heard: {text}"));
                    Err(Error::Config("handler failure is only logged".to_string()))
                }
            })
            .on_runtime_error(move |message: String| {
                let errors_tx = errors_tx.clone();
                async move {
                    let _ = errors_tx.send(format!("error: {message}"));
                    Ok(())
                }
            });
        let session = Session::from_transport(transport, handlers, ToolRegistry::new(), true);

        event_tx
            .send(ServerEvent::InputTranscriptionCompleted {
                event_id: "evt_1".to_string(),
                item_id: "item_1".to_string(),
                transcript: "make the office warmer".to_string(),
            })
            .await
            .unwrap();
        event_tx
            .send(ServerEvent::Error { event_id: "evt_2".to_string(), message: "rate limited".to_string() })
            .await
            .unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), seen_rx.recv()).await.unwrap();
        assert_eq!(first.as_deref(), Some("heard: make the office warmer"));
        let second = tokio::time::timeout(Duration::from_secs(1), seen_rx.recv()).await.unwrap();
        assert_eq!(second.as_deref(), Some("error: rate limited"));

        session.close().await;
    }

    #[tokio::test]
    async fn run_tool_uses_session_table() {
        let (transport, RuntimeEnd { events: _event_tx, commands: _out_rx }) = ChannelTransport::pair(8);
        let transport = Box::new(transport);

        let registry = Arc::new(ZoneRegistry::new());
        let session = Session::from_transport(transport, EventHandlers::new(), climate_tools(&registry), true);

        let result = session
            .run_tool(ToolCall {
                name: "set_temperature".to_string(),
                call_id: "local".to_string(),
                arguments: serde_json::json!({ "zone": "bedroom", "temp": 18 }),
            })
            .await
            .unwrap();
        assert_eq!(result.output_text(), "The temperature in the bedroom is now 18C");
        assert_eq!(registry.read(crate::climate::Zone::Bedroom).celsius, 18);

        session.close().await;
    }

    #[tokio::test]
    async fn handle_close_stops_session() {
        let (transport, RuntimeEnd { events: _event_tx, commands: _out_rx }) = ChannelTransport::pair(8);
        let mut session = Session::from_transport(Box::new(transport), EventHandlers::new(), ToolRegistry::new(), true);
        let handle = session.handle();

        handle.close().await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(1), session.next_event()).await.unwrap();
        assert_eq!(event, Some(SdkEvent::Closed));
        tokio::time::timeout(Duration::from_secs(1), session.closed()).await.unwrap();

        assert!(matches!(handle.say("hello", true).await, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn unread_events_do_not_stall_tool_calls() {
        let (transport, RuntimeEnd { events: event_tx, commands: mut out_rx }) = ChannelTransport::pair(16);
        let registry = Arc::new(ZoneRegistry::new());
        // Nothing reads this session's events.
        let session = Session::from_transport(Box::new(transport), EventHandlers::new(), climate_tools(&registry), false);

        let calls = 100;
        let feeder = tokio::spawn(async move {
            for n in 0..calls {
                let call_id = format!("call_{n}");
                event_tx
                    .send(function_call(&call_id, "get_temperature", r#"{"zone":"bathroom"}"#))
                    .await
                    .unwrap();
            }
            event_tx
        });

        for n in 0..calls {
            let (call_id, output) = expect_output(recv(&mut out_rx).await);
            assert_eq!(call_id, format!("call_{n}"));
            assert_eq!(output, "The temperature in the bathroom is 23C");
        }

        let _event_tx = feeder.await.unwrap();
        session.close().await;
    }

    #[tokio::test]
    async fn events_can_be_read_as_a_stream() {
        use futures::StreamExt;

        let (transport, RuntimeEnd { events: event_tx, commands: _out_rx }) = ChannelTransport::pair(8);
        let mut session = Session::from_transport(Box::new(transport), EventHandlers::new(), ToolRegistry::new(), true);

        event_tx
            .send(ServerEvent::InputTranscriptionCompleted {
                event_id: "evt_1".to_string(),
                item_id: "item_1".to_string(),
                transcript: "is it warm in the office".to_string(),
            })
            .await
            .unwrap();
        event_tx
            .send(ServerEvent::SessionClosed { event_id: "evt_2".to_string() })
            .await
            .unwrap();

        let mut events = session.events();
        let first = tokio::time::timeout(Duration::from_secs(1), events.next()).await.unwrap();
        assert_eq!(
            first,
            Some(SdkEvent::UserTranscript {
                item_id: "item_1".to_string(),
                transcript: "is it warm in the office".to_string(),
            })
        );
        let second = tokio::time::timeout(Duration::from_secs(1), events.next()).await.unwrap();
        assert_eq!(second, Some(SdkEvent::Closed));
        let end = tokio::time::timeout(Duration::from_secs(1), events.next()).await.unwrap();
        assert_eq!(end, None);
    }

    #[tokio::test]
    async fn session_closed_event_ends_loop() {
        let (transport, RuntimeEnd { events: event_tx, commands: _out_rx }) = ChannelTransport::pair(8);
        let transport = Box::new(transport);

        let mut session = Session::from_transport(transport, EventHandlers::new(), ToolRegistry::new(), true);

        event_tx
            .send(ServerEvent::SessionCreated {
                event_id: "evt_0".to_string(),
                session: RuntimeSession { id: "sess_1".to_string(), room: Some("my-test-room".to_string()) },
            })
            .await
            .unwrap();
        event_tx
            .send(ServerEvent::SessionClosed { event_id: "evt_1".to_string() })
            .await
            .unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), session.next_event()).await.unwrap();
        assert!(matches!(first, Some(SdkEvent::SessionCreated { ref session_id, .. }) if session_id == "sess_1"));
        let second = tokio::time::timeout(Duration::from_secs(1), session.next_event()).await.unwrap();
        assert_eq!(second, Some(SdkEvent::Closed));

        tokio::time::timeout(Duration::from_secs(1), session.closed()).await.unwrap();
    }
}
