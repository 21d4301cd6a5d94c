use crate::Result;
use crate::protocol::models::SessionUpdate;

use super::session::Session;
use crate::transport::Transport;
use super::{EventHandlers, ToolRegistry};

pub const DEFAULT_INSTRUCTIONS: &str = "You are a voice assistant created by LiveKit. Your interface with users will be voice. \
You should use short and concise responses, and avoiding usage of unpronouncable punctuation.";

pub const DEFAULT_GREETING: &str = "Hey, how can I help you today!";

pub struct Agent;

impl Agent {
    #[must_use]
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }
}

pub struct AgentBuilder {
    instructions: String,
    greeting: Option<String>,
    handlers: EventHandlers,
    tools: ToolRegistry,
    auto_tool_response: bool,
}

impl AgentBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            handlers: EventHandlers::new(),
            tools: ToolRegistry::new(),
            auto_tool_response: true,
        }
    }

    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    #[must_use]
    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    #[must_use]
    pub fn no_greeting(mut self) -> Self {
        self.greeting = None;
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn handlers(mut self, handlers: EventHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Whether to ask the runtime for a new response after each tool output.
    #[must_use]
    pub const fn auto_tool_response(mut self, enabled: bool) -> Self {
        self.auto_tool_response = enabled;
        self
    }

    #[allow(clippy::result_large_err)]
    fn build(self) -> Result<SessionConfigSnapshot> {
        let update = SessionUpdate::new(self.instructions, self.tools.try_as_tools()?);
        Ok(SessionConfigSnapshot {
            update,
            greeting: self.greeting,
            handlers: self.handlers,
            tools: self.tools,
            auto_tool_response: self.auto_tool_response,
        })
    }

    /// Start a session over `transport`: push the configuration, speak the
    /// greeting, then serve function calls until the runtime disconnects.
    ///
    /// # Errors
    /// Returns an error if tool schemas cannot be serialized or the initial
    /// sends fail.
    pub async fn start(self, transport: impl Transport + 'static) -> Result<Session> {
        self.build()?.start(Box::new(transport)).await
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct SessionConfigSnapshot {
    update: SessionUpdate,
    greeting: Option<String>,
    handlers: EventHandlers,
    tools: ToolRegistry,
    auto_tool_response: bool,
}

impl SessionConfigSnapshot {
    async fn start(self, transport: Box<dyn Transport>) -> Result<Session> {
        let session = Session::from_transport(transport, self.handlers, self.tools, self.auto_tool_response);
        session.update_session(self.update).await?;
        if let Some(greeting) = self.greeting {
            session.say(&greeting, true).await?;
        }
        tracing::info!("agent session started");
        Ok(session)
    }
}
