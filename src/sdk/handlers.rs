use super::{ToolCall, ToolResult};
use crate::Result;
use std::future::Future;
use std::pin::Pin;

pub type HandlerFuture<R> = Pin<Box<dyn Future<Output = Result<R>> + Send + 'static>>;

/// An async callback taking `T` and producing `R`.
pub type Callback<T, R> = Box<dyn Fn(T) -> HandlerFuture<R> + Send + Sync>;

pub type TranscriptHandler = Callback<String, ()>;
pub type ToolCallHandler = Callback<ToolCall, ToolResult>;
pub type RuntimeErrorHandler = Callback<String, ()>;

fn boxed<T, R, F, Fut>(handler: F) -> Callback<T, R>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    Box::new(move |input| -> HandlerFuture<R> { Box::pin(handler(input)) })
}

/// Optional callbacks run by the session loop.
///
/// `on_tool_call` replaces the tool table entirely when set. A failing
/// transcript or error callback is logged and the session keeps running.
#[derive(Default)]
pub struct EventHandlers {
    pub on_transcript: Option<TranscriptHandler>,
    pub on_tool_call: Option<ToolCallHandler>,
    pub on_runtime_error: Option<RuntimeErrorHandler>,
}

impl EventHandlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with each finished transcription of the user's speech.
    #[must_use]
    pub fn on_transcript<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_transcript = Some(boxed(handler));
        self
    }

    #[must_use]
    pub fn on_tool_call<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(ToolCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult>> + Send + 'static,
    {
        self.on_tool_call = Some(boxed(handler));
        self
    }

    /// Called with the message of each `error` event from the runtime.
    #[must_use]
    pub fn on_runtime_error<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_runtime_error = Some(boxed(handler));
        self
    }

    pub(crate) async fn transcript(&self, transcript: String) {
        let Some(handler) = &self.on_transcript else {
            return;
        };
        if let Err(err) = handler(transcript).await {
            tracing::warn!(error = %err, "transcript handler failed");
        }
    }

    pub(crate) async fn runtime_error(&self, message: String) {
        let Some(handler) = &self.on_runtime_error else {
            return;
        };
        if let Err(err) = handler(message).await {
            tracing::warn!(error = %err, "runtime error handler failed");
        }
    }
}
