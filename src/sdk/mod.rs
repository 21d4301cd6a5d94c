//! Agent-side SDK: the callable-function table and the session loop that
//! serves it to a voice runtime.

mod builder;
mod climate;
pub mod events;
mod handlers;
mod session;
mod tools;

pub use builder::{Agent, AgentBuilder, DEFAULT_GREETING, DEFAULT_INSTRUCTIONS};
pub use climate::{GetTemperature, GetTemperatureArgs, SetTemperature, SetTemperatureArgs, climate_tools};
pub use events::{EventStream, SdkEvent};
pub use handlers::{Callback, EventHandlers, HandlerFuture, RuntimeErrorHandler, ToolCallHandler, TranscriptHandler};
pub use session::{Session, SessionHandle};
pub use tools::{
    BoxFuture as ToolFuture, ToolCall, ToolDefinition, ToolRegistry, ToolResult, ToolSpec, decode_arguments,
};
