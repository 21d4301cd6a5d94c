pub mod items;
pub mod session;
pub mod tools;

use serde_json::Value;

/// JSON Schema / tool parameter definitions are intentionally untyped.
pub type JsonSchema = Value;

pub use items::Item;
pub use session::{Session, SessionUpdate};
pub use tools::{Tool, ToolChoice, ToolChoiceMode};
