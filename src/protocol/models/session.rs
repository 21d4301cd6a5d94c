use serde::{Deserialize, Serialize};

use super::{Tool, ToolChoice};

/// Agent configuration pushed to the runtime when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

impl SessionUpdate {
    #[must_use]
    pub fn new(instructions: impl Into<String>, tools: Vec<Tool>) -> Self {
        let tool_choice = if tools.is_empty() { None } else { Some(ToolChoice::default()) };
        Self {
            instructions: Some(instructions.into()),
            tools: Some(tools),
            tool_choice,
        }
    }
}

/// Runtime-side session details reported once the room is joined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}
