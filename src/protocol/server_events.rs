use serde::{Deserialize, Serialize};
use super::models::Session;

/// Events the voice runtime delivers to the agent.
///
/// Unrecognised event types deserialize to [`ServerEvent::Unknown`] so a newer
/// runtime does not break an older agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "session.created")]
    SessionCreated {
        event_id: String,
        session: Session,
    },
    /// The language model finished producing arguments for a function call.
    #[serde(rename = "response.function_call_arguments.done")]
    ResponseFunctionCallArgumentsDone {
        event_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_id: Option<String>,
        call_id: String,
        name: String,
        /// A JSON document in a string, exactly as produced by the model.
        arguments: String,
    },
    /// A finished user utterance, for logging only.
    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    InputTranscriptionCompleted {
        event_id: String,
        item_id: String,
        transcript: String,
    },
    #[serde(rename = "error")]
    Error {
        event_id: String,
        message: String,
    },
    #[serde(rename = "session.closed")]
    SessionClosed {
        event_id: String,
    },
    #[serde(other)]
    Unknown,
}
