//! LiveKit join tokens for manually connecting to a session room.

use crate::Result;
use crate::config::Credentials;
use livekit_api::access_token::{AccessToken, VideoGrants};
use std::time::Duration;

pub const DEFAULT_ROOM: &str = "my-test-room";
pub const DEFAULT_IDENTITY: &str = "user1";
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTokenRequest {
    pub room: String,
    pub identity: String,
    /// Display name; falls back to `identity`.
    pub name: Option<String>,
    pub ttl: Duration,
}

impl JoinTokenRequest {
    #[must_use]
    pub fn new(room: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            identity: identity.into(),
            name: None,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for JoinTokenRequest {
    fn default() -> Self {
        Self::new(DEFAULT_ROOM, DEFAULT_IDENTITY)
    }
}

/// Sign a room-join token with the LiveKit API key pair.
///
/// # Errors
/// Returns [`crate::Error::MissingCredential`] if the key or secret is unset,
/// and [`crate::Error::Token`] if signing fails.
#[allow(clippy::result_large_err)]
pub fn issue_join_token(credentials: &Credentials, request: &JoinTokenRequest) -> Result<String> {
    let api_key = credentials.require_livekit_api_key()?;
    let api_secret = credentials.require_livekit_api_secret()?;

    let token = AccessToken::with_api_key(api_key, api_secret)
        .with_identity(&request.identity)
        .with_name(request.name.as_deref().unwrap_or(&request.identity))
        .with_grants(VideoGrants {
            room_join: true,
            room: request.room.clone(),
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
            ..Default::default()
        })
        .with_ttl(request.ttl);

    let jwt = token.to_jwt()?;
    tracing::info!(room = %request.room, identity = %request.identity, "issued join token");
    Ok(jwt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn defaults_match_playground_room() {
        let request = JoinTokenRequest::default();
        assert_eq!(request.room, "my-test-room");
        assert_eq!(request.identity, "user1");
        assert_eq!(request.ttl, Duration::from_secs(3600));
    }

    #[test]
    fn missing_secret_is_reported() {
        let credentials = Credentials {
            livekit_api_key: Some("key".to_string()),
            ..Credentials::default()
        };
        let err = issue_join_token(&credentials, &JoinTokenRequest::default()).unwrap_err();
        assert!(matches!(err, Error::MissingCredential("LIVEKIT_API_SECRET")));
    }
}
