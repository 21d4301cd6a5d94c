//! Connection credentials read from the environment.
//!
//! Absent and empty variables are both treated as "not set". Nothing here
//! fails on load; callers that need a value use the `require_*` accessors.

use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use url::Url;

pub const LIVEKIT_URL: &str = "LIVEKIT_URL";
pub const LIVEKIT_API_KEY: &str = "LIVEKIT_API_KEY";
pub const LIVEKIT_API_SECRET: &str = "LIVEKIT_API_SECRET";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Credentials for the hosted media service and the speech/LLM provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub livekit_url: Option<String>,
    pub livekit_api_key: Option<String>,
    pub livekit_api_secret: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            livekit_url: get(LIVEKIT_URL),
            livekit_api_key: get(LIVEKIT_API_KEY),
            livekit_api_secret: get(LIVEKIT_API_SECRET),
            openai_api_key: get(OPENAI_API_KEY),
        }
    }

    /// LiveKit server URL, checked to be a `ws`, `wss`, `http` or `https` URL.
    ///
    /// # Errors
    /// Returns [`Error::MissingCredential`] if unset, [`Error::Url`] if it does
    /// not parse and [`Error::Config`] for any other scheme.
    #[allow(clippy::result_large_err)]
    pub fn require_livekit_url(&self) -> Result<Url> {
        let raw = self
            .livekit_url
            .as_deref()
            .ok_or(Error::MissingCredential(LIVEKIT_URL))?;
        let url = Url::parse(raw)?;
        match url.scheme() {
            "ws" | "wss" | "http" | "https" => Ok(url),
            other => Err(Error::Config(format!("{LIVEKIT_URL} has unsupported scheme `{other}`"))),
        }
    }

    /// # Errors
    /// Returns [`Error::MissingCredential`] if `LIVEKIT_API_KEY` is unset.
    #[allow(clippy::result_large_err)]
    pub fn require_livekit_api_key(&self) -> Result<&str> {
        self.livekit_api_key
            .as_deref()
            .ok_or(Error::MissingCredential(LIVEKIT_API_KEY))
    }

    /// # Errors
    /// Returns [`Error::MissingCredential`] if `LIVEKIT_API_SECRET` is unset.
    #[allow(clippy::result_large_err)]
    pub fn require_livekit_api_secret(&self) -> Result<&str> {
        self.livekit_api_secret
            .as_deref()
            .ok_or(Error::MissingCredential(LIVEKIT_API_SECRET))
    }

    /// # Errors
    /// Returns [`Error::MissingCredential`] if `OPENAI_API_KEY` is unset.
    #[allow(clippy::result_large_err)]
    pub fn require_openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or(Error::MissingCredential(OPENAI_API_KEY))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("livekit_url", &self.livekit_url)
            .field("livekit_api_key", &self.livekit_api_key)
            .field("livekit_api_secret", &self.livekit_api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("openai_api_key", &self.openai_api_key.as_deref().map(mask_prefix))
            .finish()
    }
}

/// Load `.env` from the working directory or a parent, if one exists.
///
/// Variables already set in the environment win over the file. Returns the
/// path that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Some(path)
        }
        Err(err) if err.not_found() => None,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load .env");
            None
        }
    }
}

/// First ten characters of a secret followed by `...`.
#[must_use]
pub fn mask_prefix(secret: &str) -> String {
    let prefix: String = secret.chars().take(10).collect();
    format!("{prefix}...")
}
