use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use thiserror::Error;

const STATE_LEN: usize = 32;

/// Query parameters an OAuth provider sends back to a redirect URI. Either
/// `code` (and usually `state`) on success, or `error` on failure.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("authorization was refused: {error} ({})", .description.as_deref().unwrap_or("no description"))]
    Denied {
        error: String,
        description: Option<String>,
    },

    #[error("state mismatch! someone may be trying something sneaky (got state \"{got}\")")]
    StateMismatch { got: String },

    #[error("callback didn't include an authorization code")]
    MissingCode,

    #[error("couldn't build authorization url: {0}")]
    Url(#[from] url::ParseError),

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token endpoint answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("couldn't parse token response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("spotify token exchange failed: {0}")]
    Exchange(#[from] rspotify::ClientError),

    #[error("token exchange timed out")]
    Timeout,
}

impl AuthError {
    /// Whether the failure was caused by what the browser sent us, as opposed
    /// to the provider or the network.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::Denied { .. } | AuthError::StateMismatch { .. } | AuthError::MissingCode
        )
    }
}

/// Generates an opaque, random OAuth `state` value.
pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_fresh() {
        let a = generate_state();
        let b = generate_state();
        assert_eq!(a.len(), STATE_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn browser_errors_are_client_errors() {
        assert!(AuthError::MissingCode.is_client_error());
        assert!(AuthError::StateMismatch { got: "x".into() }.is_client_error());
        assert!(!AuthError::Timeout.is_client_error());
    }
}
