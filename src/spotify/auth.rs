use std::{sync::Arc, time::Duration};

use log::{info, warn};
use rspotify::Config as SpotifyConfig;
use tokio::sync::Mutex;
use url::Url;

use crate::{
    auth::{generate_state, AuthError, CallbackParams},
    config::SpotifyCredentials,
    session::SessionStore,
    spotify::{client::SpotifyClient, SCOPE},
};

const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";

/// Builds the spotify authorization page url. Makes no requests.
pub fn build_authorization_url(
    client_id: &str,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(AUTHORIZE_URL)?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &scopes.join(" "))
        .append_pair("state", state);

    Ok(url)
}

/// Tracks the spotify authorization flow: which `state` was handed out last
/// and how to turn a callback into an authenticated session.
pub struct SpotifyAuthState {
    credentials: SpotifyCredentials,
    spotify_config: SpotifyConfig,
    timeout: Duration,
    pending_state: Mutex<Option<String>>,
}

impl SpotifyAuthState {
    pub fn new(credentials: SpotifyCredentials, timeout: Duration) -> Self {
        Self {
            credentials,
            spotify_config: SpotifyConfig::default(),
            timeout,
            pending_state: Mutex::new(None),
        }
    }

    /// Points token exchanges and api calls at other hosts than spotify's own.
    pub fn with_base_urls(mut self, auth_base_url: &str, api_base_url: &str) -> Self {
        self.spotify_config.auth_base_url = auth_base_url.to_owned();
        self.spotify_config.api_base_url = api_base_url.to_owned();
        self
    }

    /// Issues a fresh `state` and returns the url to send the browser to.
    /// Any earlier, unfinished login stops being valid.
    pub async fn begin(&self) -> Result<Url, AuthError> {
        let state = generate_state();
        let url = build_authorization_url(
            &self.credentials.client_id,
            &self.credentials.redirect_uri,
            &SCOPE,
            &state,
        )?;

        *self.pending_state.lock().await = Some(state);
        Ok(url)
    }

    /// Consumes the pending state if `got` matches it. A state is good for
    /// one callback only; a wrong one leaves the pending login alone.
    async fn check_state(&self, got: Option<&str>) -> Result<(), AuthError> {
        let mut pending = self.pending_state.lock().await;

        let matches = matches!(
            (pending.as_deref(), got),
            (Some(expected), Some(got)) if expected == got
        );
        if !matches {
            return Err(AuthError::StateMismatch {
                got: got.unwrap_or_default().to_owned(),
            });
        }

        pending.take();
        Ok(())
    }

    /// Finishes the flow and installs the new client into `session`.
    pub async fn complete(
        &self,
        params: &CallbackParams,
        session: &SessionStore,
    ) -> Result<(), AuthError> {
        self.check_state(params.state.as_deref()).await?;

        if let Some(error) = &params.error {
            warn!("spotify refused authorization: {error}");
            return Err(AuthError::Denied {
                error: error.clone(),
                description: params.error_description.clone(),
            });
        }

        let code = params.code.as_deref().ok_or(AuthError::MissingCode)?;
        let client = SpotifyClient::authorize(
            &self.credentials,
            self.spotify_config.clone(),
            code,
            self.timeout,
        )
        .await?;

        session.set(Arc::new(client)).await;
        info!("spotify session is authenticated");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::client::test_support::TOKEN_JSON;

    fn auth_state() -> SpotifyAuthState {
        SpotifyAuthState::new(
            SpotifyCredentials {
                client_id: "spotify-id".to_owned(),
                client_secret: "spotify-secret".to_owned(),
                redirect_uri: "http://localhost:8080/spotify/callback".to_owned(),
            },
            Duration::from_secs(1),
        )
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn url_carries_client_id_and_escaped_redirect() {
        let redirect = "http://localhost:8080/cb?a=1&b=two:three";
        let url = build_authorization_url("my-id", redirect, &SCOPE, "xyz").unwrap();

        assert_eq!(url.host_str(), Some("accounts.spotify.com"));
        assert_eq!(query_value(&url, "client_id").as_deref(), Some("my-id"));
        assert_eq!(query_value(&url, "redirect_uri").as_deref(), Some(redirect));
        assert_eq!(
            query_value(&url, "scope").as_deref(),
            Some("user-read-currently-playing")
        );
        assert_eq!(query_value(&url, "state").as_deref(), Some("xyz"));
        assert!(!url.as_str().contains("&b=two"));
    }

    #[tokio::test]
    async fn begin_issues_a_new_state_each_time() {
        let auth = auth_state();
        let first = query_value(&auth.begin().await.unwrap(), "state").unwrap();
        let second = query_value(&auth.begin().await.unwrap(), "state").unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn mismatched_state_is_rejected() {
        let auth = auth_state();
        let session = SessionStore::new();
        auth.begin().await.unwrap();

        let params = CallbackParams {
            code: Some("code".to_owned()),
            state: Some("forged".to_owned()),
            ..Default::default()
        };
        let err = auth.complete(&params, &session).await.unwrap_err();

        assert!(matches!(err, AuthError::StateMismatch { ref got } if got == "forged"));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn forged_callback_leaves_real_login_pending() {
        let auth = auth_state();
        let session = SessionStore::new();
        let state = query_value(&auth.begin().await.unwrap(), "state");

        let forged = CallbackParams {
            code: Some("code".to_owned()),
            state: Some("forged".to_owned()),
            ..Default::default()
        };
        let err = auth.complete(&forged, &session).await.unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch { .. }));

        // the real callback still gets past the state check
        let real = CallbackParams {
            state,
            ..Default::default()
        };
        let err = auth.complete(&real, &session).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCode));
    }

    #[tokio::test]
    async fn callback_without_login_is_rejected() {
        let auth = auth_state();
        let session = SessionStore::new();

        let params = CallbackParams {
            code: Some("code".to_owned()),
            state: Some("anything".to_owned()),
            ..Default::default()
        };
        let err = auth.complete(&params, &session).await.unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch { .. }));
    }

    #[tokio::test]
    async fn state_is_single_use() {
        let auth = auth_state();
        let session = SessionStore::new();
        let state = query_value(&auth.begin().await.unwrap(), "state");

        // first callback is a refusal, which still spends the state
        let denied = CallbackParams {
            state: state.clone(),
            error: Some("access_denied".to_owned()),
            ..Default::default()
        };
        let err = auth.complete(&denied, &session).await.unwrap_err();
        assert!(matches!(err, AuthError::Denied { ref error, .. } if error == "access_denied"));

        let replayed = CallbackParams {
            code: Some("code".to_owned()),
            state,
            ..Default::default()
        };
        let err = auth.complete(&replayed, &session).await.unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch { .. }));
    }

    #[tokio::test]
    async fn missing_code_is_rejected() {
        let auth = auth_state();
        let session = SessionStore::new();
        let state = query_value(&auth.begin().await.unwrap(), "state");

        let params = CallbackParams {
            state,
            ..Default::default()
        };
        let err = auth.complete(&params, &session).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCode));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn code_exchange_installs_the_session() {
        let mut server = mockito::Server::new_async().await;
        let token = server
            .mock("POST", "/api/token")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("code".into(), "the-code".into()),
                mockito::Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TOKEN_JSON)
            .create_async()
            .await;

        let auth = auth_state().with_base_urls(&server.url(), &format!("{}/v1/", server.url()));
        let session = SessionStore::new();
        let state = query_value(&auth.begin().await.unwrap(), "state");

        let params = CallbackParams {
            code: Some("the-code".to_owned()),
            state,
            ..Default::default()
        };
        auth.complete(&params, &session).await.unwrap();

        token.assert_async().await;
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn failed_code_exchange_leaves_session_empty() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/api/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#)
            .create_async()
            .await;

        let auth = auth_state().with_base_urls(&server.url(), &format!("{}/v1/", server.url()));
        let session = SessionStore::new();
        let state = query_value(&auth.begin().await.unwrap(), "state");

        let params = CallbackParams {
            code: Some("expired".to_owned()),
            state,
            ..Default::default()
        };
        let err = auth.complete(&params, &session).await.unwrap_err();

        assert!(matches!(err, AuthError::Exchange(_)));
        assert!(!session.is_authenticated().await);
    }
}
