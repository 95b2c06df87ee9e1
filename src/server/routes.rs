use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use log::{error, info, warn};

use crate::{
    auth::{AuthError, CallbackParams},
    now_playing::{current_track, QueryError},
    server::ServerState,
    twitch::{self, auth::exchange_code_for_token},
    SinnayBotError,
};

pub(crate) const SPOTIFY_NEEDS_AUTH_HTML: &str = r#"<!DOCTYPE html>
<html>
	<head>
		<title>What's that playing?</title>
	</head>
	<body>
		<h3>Spotify not authenticated</h3>
		<p>You need to <a href='/spotify/login'>authenticate with spotify</a> before requesting this page.</p>
	</body>
</html>"#;

/// Errors a route can answer with. Nothing here stops the server.
#[derive(Debug)]
pub enum RouteError {
    Auth(AuthError),
    Query(QueryError),
    Bot(SinnayBotError),
}

impl From<AuthError> for RouteError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<QueryError> for RouteError {
    fn from(e: QueryError) -> Self {
        Self::Query(e)
    }
}

impl From<SinnayBotError> for RouteError {
    fn from(e: SinnayBotError) -> Self {
        Self::Bot(e)
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        match self {
            RouteError::Auth(e) if e.is_client_error() => {
                warn!("rejected oauth callback: {e}");
                (StatusCode::BAD_REQUEST, e.to_string()).into_response()
            }
            RouteError::Auth(e) => {
                error!("authorization failed: {e}");
                (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
            }
            RouteError::Query(QueryError::Unauthenticated) => {
                (StatusCode::UNAUTHORIZED, Html(SPOTIFY_NEEDS_AUTH_HTML)).into_response()
            }
            RouteError::Query(e) => {
                error!("{e}");
                (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
            }
            RouteError::Bot(e) => {
                error!("couldn't start chat bot: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

pub(crate) async fn twitch_login(
    State(state): State<Arc<ServerState>>,
) -> Result<Response, RouteError> {
    if !state.session.is_authenticated().await {
        return Ok(Html(SPOTIFY_NEEDS_AUTH_HTML).into_response());
    }

    let creds = &state.credentials.twitch;
    let url =
        twitch::auth::build_authorization_url(&creds.client_id, &creds.redirect_uri, &twitch::SCOPE)
            .map_err(AuthError::from)?;

    Ok(Redirect::temporary(url.as_str()).into_response())
}

pub(crate) async fn twitch_callback(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, RouteError> {
    if !state.session.is_authenticated().await {
        return Ok(Html(SPOTIFY_NEEDS_AUTH_HTML).into_response());
    }

    if let Some(error) = params.error {
        return Err(AuthError::Denied {
            error,
            description: params.error_description,
        }
        .into());
    }
    let code = params.code.ok_or(AuthError::MissingCode)?;

    let creds = &state.credentials.twitch;
    let access_token = exchange_code_for_token(
        &state.http,
        &state.twitch_token_url,
        &code,
        &creds.client_id,
        &creds.client_secret,
        &creds.redirect_uri,
    )
    .await?;
    info!("twitch authorized, connecting to chat");

    state.start_chat(access_token).await?;

    Ok("Successfully connected to Twitch chat!".into_response())
}

pub(crate) async fn spotify_login(
    State(state): State<Arc<ServerState>>,
) -> Result<Redirect, RouteError> {
    let url = state.spotify_auth.begin().await?;
    Ok(Redirect::temporary(url.as_str()))
}

pub(crate) async fn spotify_callback(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<CallbackParams>,
) -> Result<&'static str, RouteError> {
    state.spotify_auth.complete(&params, &state.session).await?;
    Ok("Successfully authenticated with Spotify!")
}

pub(crate) async fn spotify_current(
    State(state): State<Arc<ServerState>>,
) -> Result<String, RouteError> {
    let track = current_track(&state.session).await?;

    if track.is_playing {
        Ok(format!("Currently playing on Spotify: {track}"))
    } else {
        Ok("No track currently playing.".to_owned())
    }
}
