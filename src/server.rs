use std::sync::Arc;

use axum::{routing::get, Router};
use log::info;
use tokio::{net::TcpListener, sync::Mutex, task::JoinHandle};

use crate::{
    config::{Config, Credentials},
    handlers::song::SongHandler,
    session::SessionStore,
    spotify::auth::SpotifyAuthState,
    twitch::{auth::TOKEN_URL, bot::TwitchBot},
    SinnayBotError,
};

pub mod routes;

/// Everything the routes share.
pub struct ServerState {
    pub config: Config,
    pub credentials: Credentials,
    pub http: reqwest::Client,
    pub session: Arc<SessionStore>,
    pub spotify_auth: SpotifyAuthState,
    pub twitch_token_url: String,
    chat_task: Mutex<Option<JoinHandle<()>>>,
}

impl ServerState {
    pub fn new(config: Config, credentials: Credentials) -> Result<Self, SinnayBotError> {
        config
            .validate()
            .map_err(|e| SinnayBotError::LoadConfig("invalid settings".to_owned(), e))?;

        let timeout = config.http.timeout();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let spotify_auth = SpotifyAuthState::new(credentials.spotify.clone(), timeout);

        Ok(Self {
            config,
            credentials,
            http,
            session: Arc::new(SessionStore::new()),
            spotify_auth,
            twitch_token_url: TOKEN_URL.to_owned(),
            chat_task: Mutex::new(None),
        })
    }

    /// Connects the chat bot with a fresh access token. A previously running
    /// connection is dropped so only one bot is ever in chat.
    pub async fn start_chat(&self, access_token: String) -> Result<(), SinnayBotError> {
        let bot = TwitchBot::new(vec![Box::new(SongHandler::new(
            &self.config.chat.trigger,
            self.session.clone(),
        ))]);

        let twitch = &self.credentials.twitch;
        let handle = bot.start(
            twitch.bot_username.clone(),
            access_token,
            twitch.broadcast_channel.to_lowercase(),
        )?;

        if let Some(previous) = self.chat_task.lock().await.replace(handle) {
            info!("replacing previous twitch chat connection");
            previous.abort();
        }

        Ok(())
    }
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/twitch/login", get(routes::twitch_login))
        .route("/twitch/callback", get(routes::twitch_callback))
        .route("/spotify/login", get(routes::spotify_login))
        .route("/spotify/callback", get(routes::spotify_callback))
        .route("/spotify/current", get(routes::spotify_current))
        .with_state(state)
}

/// AuthServer is a server that handles authorization with spotify and twitch, and
/// reports what's playing.
pub struct AuthServer {
    state: Arc<ServerState>,
}

impl AuthServer {
    pub fn new(config: Config, credentials: Credentials) -> Result<Self, SinnayBotError> {
        Ok(Self {
            state: Arc::new(ServerState::new(config, credentials)?),
        })
    }

    /// This function does not block when awaited. It returns a JoinHandle that can be awaited
    /// to wait for the server to stop.
    pub async fn launch(
        &self,
        address: &str,
    ) -> Result<JoinHandle<Result<(), std::io::Error>>, SinnayBotError> {
        let listener = TcpListener::bind(address).await?;
        info!("listening on http://{}", listener.local_addr()?);
        info!("authorize spotify first at /spotify/login, then twitch at /twitch/login");

        let router = build_router(self.state.clone());
        Ok(tokio::task::spawn(async move {
            axum::serve(listener, router).await
        }))
    }
}
