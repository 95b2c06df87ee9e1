use thiserror::Error;

pub mod auth;
pub mod config;
pub mod handlers;
pub mod now_playing;
pub mod server;
pub mod session;
pub mod spotify;
pub mod twitch;

#[derive(Error, Debug)]
pub enum SinnayBotError {
    #[error("missing environment variable `{0}` :<")]
    MissingEnv(&'static str),

    #[error("error loading config :< {0}, {1}")]
    LoadConfig(String, anyhow::Error),

    #[error("couldn't join twitch channel `{0}` :< {1}")]
    Join(String, String),

    #[error("request failed :< {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("io failure :< {0}")]
    Io(#[from] std::io::Error),
}
