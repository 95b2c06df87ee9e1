use std::{env, fs, io::ErrorKind, path::Path, time::Duration};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::SinnayBotError;

pub(crate) const DEFAULT_SPOTIFY_REDIRECT_URI: &str = "http://localhost:8080/callback";

/// Settings read from the toml settings file. Secrets never live here; see
/// [`Credentials`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub http: HttpConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub address: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatConfig {
    pub trigger: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Reads the config from the file if it exists, otherwise writes the
    /// default config to the file and loads that.
    pub fn read_or_write_default_from<P: AsRef<Path>>(path: P) -> Result<Self, SinnayBotError> {
        let p = path.as_ref();

        if !p.exists() {
            let default = Config::default();

            let toml_string = toml::to_string_pretty(&default).map_err(|e| {
                SinnayBotError::LoadConfig(
                    "couldn't format default config with toml".to_owned(),
                    e.into(),
                )
            })?;

            if let Err(e) = fs::write(p, toml_string) {
                warn!(
                    "wanted to write the default configuration file to {}, but couldn't",
                    p.display(),
                );
                match e.kind() {
                    ErrorKind::NotFound => warn!("does its parent directory exist?"),
                    ErrorKind::PermissionDenied => warn!("is it writable?"),
                    _ => warn!("(here's the error: {})", e),
                }
            } else {
                info!("wrote default configuration file to {}", p.display());
            }

            Ok(default)
        } else {
            let raw_string = fs::read_to_string(p).map_err(|e| {
                SinnayBotError::LoadConfig(
                    format!("couldn't read contents of {}", p.display()),
                    e.into(),
                )
            })?;

            let config: Config = toml::from_str(&raw_string).map_err(|e| {
                SinnayBotError::LoadConfig(
                    format!("couldn't parse toml from {}", p.display()),
                    e.into(),
                )
            })?;

            config.validate().map_err(|e| {
                SinnayBotError::LoadConfig(format!("invalid settings in {}", p.display()), e)
            })?;

            info!("configuration has been read from {}", p.display());

            Ok(config)
        }
    }

    /// Rejects settings the bot can't run with: an empty trigger would answer
    /// every chat message, and a zero timeout fails every request.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chat.trigger.trim().is_empty() {
            anyhow::bail!("chat.trigger can't be empty");
        }
        if self.http.timeout_secs == 0 {
            anyhow::bail!("http.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                address: "0.0.0.0:8080".to_owned(),
            },
            chat: ChatConfig {
                trigger: "!sinnaybot song".to_owned(),
            },
            http: HttpConfig {
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// OAuth client credentials and chat identity, taken from the environment.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub twitch: TwitchCredentials,
    pub spotify: SpotifyCredentials,
}

#[derive(Clone, Debug)]
pub struct TwitchCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub bot_username: String,
    pub broadcast_channel: String,
}

#[derive(Clone, Debug)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, SinnayBotError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds credentials from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SinnayBotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(SinnayBotError::MissingEnv(key));

        // spotify first, without it there is nothing to answer with
        let spotify = SpotifyCredentials {
            client_id: require("SPOTIFY_CLIENT_ID")?,
            client_secret: require("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: get("SPOTIFY_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_REDIRECT_URI.to_owned()),
        };

        let twitch = TwitchCredentials {
            client_id: require("TWITCH_CLIENT_ID")?,
            client_secret: require("TWITCH_CLIENT_SECRET")?,
            redirect_uri: match get("TWITCH_REDIRECT_URI") {
                Some(uri) => uri,
                None => require("TWITCH_REDIRECT_URL")
                    .map_err(|_| SinnayBotError::MissingEnv("TWITCH_REDIRECT_URI"))?,
            },
            bot_username: require("TWITCH_BOT_USERNAME")?,
            broadcast_channel: require("TWITCH_BROADCAST_CHANNEL")?,
        };

        Ok(Self { twitch, spotify })
    }
}
