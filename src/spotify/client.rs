use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use rspotify::{
    model::{AdditionalType, CurrentlyPlayingContext, PlayableItem},
    prelude::*,
    AuthCodeSpotify, Config as SpotifyConfig, OAuth,
};
use thiserror::Error;

use crate::{auth::AuthError, config::SpotifyCredentials, spotify::SCOPE};

/// What the music service reports about the listener's player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playback {
    pub is_playing: bool,
    pub track_name: Option<String>,
    pub artists: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("spotify request failed: {0}")]
    Request(#[from] rspotify::ClientError),

    #[error("spotify didn't answer in time")]
    Timeout,
}

/// An authenticated handle to a music service.
#[async_trait]
pub trait MusicClient: Send + Sync {
    /// Returns `None` when there is no active player at all.
    async fn currently_playing(&self) -> Result<Option<Playback>, ProviderError>;
}

pub type SharedMusicClient = Arc<dyn MusicClient>;

pub struct SpotifyClient {
    spotify: AuthCodeSpotify,
    timeout: Duration,
}

impl SpotifyClient {
    /// Exchanges an authorization code for a token and returns a client that
    /// uses it. `config` decides which accounts and api hosts are talked to.
    pub async fn authorize(
        credentials: &SpotifyCredentials,
        config: SpotifyConfig,
        code: &str,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let oauth = OAuth {
            redirect_uri: credentials.redirect_uri.clone(),
            scopes: SCOPE.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        let spotify = AuthCodeSpotify::with_config(
            rspotify::Credentials::new(&credentials.client_id, &credentials.client_secret),
            oauth,
            config,
        );

        tokio::time::timeout(timeout, spotify.request_token(code))
            .await
            .map_err(|_| AuthError::Timeout)??;

        Ok(Self { spotify, timeout })
    }
}

#[async_trait]
impl MusicClient for SpotifyClient {
    async fn currently_playing(&self) -> Result<Option<Playback>, ProviderError> {
        let context = tokio::time::timeout(
            self.timeout,
            self.spotify
                .current_playing(None, None::<Vec<&AdditionalType>>),
        )
        .await
        .map_err(|_| ProviderError::Timeout)??;

        Ok(context.map(Playback::from))
    }
}

impl From<CurrentlyPlayingContext> for Playback {
    fn from(context: CurrentlyPlayingContext) -> Self {
        let (track_name, artists) = match context.item {
            Some(PlayableItem::Track(track)) => (
                Some(track.name),
                track.artists.into_iter().map(|a| a.name).collect(),
            ),
            // podcasts have no artists, the publisher is the closest thing
            Some(PlayableItem::Episode(episode)) => {
                (Some(episode.name), vec![episode.show.publisher])
            }
            _ => (None, vec![]),
        };

        Self {
            is_playing: context.is_playing,
            track_name,
            artists,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::{test_support::*, *};

    fn playback_from(json: &str) -> Playback {
        let context: CurrentlyPlayingContext = serde_json::from_str(json).unwrap();
        Playback::from(context)
    }

    #[test]
    fn track_keeps_every_artist_in_order() {
        assert_eq!(
            playback_from(PLAYING_TRACK_JSON),
            Playback {
                is_playing: true,
                track_name: Some("X".to_owned()),
                artists: vec!["Y".to_owned(), "Z".to_owned()],
            }
        );
    }

    #[test]
    fn episode_credits_the_publisher() {
        assert_eq!(
            playback_from(PLAYING_EPISODE_JSON),
            Playback {
                is_playing: true,
                track_name: Some("Episode 12".to_owned()),
                artists: vec!["Podcaster Inc".to_owned()],
            }
        );
    }

    #[test]
    fn idle_player_has_no_track() {
        assert_eq!(
            playback_from(IDLE_JSON),
            Playback {
                is_playing: false,
                track_name: None,
                artists: vec![],
            }
        );
    }
}
