use std::fmt::Display;

use thiserror::Error;

use crate::{
    session::{NotAuthenticated, SessionStore},
    spotify::client::{Playback, ProviderError},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub is_playing: bool,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("spotify hasn't been authenticated yet")]
    Unauthenticated,

    #[error("couldn't ask spotify what's playing: {0}")]
    ProviderFailure(#[from] ProviderError),
}

impl From<NotAuthenticated> for QueryError {
    fn from(_: NotAuthenticated) -> Self {
        Self::Unauthenticated
    }
}

impl From<Option<Playback>> for TrackInfo {
    fn from(playback: Option<Playback>) -> Self {
        match playback {
            Some(Playback {
                is_playing: true,
                track_name: Some(track_name),
                artists,
            }) => Self {
                is_playing: true,
                track_name: Some(track_name),
                artist_name: artists.into_iter().next(),
            },
            _ => Self::default(),
        }
    }
}

impl Display for TrackInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.is_playing, &self.track_name) {
            (true, Some(track)) => write!(
                f,
                "{track} by {}",
                self.artist_name.as_deref().unwrap_or("an unknown artist")
            ),
            _ => write!(f, "nothing"),
        }
    }
}

/// Asks the authenticated music client what is playing right now. The session
/// lock is released before the client is called.
pub async fn current_track(session: &SessionStore) -> Result<TrackInfo, QueryError> {
    let client = session.get().await?;
    let playback = client.currently_playing().await?;

    Ok(TrackInfo::from(playback))
}
