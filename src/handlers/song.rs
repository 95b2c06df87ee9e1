use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use crate::{
    now_playing::{current_track, QueryError},
    session::SessionStore,
    twitch::handler::{ChatClient, CommandEvent, TwitchHandlerError, TwitchMessageHandler},
};

/// Answers the song trigger with whatever spotify is playing.
pub struct SongHandler {
    trigger: String,
    session: Arc<SessionStore>,
}

impl SongHandler {
    pub fn new(trigger: &str, session: Arc<SessionStore>) -> Self {
        Self {
            trigger: trigger.trim().to_lowercase(),
            session,
        }
    }

    pub fn is_trigger(&self, text: &str) -> bool {
        text.trim_start().to_lowercase().starts_with(&self.trigger)
    }

    /// Builds the reply for `username`. Every outcome gets an answer.
    pub async fn reply_for(&self, username: &str) -> String {
        match current_track(&self.session).await {
            Ok(track) if track.is_playing => {
                format!("@{username}, the song currently playing is {track}")
            }
            Ok(_) => format!("@{username}, no song currently playing"),
            Err(QueryError::Unauthenticated) => {
                format!("@{username}, spotify isn't connected yet, so i can't see what's playing")
            }
            Err(e @ QueryError::ProviderFailure(_)) => {
                warn!("couldn't answer song request: {e}");
                format!("@{username}, i couldn't reach spotify to check the song")
            }
        }
    }
}

#[async_trait]
impl TwitchMessageHandler for SongHandler {
    async fn handle_twitch_message(
        &mut self,
        event: &CommandEvent,
        client: &dyn ChatClient,
    ) -> Result<bool, TwitchHandlerError> {
        if !self.is_trigger(&event.text) {
            return Ok(false);
        }

        debug!("{} asked for the song in {}", event.username, event.channel);
        let reply = self.reply_for(&event.username).await;
        self.send_twitch_message(client, &event.channel, &reply)
            .await?;

        Ok(true)
    }
}
