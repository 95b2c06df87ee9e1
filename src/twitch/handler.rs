use async_trait::async_trait;
use thiserror::Error;
use twitch_irc::message::PrivmsgMessage;

use crate::twitch::bot::{SinnayBotTwitchIRCClient, SinnayBotTwitchIRCError};

/// A chat message, as much of it as the handlers need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEvent {
    pub channel: String,
    pub username: String,
    pub text: String,
}

impl From<&PrivmsgMessage> for CommandEvent {
    fn from(message: &PrivmsgMessage) -> Self {
        Self {
            channel: message.channel_login.clone(),
            username: message.sender.login.clone(),
            text: message.message_text.clone(),
        }
    }
}

/// The one thing handlers need from a chat connection.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn say(&self, channel: &str, message: &str) -> Result<(), TwitchHandlerError>;
}

#[async_trait]
impl ChatClient for SinnayBotTwitchIRCClient {
    async fn say(&self, channel: &str, message: &str) -> Result<(), TwitchHandlerError> {
        // inherent `say`, not this trait's
        SinnayBotTwitchIRCClient::say(self, channel.to_string(), message.to_string())
            .await
            .map_err(TwitchHandlerError::SendMessage)
    }
}

#[async_trait]
pub trait TwitchMessageHandler: Send {
    async fn send_twitch_message(
        &mut self,
        client: &dyn ChatClient,
        channel: &str,
        message: &str,
    ) -> Result<(), TwitchHandlerError> {
        client.say(channel, message).await
    }

    /// Handle a new message from chat. Returns `true` if something was done to handle the message,
    /// or `false` if the message was ignored (or if the message is allowed to also be handled by
    /// other handlers).
    async fn handle_twitch_message(
        &mut self,
        event: &CommandEvent,
        client: &dyn ChatClient,
    ) -> Result<bool, TwitchHandlerError>;
}

#[derive(Error, Debug)]
pub enum TwitchHandlerError {
    #[error("message send failure! {0}")]
    SendMessage(SinnayBotTwitchIRCError),
}

#[cfg(test)]
pub(crate) mod test_support {
    use tokio::sync::Mutex;

    use super::*;

    /// Remembers every message instead of sending it.
    #[derive(Default)]
    pub struct RecordingChatClient {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatClient for RecordingChatClient {
        async fn say(&self, channel: &str, message: &str) -> Result<(), TwitchHandlerError> {
            self.sent
                .lock()
                .await
                .push((channel.to_owned(), message.to_owned()));
            Ok(())
        }
    }

    pub fn event(username: &str, text: &str) -> CommandEvent {
        CommandEvent {
            channel: "sinnay".to_owned(),
            username: username.to_owned(),
            text: text.to_owned(),
        }
    }
}
