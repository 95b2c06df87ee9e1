use async_trait::async_trait;
use log::{error, info};
use tokio::task::JoinHandle;
use twitch_irc::{
    login::StaticLoginCredentials, message::ServerMessage, ClientConfig, SecureTCPTransport,
    TwitchIRCClient,
};

use super::handler::{ChatClient, CommandEvent, TwitchHandlerError, TwitchMessageHandler};
use crate::{handlers::TwitchHandlerCollection, SinnayBotError};

pub type SinnayBotTwitchIRCClient = TwitchIRCClient<SecureTCPTransport, StaticLoginCredentials>;
pub type SinnayBotTwitchIRCError = twitch_irc::Error<SecureTCPTransport, StaticLoginCredentials>;

pub struct TwitchBot {
    message_handlers: TwitchHandlerCollection,
}

impl TwitchBot {
    pub fn new(message_handlers: TwitchHandlerCollection) -> Self {
        Self { message_handlers }
    }

    /// Connects to chat as `login`, joins `channel` and starts handling messages
    /// on a new task. The returned handle ends when the connection closes.
    pub fn start(
        mut self,
        login: String,
        token: String,
        channel: String,
    ) -> Result<JoinHandle<()>, SinnayBotError> {
        let credentials = StaticLoginCredentials::new(login, Some(token));
        let config = ClientConfig::new_simple(credentials);

        let (mut incoming_messages, client) = SinnayBotTwitchIRCClient::new(config);

        // join a channel. this will error if the passed channel login name is
        // malformed.
        client
            .join(channel.clone())
            .map_err(|e| SinnayBotError::Join(channel.clone(), e.to_string()))?;
        info!("twitch: joined channel {}", channel);

        let handle = tokio::spawn(async move {
            while let Some(message) = incoming_messages.recv().await {
                match message {
                    ServerMessage::Notice(notice_msg) => info!(
                        "notice received from twitch channel {}: {}",
                        notice_msg.channel_login.as_deref().unwrap_or("<none>"),
                        notice_msg.message_text
                    ),
                    ServerMessage::Privmsg(privmsg) => {
                        let event = CommandEvent::from(&privmsg);
                        if let Err(e) = self.handle_twitch_message(&event, &client).await {
                            error!("error in message handler! {e}");
                        }
                    }
                    _ => {}
                }
            }
            info!("twitch: connection to {} closed", channel);
        });

        Ok(handle)
    }
}

#[async_trait]
impl TwitchMessageHandler for TwitchBot {
    async fn handle_twitch_message(
        &mut self,
        event: &CommandEvent,
        client: &dyn ChatClient,
    ) -> Result<bool, TwitchHandlerError> {
        for message_handler in self.message_handlers.iter_mut() {
            // try to handle the message. if the handler determines the message was handled,
            // we'll stop
            if message_handler.handle_twitch_message(event, client).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
