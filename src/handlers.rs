use crate::twitch::handler::TwitchMessageHandler;

pub mod song;

pub type TwitchHandlerCollection = Vec<Box<dyn TwitchMessageHandler>>;
