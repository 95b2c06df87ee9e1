use twitch_oauth2::Scope;

pub mod auth;
pub mod bot;
pub mod handler;

/// Reading and writing chat is all the bot does on twitch.
pub const SCOPE: [Scope; 2] = [Scope::ChatEdit, Scope::ChatRead];
