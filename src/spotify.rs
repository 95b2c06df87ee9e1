pub mod auth;
pub mod client;

/// The only permission needed to answer "what's playing?".
pub const SCOPE: [&str; 1] = ["user-read-currently-playing"];
