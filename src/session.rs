use thiserror::Error;
use tokio::sync::Mutex;

use crate::spotify::client::SharedMusicClient;

/// The process's one connection to spotify.
#[derive(Clone, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(SharedMusicClient),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("spotify hasn't been authenticated yet")]
pub struct NotAuthenticated;

/// Holds the current [`Session`] behind a single lock. The lock is only held
/// while the session is read or replaced, never while the client is in use.
#[derive(Default)]
pub struct SessionStore {
    session: Mutex<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs an authenticated client, replacing any previous one.
    pub async fn set(&self, client: SharedMusicClient) {
        *self.session.lock().await = Session::Authenticated(client);
    }

    /// Returns a handle to the authenticated client.
    pub async fn get(&self) -> Result<SharedMusicClient, NotAuthenticated> {
        match &*self.session.lock().await {
            Session::Authenticated(client) => Ok(client.clone()),
            Session::Unauthenticated => Err(NotAuthenticated),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(&*self.session.lock().await, Session::Authenticated(_))
    }
}
