use std::sync::Arc;

use parking_lot::Mutex;

use crate::action::Action;
use crate::middleware::{Chain, Middleware};

/// External persistence collaborator for the session token. Implementations
/// are foreign code, so failures come back as `anyhow` errors.
pub trait TokenStorage: Send + Sync {
    fn write(&self, token: &str) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
    fn read(&self) -> anyhow::Result<Option<String>>;
}

/// Credential event recognized on an action by [`TokenSync`].
pub enum TokenEvent {
    Acquired(String),
    Cleared,
}

/// Middleware that mirrors credential actions into a [`TokenStorage`].
///
/// Configured with a recognizer closure naming the credential-bearing
/// actions, so one stage serves login, registration and logout alike. The
/// persisted token is written or cleared before the action reaches the
/// reducer; error-flagged actions skip the storage entirely. This stage
/// always forwards the action; storage failures are logged, never fatal.
///
/// Must run after [`crate::ResolveAsync`] so it only sees settled payloads.
pub struct TokenSync<A> {
    storage: Arc<dyn TokenStorage>,
    recognize: Box<dyn Fn(&A) -> Option<TokenEvent> + Send + Sync>,
}

impl<A: Action> TokenSync<A> {
    pub fn new(
        storage: Arc<dyn TokenStorage>,
        recognize: impl Fn(&A) -> Option<TokenEvent> + Send + Sync + 'static,
    ) -> Self {
        Self {
            storage,
            recognize: Box::new(recognize),
        }
    }
}

impl<A: Action> Middleware<A> for TokenSync<A> {
    fn handle(&self, action: A, chain: &Chain<'_, A>) {
        if !action.is_error() {
            match (self.recognize)(&action) {
                Some(TokenEvent::Acquired(token)) => {
                    if let Err(err) = self.storage.write(&token) {
                        log::warn!("failed to persist session token: {err:#}");
                    }
                }
                Some(TokenEvent::Cleared) => {
                    if let Err(err) = self.storage.clear() {
                        log::warn!("failed to clear session token: {err:#}");
                    }
                }
                None => {}
            }
        }
        chain.next(action);
    }
}

/// In-process [`TokenStorage`], the stand-in for a browser's local storage.
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn write(&self, token: &str) -> anyhow::Result<()> {
        *self.token.lock() = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.token.lock() = None;
        Ok(())
    }

    fn read(&self) -> anyhow::Result<Option<String>> {
        Ok(self.token.lock().clone())
    }
}
