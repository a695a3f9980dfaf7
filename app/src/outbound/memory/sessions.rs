//! Session token holder for the in-process backends.

use std::sync::Mutex;

use super::lock;
use crate::domain::IdToken;
use crate::domain::ports::SessionTokenStore;

/// Keeps the bound token so tests can see which identity backend calls
/// would carry.
#[derive(Debug, Default)]
pub struct InMemorySessionTokens {
    current: Mutex<Option<IdToken>>,
}

impl InMemorySessionTokens {
    pub fn current(&self) -> Option<IdToken> {
        lock(&self.current).clone()
    }
}

impl SessionTokenStore for InMemorySessionTokens {
    fn bind(&self, token: &IdToken) {
        *lock(&self.current) = Some(token.clone());
    }

    fn clear(&self) {
        lock(&self.current).take();
    }
}
