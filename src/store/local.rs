//! Durable local storage and the session hint kept in it.

use std::sync::Arc;

/// Storage key of the session hint.
pub const SESSION_HINT_KEY: &str = "portal.hasSession";

const HINT_SET: &str = "1";

/// String key/value storage that survives restarts, like `localStorage`.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// "A session existed before" flag used to skip the startup session check
/// for visitors who have never logged in. Never an authorization signal.
#[derive(Clone)]
pub struct SessionHint {
    storage: Arc<dyn LocalStorage>,
}

impl SessionHint {
    #[must_use]
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.storage.get_item(SESSION_HINT_KEY).as_deref() == Some(HINT_SET)
    }

    pub fn mark(&self) {
        self.storage.set_item(SESSION_HINT_KEY, HINT_SET);
    }

    pub fn clear(&self) {
        self.storage.remove_item(SESSION_HINT_KEY);
    }
}

#[cfg(test)]
#[path = "local_test.rs"]
mod tests;
