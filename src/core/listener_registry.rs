use std::collections::BTreeMap;

use crate::sdk::ListenerId;

/// Flag-change listeners the bridge has registered with the SDK, by flag key.
///
/// At most one listener per flag key. Registering a key again hands back the
/// replaced id so the caller can unregister it from the SDK.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: BTreeMap<String, ListenerId>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, flag_key: impl Into<String>, id: ListenerId) -> Option<ListenerId> {
        self.listeners.insert(flag_key.into(), id)
    }

    pub fn remove(&mut self, flag_key: &str) -> Option<ListenerId> {
        self.listeners.remove(flag_key)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Remove every entry, ordered by flag key.
    pub fn drain(&mut self) -> Vec<(String, ListenerId)> {
        std::mem::take(&mut self.listeners).into_iter().collect()
    }
}
