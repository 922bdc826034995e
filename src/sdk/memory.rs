use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde_json::Value;

use crate::core::BridgeOptions;
use crate::error::Result;
use crate::types::UserIdentity;

use super::{FlagChangeListener, FlagSdk, ListenerId};

/// A [`FlagSdk`] backed by a plain map of flag values.
///
/// No targeting: every user sees the same values. Changing a value through
/// [`InMemorySdk::set_flag`] notifies that flag's listeners on the calling
/// thread, the way a streaming update would.
///
/// # Example
///
/// ```rust
/// use flagbridge::sdk::{FlagSdk, InMemorySdk};
/// use serde_json::json;
///
/// let sdk = InMemorySdk::new();
/// sdk.set_flag("dark-mode", json!(true));
///
/// assert!(sdk.bool_variation("dark-mode", false));
/// assert_eq!(sdk.string_variation("missing", Some("x")), Some("x".to_string()));
/// ```
#[derive(Default)]
pub struct InMemorySdk {
    flags: RwLock<HashMap<String, Value>>,
    user: RwLock<Option<UserIdentity>>,
    start_options: RwLock<Option<BridgeOptions>>,
    listeners: RwLock<HashMap<String, Vec<(ListenerId, FlagChangeListener)>>>,
    next_listener_id: AtomicU64,
    started: AtomicBool,
    closed: AtomicBool,
}

impl InMemorySdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: HashMap<String, Value>) -> Self {
        let sdk = Self::new();
        *sdk.flags.write() = flags;
        sdk
    }

    /// Set a flag value and notify its listeners.
    pub fn set_flag(&self, flag_key: impl Into<String>, value: Value) {
        let flag_key = flag_key.into();
        self.flags.write().insert(flag_key.clone(), value);
        self.notify(&flag_key);
    }

    /// Remove a flag and notify its listeners. Returns the old value.
    pub fn remove_flag(&self, flag_key: &str) -> Option<Value> {
        let removed = self.flags.write().remove(flag_key);
        if removed.is_some() {
            self.notify(flag_key);
        }
        removed
    }

    fn notify(&self, flag_key: &str) {
        // Listeners run without the lock held so they may call back into the SDK.
        let listeners: Vec<FlagChangeListener> = self
            .listeners
            .read()
            .get(flag_key)
            .map(|entries| entries.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();

        for listener in listeners {
            listener(flag_key);
        }
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.user.read().clone()
    }

    /// Options passed to the most recent `start`.
    pub fn start_options(&self) -> Option<BridgeOptions> {
        self.start_options.read().clone()
    }

    pub fn listener_count(&self, flag_key: &str) -> usize {
        self.listeners
            .read()
            .get(flag_key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl FlagSdk for InMemorySdk {
    fn start(&self, options: &BridgeOptions, user: UserIdentity) -> Result<()> {
        tracing::debug!(
            mobile_key = %options.masked_mobile_key(),
            start_wait_ms = options.start_wait.as_millis() as u64,
            user = %user.redacted(),
            "In-memory SDK started"
        );
        *self.user.write() = Some(user);
        *self.start_options.write() = Some(options.clone());
        self.started.store(true, Ordering::SeqCst);
        self.closed.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn identify(&self, user: UserIdentity) -> Result<()> {
        *self.user.write() = Some(user);
        Ok(())
    }

    fn bool_variation(&self, flag_key: &str, fallback: bool) -> bool {
        self.flags
            .read()
            .get(flag_key)
            .and_then(Value::as_bool)
            .unwrap_or(fallback)
    }

    fn string_variation(&self, flag_key: &str, fallback: Option<&str>) -> Option<String> {
        self.flags
            .read()
            .get(flag_key)
            .and_then(Value::as_str)
            .or(fallback)
            .map(str::to_string)
    }

    fn all_flags(&self) -> HashMap<String, Value> {
        self.flags.read().clone()
    }

    fn register_flag_listener(&self, flag_key: &str, listener: FlagChangeListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .write()
            .entry(flag_key.to_string())
            .or_default()
            .push((id, listener));
        id
    }

    fn unregister_flag_listener(&self, flag_key: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(entries) = listeners.get_mut(flag_key) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            listeners.remove(flag_key);
        }
        removed
    }

    fn close(&self) -> Result<()> {
        self.listeners.write().clear();
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
