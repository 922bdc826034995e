//! The seam between the bridge and the native feature flag SDK.
//!
//! Flag evaluation, streaming updates, persistence and network transport all
//! live behind [`FlagSdk`]. The bridge only translates calls.

mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::BridgeOptions;
use crate::error::Result;
use crate::types::UserIdentity;

pub use memory::InMemorySdk;

/// Called with the flag key whenever that flag's value changes.
pub type FlagChangeListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle for a listener registered with a [`FlagSdk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

pub trait FlagSdk: Send + Sync {
    /// Start the SDK for `user`, waiting up to `options.start_wait` for flags.
    fn start(&self, options: &BridgeOptions, user: UserIdentity) -> Result<()>;

    /// Switch evaluation to a different user.
    fn identify(&self, user: UserIdentity) -> Result<()>;

    fn bool_variation(&self, flag_key: &str, fallback: bool) -> bool;

    fn string_variation(&self, flag_key: &str, fallback: Option<&str>) -> Option<String>;

    fn all_flags(&self) -> HashMap<String, serde_json::Value>;

    fn register_flag_listener(&self, flag_key: &str, listener: FlagChangeListener) -> ListenerId;

    /// Returns false if no such listener was registered for `flag_key`.
    fn unregister_flag_listener(&self, flag_key: &str, id: ListenerId) -> bool;

    fn close(&self) -> Result<()>;
}
