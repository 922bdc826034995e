//! flagbridge
//!
//! Bridges a native feature flag SDK to a cross-platform application runtime
//! over a method channel. Incoming method calls become SDK calls; SDK
//! flag-change notifications become outgoing method calls.
//!
//! The one piece of real logic is turning a loose request payload into a
//! [`UserIdentity`], with per-attribute privacy marking. Everything else is
//! dispatch.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use flagbridge::{FlagBridge, InMemorySdk, MethodCall, QueuedMessenger};
//! use serde_json::json;
//!
//! let sdk = Arc::new(InMemorySdk::new());
//! sdk.set_flag("dark-mode", json!(true));
//!
//! let (messenger, mut outbound) = QueuedMessenger::new();
//! let bridge = FlagBridge::new(sdk.clone(), Arc::new(messenger));
//!
//! // Start the SDK for a user
//! bridge.handle(&MethodCall::new("init", json!({
//!     "mobileKey": "mob-xxxxxxxx",
//!     "userKey": "user-123",
//!     "user": { "email": "user@example.com" },
//!     "privateAttributes": ["email"],
//! })));
//!
//! // Evaluate a flag
//! let result = bridge.handle(&MethodCall::new("boolVariation", json!({ "flagKey": "dark-mode" })));
//! assert_eq!(result.value(), Some(&json!(true)));
//!
//! // Watch a flag
//! bridge.handle(&MethodCall::new("registerFeatureFlagListener", json!({ "flagKey": "dark-mode" })));
//! sdk.set_flag("dark-mode", json!(false));
//! let callback = outbound.try_recv().unwrap();
//! assert_eq!(callback.method, "callbackRegisterFeatureFlagListener");
//!
//! // Cleanup
//! bridge.detach();
//! ```

// Module declarations
pub mod types;
pub mod error;
pub mod core;
pub mod channel;
pub mod sdk;
pub mod privacy;
mod bridge;

// Re-exports from types module
pub use types::{AttributeValue, BuiltInAttribute, UserIdentity};

// Re-exports from error module
pub use error::{BridgeError, ErrorCode, Result};

// Re-exports from core module
pub use crate::core::{
    build_user, BridgeOptions, BridgeOptionsBuilder, ListenerRegistry, UserBuilder, UserRequest,
};

// Re-exports from channel module
pub use channel::{Messenger, MethodCall, MethodResult, OutboundCalls, QueuedMessenger};

// Re-exports from sdk module
pub use sdk::{FlagChangeListener, FlagSdk, InMemorySdk, ListenerId};

// Re-exports from privacy module
pub use privacy::{PrivacyConfig, PrivacyConfigBuilder};

pub use bridge::FlagBridge;
