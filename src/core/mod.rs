mod config;
mod listener_registry;
mod user_builder;

pub use config::{BridgeOptions, BridgeOptionsBuilder, DEFAULT_CHANNEL_NAME, DEFAULT_START_WAIT};
pub use listener_registry::ListenerRegistry;
pub use user_builder::{build_user, UserBuilder, UserRequest};
