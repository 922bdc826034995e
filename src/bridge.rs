use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::Arc;

use crate::channel::{
    flag_changed_arguments, Messenger, MethodCall, MethodResult, CALLBACK_FLAG_CHANGED,
    METHOD_ALL_FLAGS, METHOD_BOOL_VARIATION, METHOD_BOOL_VARIATION_FALLBACK, METHOD_IDENTIFY,
    METHOD_INIT, METHOD_REGISTER_FLAG_LISTENER, METHOD_STRING_VARIATION,
    METHOD_STRING_VARIATION_FALLBACK, METHOD_UNREGISTER_FLAG_LISTENER,
};
use crate::core::{build_user, BridgeOptions, ListenerRegistry};
use crate::error::{BridgeError, ErrorSanitizationConfig, Result};
use crate::privacy::warn_if_unmasked_pii;
use crate::sdk::{FlagChangeListener, FlagSdk};
use crate::types::UserIdentity;

/// Dispatches method calls from the runtime onto a [`FlagSdk`].
///
/// One bridge serves one channel. It owns the registry of flag-change
/// listeners and forwards their notifications through the [`Messenger`].
pub struct FlagBridge {
    sdk: Arc<dyn FlagSdk>,
    messenger: Arc<dyn Messenger>,
    configured: BridgeOptions,
    options: RwLock<Option<BridgeOptions>>,
    listeners: Mutex<ListenerRegistry>,
    sanitization: ErrorSanitizationConfig,
}

impl FlagBridge {
    pub fn new(sdk: Arc<dyn FlagSdk>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            sdk,
            messenger,
            configured: BridgeOptions::new(String::new()),
            options: RwLock::new(None),
            listeners: Mutex::new(ListenerRegistry::new()),
            sanitization: ErrorSanitizationConfig::default(),
        }
    }

    /// Options every `init` starts from. The call's `mobileKey` replaces the
    /// configured key when present.
    pub fn with_options(mut self, options: BridgeOptions) -> Self {
        self.configured = options;
        self
    }

    pub fn with_sanitization(mut self, config: ErrorSanitizationConfig) -> Self {
        self.sanitization = config;
        self
    }

    pub fn channel_name(&self) -> &str {
        &self.configured.channel_name
    }

    pub fn is_initialized(&self) -> bool {
        self.options.read().is_some()
    }

    /// Options from the last successful `init`.
    pub fn options(&self) -> Option<BridgeOptions> {
        self.options.read().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Handle one method call from the runtime.
    pub fn handle(&self, call: &MethodCall) -> MethodResult {
        tracing::debug!(channel = %self.channel_name(), "Handling method call: {}", call.method);

        let result = match call.method.as_str() {
            METHOD_INIT => self.init(call),
            METHOD_IDENTIFY => self.identify(call),
            METHOD_BOOL_VARIATION => self.bool_variation(call, false),
            METHOD_BOOL_VARIATION_FALLBACK => self.bool_variation(call, true),
            METHOD_STRING_VARIATION => self.string_variation(call, false),
            METHOD_STRING_VARIATION_FALLBACK => self.string_variation(call, true),
            METHOD_ALL_FLAGS => self.all_flags(),
            METHOD_REGISTER_FLAG_LISTENER => self.register_flag_listener(call),
            METHOD_UNREGISTER_FLAG_LISTENER => self.unregister_flag_listener(call),
            other => {
                tracing::debug!("Method not implemented: {}", other);
                return MethodResult::NotImplemented;
            }
        };

        result
            .map_err(|mut error| {
                error.sanitize(&self.sanitization);
                if error.is_caller_error() {
                    tracing::debug!("Method call {} rejected: {}", call.method, error);
                } else {
                    tracing::warn!("Method call {} failed: {}", call.method, error);
                }
                error
            })
            .into()
    }

    /// Tear down when the runtime detaches: drop listeners and close the SDK.
    pub fn detach(&self) {
        let drained = self.listeners.lock().drain();
        for (flag_key, id) in drained {
            self.sdk.unregister_flag_listener(&flag_key, id);
        }

        if let Err(error) = self.sdk.close() {
            tracing::warn!("Failed to close SDK: {}", error);
        }
        *self.options.write() = None;
    }

    fn require_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(BridgeError::not_initialized())
        }
    }

    fn build_identity(&self, call: &MethodCall, options: &BridgeOptions) -> UserIdentity {
        let user = build_user(&call.arguments);
        warn_if_unmasked_pii(&user, &options.privacy);
        tracing::debug!(user = %user.redacted(), "Built user identity");
        user
    }

    fn init(&self, call: &MethodCall) -> Result<Value> {
        let options = self.configured.with_arguments(&call.arguments)?;
        let user = self.build_identity(call, &options);

        if self.is_initialized() {
            tracing::debug!("Re-initializing SDK");
        }
        self.sdk.start(&options, user)?;
        *self.options.write() = Some(options);

        Ok(Value::Bool(true))
    }

    fn identify(&self, call: &MethodCall) -> Result<Value> {
        let options = self.options().ok_or_else(BridgeError::not_initialized)?;
        let user = self.build_identity(call, &options);
        self.sdk.identify(user)?;
        Ok(Value::Bool(true))
    }

    fn bool_variation(&self, call: &MethodCall, with_fallback: bool) -> Result<Value> {
        self.require_initialized()?;
        let flag_key = call.required_string("flagKey")?;
        let fallback = if with_fallback {
            call.argument::<bool>("fallback").unwrap_or(false)
        } else {
            false
        };
        Ok(Value::Bool(self.sdk.bool_variation(flag_key, fallback)))
    }

    fn string_variation(&self, call: &MethodCall, with_fallback: bool) -> Result<Value> {
        self.require_initialized()?;
        let flag_key = call.required_string("flagKey")?;
        let fallback = if with_fallback {
            call.string_argument("fallback")
        } else {
            None
        };
        Ok(self
            .sdk
            .string_variation(flag_key, fallback)
            .map(Value::String)
            .unwrap_or(Value::Null))
    }

    fn all_flags(&self) -> Result<Value> {
        self.require_initialized()?;
        let flags: serde_json::Map<String, Value> = self.sdk.all_flags().into_iter().collect();
        Ok(Value::Object(flags))
    }

    fn register_flag_listener(&self, call: &MethodCall) -> Result<Value> {
        self.require_initialized()?;
        let flag_key = call.required_string("flagKey")?;

        let messenger = Arc::clone(&self.messenger);
        let listener: FlagChangeListener = Arc::new(move |changed: &str| {
            messenger.invoke_method(CALLBACK_FLAG_CHANGED, flag_changed_arguments(changed));
        });

        let mut listeners = self.listeners.lock();
        let id = self.sdk.register_flag_listener(flag_key, listener);
        if let Some(replaced) = listeners.register(flag_key, id) {
            self.sdk.unregister_flag_listener(flag_key, replaced);
            tracing::debug!("Replaced listener for flag: {}", flag_key);
        }

        Ok(Value::Bool(true))
    }

    fn unregister_flag_listener(&self, call: &MethodCall) -> Result<Value> {
        self.require_initialized()?;
        let flag_key = call.required_string("flagKey")?;

        let removed = self.listeners.lock().remove(flag_key);
        match removed {
            Some(id) => {
                self.sdk.unregister_flag_listener(flag_key, id);
                Ok(Value::Bool(true))
            }
            None => Ok(Value::Bool(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::QueuedMessenger;
    use crate::error::ErrorCode;
    use crate::sdk::InMemorySdk;
    use serde_json::json;

    fn bridge() -> (FlagBridge, Arc<InMemorySdk>) {
        let sdk = Arc::new(InMemorySdk::new());
        let (messenger, _outbound) = QueuedMessenger::new();
        (FlagBridge::new(sdk.clone(), Arc::new(messenger)), sdk)
    }

    #[test]
    fn test_calls_before_init_fail() {
        let (bridge, _) = bridge();
        let result = bridge.handle(&MethodCall::new(
            METHOD_BOOL_VARIATION,
            json!({ "flagKey": "f" }),
        ));
        assert_eq!(result.error_code(), Some(ErrorCode::SdkNotInitialized.as_str()));
    }

    #[test]
    fn test_init_without_key_fails() {
        let (bridge, sdk) = bridge();
        let result = bridge.handle(&MethodCall::new(METHOD_INIT, json!({ "userKey": "u" })));
        assert_eq!(result.error_code(), Some(ErrorCode::ConfigMissingRequired.as_str()));
        assert!(!bridge.is_initialized());
        assert!(!sdk.is_started());
    }

    #[test]
    fn test_missing_flag_key() {
        let (bridge, _) = bridge();
        bridge.handle(&MethodCall::new(METHOD_INIT, json!({ "mobileKey": "mob-key" })));
        let result = bridge.handle(&MethodCall::new(METHOD_STRING_VARIATION, json!({})));
        assert_eq!(result.error_code(), Some(ErrorCode::ChannelInvalidArguments.as_str()));
    }

    #[test]
    fn test_unknown_method() {
        let (bridge, _) = bridge();
        let result = bridge.handle(&MethodCall::without_arguments("flush"));
        assert_eq!(result, MethodResult::NotImplemented);
    }

    #[test]
    fn test_configured_key_used_when_call_has_none() {
        let sdk = Arc::new(InMemorySdk::new());
        let (messenger, _outbound) = QueuedMessenger::new();
        let bridge = FlagBridge::new(sdk.clone(), Arc::new(messenger))
            .with_options(BridgeOptions::builder("mob-configured").channel_name("flags").build());

        let result = bridge.handle(&MethodCall::new(METHOD_INIT, json!({ "userKey": "u" })));

        assert!(result.is_success());
        assert_eq!(bridge.channel_name(), "flags");
        assert_eq!(sdk.start_options().unwrap().mobile_key, "mob-configured");
    }

    #[test]
    fn test_reregister_replaces_sdk_listener() {
        let (bridge, sdk) = bridge();
        bridge.handle(&MethodCall::new(METHOD_INIT, json!({ "mobileKey": "mob-key" })));
        let call = MethodCall::new(METHOD_REGISTER_FLAG_LISTENER, json!({ "flagKey": "f" }));

        bridge.handle(&call);
        bridge.handle(&call);

        assert_eq!(sdk.listener_count("f"), 1);
        assert_eq!(bridge.listener_count(), 1);
    }
}
