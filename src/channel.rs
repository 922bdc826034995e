//! Method-channel messages exchanged with the application runtime.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::error::BridgeError;

pub const METHOD_INIT: &str = "init";
pub const METHOD_IDENTIFY: &str = "identify";
pub const METHOD_BOOL_VARIATION: &str = "boolVariation";
pub const METHOD_BOOL_VARIATION_FALLBACK: &str = "boolVariationFallback";
pub const METHOD_STRING_VARIATION: &str = "stringVariation";
pub const METHOD_STRING_VARIATION_FALLBACK: &str = "stringVariationFallback";
pub const METHOD_ALL_FLAGS: &str = "allFlags";
pub const METHOD_REGISTER_FLAG_LISTENER: &str = "registerFeatureFlagListener";
pub const METHOD_UNREGISTER_FLAG_LISTENER: &str = "unregisterFeatureFlagListener";

/// Sent to the runtime when a watched flag changes. Arguments: `{"flagKey": ...}`.
pub const CALLBACK_FLAG_CHANGED: &str = "callbackRegisterFeatureFlagListener";

/// An incoming (or outgoing) method call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    pub fn without_arguments(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.get(name).is_some()
    }

    /// Typed argument lookup; `None` when missing or of the wrong type.
    pub fn argument<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.arguments
            .get(name)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn string_argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(Value::as_str)
    }

    pub(crate) fn required_string(&self, name: &str) -> Result<&str, BridgeError> {
        self.string_argument(name)
            .ok_or_else(|| BridgeError::missing_argument(name))
    }
}

/// The reply to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    Success(Value),
    Error {
        code: String,
        message: String,
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResult {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResult::Success(value.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResult::Success(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            MethodResult::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResult::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<BridgeError> for MethodResult {
    fn from(error: BridgeError) -> Self {
        MethodResult::Error {
            code: error.code.as_str().to_string(),
            message: error.message,
            details: None,
        }
    }
}

impl From<Result<Value, BridgeError>> for MethodResult {
    fn from(result: Result<Value, BridgeError>) -> Self {
        match result {
            Ok(value) => MethodResult::Success(value),
            Err(error) => error.into(),
        }
    }
}

/// Outbound side of the channel: calls from the bridge into the runtime.
pub trait Messenger: Send + Sync {
    fn invoke_method(&self, method: &str, arguments: Value);
}

/// A [`Messenger`] that queues outbound calls for a single consumer.
///
/// SDKs raise change notifications on their own threads. Queuing them here
/// and draining from one place delivers them to the runtime in the order
/// they were raised.
#[derive(Debug, Clone)]
pub struct QueuedMessenger {
    sender: mpsc::UnboundedSender<MethodCall>,
}

/// Receiving end of a [`QueuedMessenger`].
#[derive(Debug)]
pub struct OutboundCalls {
    receiver: mpsc::UnboundedReceiver<MethodCall>,
}

impl QueuedMessenger {
    pub fn new() -> (Self, OutboundCalls) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, OutboundCalls { receiver })
    }
}

impl Messenger for QueuedMessenger {
    fn invoke_method(&self, method: &str, arguments: Value) {
        if self.sender.send(MethodCall::new(method, arguments)).is_err() {
            tracing::debug!("Outbound channel closed, dropping call: {}", method);
        }
    }
}

impl OutboundCalls {
    /// Wait for the next outbound call. `None` once every messenger is dropped.
    pub async fn recv(&mut self) -> Option<MethodCall> {
        self.receiver.recv().await
    }

    /// Take the next outbound call if one is already queued.
    pub fn try_recv(&mut self) -> Option<MethodCall> {
        self.receiver.try_recv().ok()
    }

    /// Take everything queued so far, in order.
    pub fn drain(&mut self) -> Vec<MethodCall> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

pub(crate) fn flag_changed_arguments(flag_key: &str) -> Value {
    json!({ "flagKey": flag_key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_arguments() {
        let call = MethodCall::new(
            METHOD_BOOL_VARIATION_FALLBACK,
            json!({ "flagKey": "f", "fallback": true, "count": "x" }),
        );

        assert!(call.has_argument("flagKey"));
        assert!(!call.has_argument("missing"));
        assert_eq!(call.string_argument("flagKey"), Some("f"));
        assert_eq!(call.argument::<bool>("fallback"), Some(true));
        assert_eq!(call.argument::<i64>("count"), None);
    }

    #[test]
    fn test_arguments_on_null_payload() {
        let call = MethodCall::without_arguments(METHOD_ALL_FLAGS);
        assert!(!call.has_argument("flagKey"));
        assert!(call.required_string("flagKey").is_err());
    }

    #[test]
    fn test_error_conversion() {
        let result: MethodResult = BridgeError::not_initialized().into();
        assert_eq!(result.error_code(), Some(ErrorCode::SdkNotInitialized.as_str()));
        assert!(!result.is_success());
    }

    #[test]
    fn test_queued_messenger_preserves_order() {
        let (messenger, mut outbound) = QueuedMessenger::new();
        messenger.invoke_method(CALLBACK_FLAG_CHANGED, flag_changed_arguments("a"));
        messenger.invoke_method(CALLBACK_FLAG_CHANGED, flag_changed_arguments("b"));

        let calls = outbound.drain();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].string_argument("flagKey"), Some("a"));
        assert_eq!(calls[1].string_argument("flagKey"), Some("b"));
        assert!(outbound.try_recv().is_none());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (messenger, outbound) = QueuedMessenger::new();
        drop(outbound);
        messenger.invoke_method(CALLBACK_FLAG_CHANGED, flag_changed_arguments("a"));
    }
}
