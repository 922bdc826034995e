use std::fmt;
use std::time::Duration;

use crate::error::{BridgeError, ErrorCode, Result};
use crate::privacy::PrivacyConfig;

/// How long `init` waits for the SDK to receive its first flags.
pub const DEFAULT_START_WAIT: Duration = Duration::from_secs(5);
pub const DEFAULT_CHANNEL_NAME: &str = "launchdarkly_flutter";

#[derive(Clone, PartialEq, Eq)]
pub struct BridgeOptions {
    pub mobile_key: String,
    pub start_wait: Duration,
    pub channel_name: String,
    pub privacy: PrivacyConfig,
}

impl BridgeOptions {
    pub fn new(mobile_key: impl Into<String>) -> Self {
        Self {
            mobile_key: mobile_key.into(),
            start_wait: DEFAULT_START_WAIT,
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            privacy: PrivacyConfig::default(),
        }
    }

    /// Read options from `init` call arguments, starting from defaults.
    pub fn from_arguments(arguments: &serde_json::Value) -> Result<Self> {
        Self::new(String::new()).with_arguments(arguments)
    }

    /// Apply `init` call arguments on top of these options.
    ///
    /// Only `mobileKey` is taken from the payload, and only when it is a
    /// string. Fails when the resulting key is empty.
    pub fn with_arguments(&self, arguments: &serde_json::Value) -> Result<Self> {
        let options = match arguments.get("mobileKey").and_then(|v| v.as_str()) {
            Some(mobile_key) => Self {
                mobile_key: mobile_key.to_string(),
                ..self.clone()
            },
            None => self.clone(),
        };

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.mobile_key.trim().is_empty() {
            return Err(BridgeError::missing_mobile_key());
        }

        if self.start_wait.is_zero() {
            return Err(BridgeError::config_error(
                ErrorCode::ConfigInvalidTimeout,
                "Start wait must be positive",
            ));
        }

        Ok(())
    }

    pub fn builder(mobile_key: impl Into<String>) -> BridgeOptionsBuilder {
        BridgeOptionsBuilder::new(mobile_key)
    }

    /// The mobile key with everything but its last four characters hidden.
    pub fn masked_mobile_key(&self) -> String {
        let chars: Vec<char> = self.mobile_key.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for BridgeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeOptions")
            .field("mobile_key", &self.masked_mobile_key())
            .field("start_wait", &self.start_wait)
            .field("channel_name", &self.channel_name)
            .field("privacy", &self.privacy)
            .finish()
    }
}

pub struct BridgeOptionsBuilder {
    mobile_key: String,
    start_wait: Duration,
    channel_name: String,
    privacy: PrivacyConfig,
}

impl BridgeOptionsBuilder {
    pub fn new(mobile_key: impl Into<String>) -> Self {
        Self {
            mobile_key: mobile_key.into(),
            start_wait: DEFAULT_START_WAIT,
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            privacy: PrivacyConfig::default(),
        }
    }

    pub fn start_wait(mut self, wait: Duration) -> Self {
        self.start_wait = wait;
        self
    }

    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = name.into();
        self
    }

    pub fn privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn build(self) -> BridgeOptions {
        BridgeOptions {
            mobile_key: self.mobile_key,
            start_wait: self.start_wait,
            channel_name: self.channel_name,
            privacy: self.privacy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = BridgeOptions::new("mob-key-1234");
        assert_eq!(options.start_wait, DEFAULT_START_WAIT);
        assert_eq!(options.channel_name, DEFAULT_CHANNEL_NAME);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_arguments_missing_key() {
        let err = BridgeOptions::from_arguments(&json!({ "userKey": "u" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingRequired);
    }

    #[test]
    fn test_from_arguments_non_string_key() {
        let err = BridgeOptions::from_arguments(&json!({ "mobileKey": 42 })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingRequired);
    }

    #[test]
    fn test_from_arguments_empty_key() {
        let err = BridgeOptions::from_arguments(&json!({ "mobileKey": "" })).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_zero_start_wait_rejected() {
        let options = BridgeOptions::builder("mob-key")
            .start_wait(Duration::ZERO)
            .build();
        assert_eq!(
            options.validate().unwrap_err().code,
            ErrorCode::ConfigInvalidTimeout
        );
    }

    #[test]
    fn test_with_arguments_keeps_configured_fields() {
        let base = BridgeOptions::builder("mob-base")
            .start_wait(Duration::from_secs(2))
            .build();

        let merged = base.with_arguments(&json!({ "mobileKey": "mob-call" })).unwrap();
        assert_eq!(merged.mobile_key, "mob-call");
        assert_eq!(merged.start_wait, Duration::from_secs(2));

        let unchanged = base.with_arguments(&json!({})).unwrap();
        assert_eq!(unchanged, base);
    }

    #[test]
    fn test_debug_masks_key() {
        let options = BridgeOptions::new("mob-secret-abcd");
        let printed = format!("{:?}", options);
        assert!(printed.contains("****abcd"));
        assert!(!printed.contains("secret"));
    }
}
