use thiserror::Error;

pub mod sanitizer;

pub use sanitizer::{sanitize_message, ErrorSanitizationConfig, SanitizedMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Configuration errors
    ConfigMissingRequired,
    ConfigInvalidTimeout,

    // SDK lifecycle errors
    SdkNotInitialized,
    SdkStartFailed,
    SdkError,

    // Channel errors
    ChannelInvalidArguments,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigMissingRequired => "CONFIG_MISSING_REQUIRED",
            ErrorCode::ConfigInvalidTimeout => "CONFIG_INVALID_TIMEOUT",
            ErrorCode::SdkNotInitialized => "SDK_NOT_INITIALIZED",
            ErrorCode::SdkStartFailed => "SDK_START_FAILED",
            ErrorCode::SdkError => "SDK_ERROR",
            ErrorCode::ChannelInvalidArguments => "CHANNEL_INVALID_ARGUMENTS",
        }
    }

    /// Whether the caller can fix the failure by retrying with corrected input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::ConfigMissingRequired
                | ErrorCode::ConfigInvalidTimeout
                | ErrorCode::SdkNotInitialized
                | ErrorCode::ChannelInvalidArguments
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("[{code}] {message}")]
pub struct BridgeError {
    pub code: ErrorCode,
    pub message: String,
    /// The original unsanitized message, if preservation is enabled.
    original_message: Option<String>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl BridgeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            original_message: None,
            source: None,
        }
    }

    /// Create a new error with sanitization applied.
    pub fn new_sanitized(
        code: ErrorCode,
        message: impl Into<String>,
        config: &ErrorSanitizationConfig,
    ) -> Self {
        let msg = message.into();
        let sanitized_msg = SanitizedMessage::new(&msg, config);
        Self {
            code,
            message: sanitized_msg.sanitized,
            original_message: sanitized_msg.original,
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            original_message: None,
            source: Some(Box::new(source)),
        }
    }

    /// Get the original unsanitized message if available.
    pub fn original_message(&self) -> Option<&str> {
        self.original_message.as_deref()
    }

    /// Sanitize this error's message in place.
    pub fn sanitize(&mut self, config: &ErrorSanitizationConfig) {
        if config.enabled {
            let sanitized = SanitizedMessage::new(&self.message, config);
            if config.preserve_original && self.original_message.is_none() {
                self.original_message = Some(self.message.clone());
            }
            self.message = sanitized.sanitized;
        }
    }

    pub fn config_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }

    pub fn missing_mobile_key() -> Self {
        Self::config_error(ErrorCode::ConfigMissingRequired, "mobileKey is required")
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::SdkNotInitialized,
            "SDK not initialized. Call init first.",
        )
    }

    pub fn missing_argument(name: &str) -> Self {
        Self::new(
            ErrorCode::ChannelInvalidArguments,
            format!("missing or invalid argument: {}", name),
        )
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ConfigMissingRequired | ErrorCode::ConfigInvalidTimeout
        )
    }

    pub fn is_caller_error(&self) -> bool {
        self.code.is_caller_error()
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
