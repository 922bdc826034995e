//! Error message sanitization for messages that cross the channel.
//!
//! Error text is handed back to the application runtime, which may log or
//! display it. This module strips:
//!
//! - SDK access keys (`mob-` and `sdk-` prefixed)
//! - Email addresses
//! - IPv4 addresses
//! - File paths (Unix and Windows)

use lazy_static::lazy_static;
use regex::Regex;

/// Configuration for error message sanitization.
#[derive(Debug, Clone)]
pub struct ErrorSanitizationConfig {
    /// Whether sanitization is enabled. Defaults to true.
    pub enabled: bool,
    /// Whether to keep the unsanitized message on the error for local inspection.
    pub preserve_original: bool,
}

impl Default for ErrorSanitizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preserve_original: false,
        }
    }
}

impl ErrorSanitizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            preserve_original: false,
        }
    }

    pub fn with_preservation() -> Self {
        Self {
            enabled: true,
            preserve_original: true,
        }
    }
}

lazy_static! {
    static ref PATTERNS: Vec<(Regex, &'static str)> = vec![
        // Mobile keys
        (Regex::new(r"mob-[a-zA-Z0-9-]{8,}").unwrap(), "mob-[REDACTED]"),
        // Server-side SDK keys
        (Regex::new(r"sdk-[a-zA-Z0-9-]{8,}").unwrap(), "sdk-[REDACTED]"),
        (Regex::new(r"[\w.+-]+@[\w.-]+\.\w+").unwrap(), "[EMAIL]"),
        (Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b").unwrap(), "[IP]"),
        (Regex::new(r"/(?:[\w.-]+/)+[\w.-]+").unwrap(), "[PATH]"),
        (Regex::new(r"[A-Za-z]:\\(?:[\w.-]+\\)+[\w.-]*").unwrap(), "[PATH]"),
    ];
}

/// Sanitize a message by replacing sensitive fragments with placeholders.
///
/// # Examples
///
/// ```
/// use flagbridge::error::sanitizer::sanitize_message;
///
/// let sanitized = sanitize_message("init failed for mob-abc123xyz456");
/// assert_eq!(sanitized, "init failed for mob-[REDACTED]");
/// ```
pub fn sanitize_message(message: &str) -> String {
    let mut result = message.to_string();

    for (pattern, replacement) in PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }

    result
}

/// A sanitized message, optionally paired with the original.
#[derive(Debug, Clone)]
pub struct SanitizedMessage {
    pub sanitized: String,
    pub original: Option<String>,
}

impl SanitizedMessage {
    pub fn new(message: &str, config: &ErrorSanitizationConfig) -> Self {
        if config.enabled {
            Self {
                sanitized: sanitize_message(message),
                original: if config.preserve_original {
                    Some(message.to_string())
                } else {
                    None
                },
            }
        } else {
            Self {
                sanitized: message.to_string(),
                original: None,
            }
        }
    }
}

impl std::fmt::Display for SanitizedMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sanitized)
    }
}
