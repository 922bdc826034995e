//! Privacy checks for user identities.
//!
//! Detects attributes that look like personal data but are sent in
//! cleartext, so integrators can move them into `privateAttributes`.

use crate::types::{BuiltInAttribute, UserIdentity};

/// Common PII field patterns (case-insensitive substring match)
const PII_PATTERNS: &[&str] = &[
    "email",
    "phone",
    "telephone",
    "mobile",
    "ssn",
    "social_security",
    "socialsecurity",
    "credit_card",
    "creditcard",
    "card_number",
    "cardnumber",
    "cvv",
    "password",
    "passwd",
    "secret",
    "token",
    "address",
    "street",
    "zip_code",
    "zipcode",
    "postal_code",
    "postalcode",
    "date_of_birth",
    "dateofbirth",
    "birth_date",
    "birthdate",
    "passport",
    "driver_license",
    "driverlicense",
    "national_id",
    "nationalid",
    "bank_account",
    "bankaccount",
    "iban",
];

pub const DEFAULT_WARN_ON_UNMASKED_PII: bool = cfg!(debug_assertions);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivacyConfig {
    /// Log a warning when personal data is sent unmasked. Default: true in debug builds
    pub warn_on_unmasked_pii: bool,

    /// Extra custom attribute name patterns to treat as personal data
    pub additional_pii_patterns: Vec<String>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            warn_on_unmasked_pii: DEFAULT_WARN_ON_UNMASKED_PII,
            additional_pii_patterns: Vec::new(),
        }
    }
}

impl PrivacyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PrivacyConfigBuilder {
        PrivacyConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct PrivacyConfigBuilder {
    warn_on_unmasked_pii: Option<bool>,
    additional_pii_patterns: Vec<String>,
}

impl PrivacyConfigBuilder {
    pub fn warn_on_unmasked_pii(mut self, warn: bool) -> Self {
        self.warn_on_unmasked_pii = Some(warn);
        self
    }

    pub fn add_pii_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.additional_pii_patterns.push(pattern.into());
        self
    }

    pub fn build(self) -> PrivacyConfig {
        PrivacyConfig {
            warn_on_unmasked_pii: self
                .warn_on_unmasked_pii
                .unwrap_or(DEFAULT_WARN_ON_UNMASKED_PII),
            additional_pii_patterns: self.additional_pii_patterns,
        }
    }
}

/// Check if a custom attribute name potentially holds PII.
///
/// # Examples
///
/// ```
/// use flagbridge::privacy::is_potential_pii_field;
///
/// assert!(is_potential_pii_field("workEmail"));
/// assert!(is_potential_pii_field("PHONE_NUMBER"));
/// assert!(!is_potential_pii_field("plan"));
/// ```
pub fn is_potential_pii_field(field_name: &str) -> bool {
    is_potential_pii_field_with_config(field_name, None)
}

pub fn is_potential_pii_field_with_config(
    field_name: &str,
    config: Option<&PrivacyConfig>,
) -> bool {
    let lower_name = field_name.to_lowercase();

    if PII_PATTERNS
        .iter()
        .any(|pattern| lower_name.contains(pattern))
    {
        return true;
    }

    if let Some(cfg) = config {
        if cfg
            .additional_pii_patterns
            .iter()
            .any(|pattern| lower_name.contains(&pattern.to_lowercase()))
        {
            return true;
        }
    }

    false
}

/// Names of attributes that look personal, are set, and are not private.
///
/// Built-in names come first in declaration order, then custom names sorted.
pub fn unmasked_pii_attributes(
    identity: &UserIdentity,
    config: Option<&PrivacyConfig>,
) -> Vec<String> {
    let mut names: Vec<String> = BuiltInAttribute::ALL
        .into_iter()
        .filter(|attr| attr.is_personal())
        .filter(|attr| identity.attribute(*attr).is_some())
        .filter(|attr| !identity.is_attribute_private(*attr))
        .map(|attr| attr.as_str().to_string())
        .collect();

    let mut custom: Vec<String> = identity
        .custom_attributes()
        .keys()
        .filter(|name| !identity.is_custom_private(name))
        .filter(|name| is_potential_pii_field_with_config(name, config))
        .cloned()
        .collect();
    custom.sort();

    names.extend(custom);
    names
}

/// Warn through `tracing` when an identity carries unmasked personal data.
///
/// Returns the offending attribute names; empty when warnings are disabled.
pub fn warn_if_unmasked_pii(identity: &UserIdentity, config: &PrivacyConfig) -> Vec<String> {
    if !config.warn_on_unmasked_pii {
        return Vec::new();
    }

    let names = unmasked_pii_attributes(identity, Some(config));
    if !names.is_empty() {
        tracing::warn!(
            attributes = %names.join(", "),
            "Potential PII sent in cleartext. Consider adding these to privateAttributes."
        );
    }
    names
}
