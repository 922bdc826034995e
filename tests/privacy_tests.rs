use flagbridge::privacy::{
    is_potential_pii_field, is_potential_pii_field_with_config, unmasked_pii_attributes,
    warn_if_unmasked_pii,
};
use flagbridge::{build_user, PrivacyConfig};
use serde_json::json;

// =============================================================================
// is_potential_pii_field tests
// =============================================================================

#[test]
fn test_pii_patterns_comprehensive() {
    let pii_fields = [
        "email", "phone", "telephone", "mobile", "ssn", "social_security",
        "credit_card", "cvv", "password", "secret", "token", "address",
        "street", "zip_code", "postal_code", "date_of_birth", "birth_date",
        "passport", "driver_license", "national_id", "bank_account", "iban",
    ];

    for field in pii_fields {
        assert!(
            is_potential_pii_field(field),
            "Expected '{}' to be detected as PII",
            field
        );
    }
}

#[test]
fn test_partial_and_case_insensitive_match() {
    assert!(is_potential_pii_field("workEmail"));
    assert!(is_potential_pii_field("HOME_ADDRESS"));
    assert!(is_potential_pii_field("pushToken"));
}

#[test]
fn test_non_pii_fields() {
    for field in ["plan", "tier", "beta", "appVersion", "seats"] {
        assert!(!is_potential_pii_field(field), "'{}' is not PII", field);
    }
}

#[test]
fn test_additional_patterns_only_with_config() {
    let config = PrivacyConfig::builder().add_pii_pattern("employee").build();

    assert!(!is_potential_pii_field("employeeNumber"));
    assert!(is_potential_pii_field_with_config("employeeNumber", Some(&config)));
}

// =============================================================================
// identity checks
// =============================================================================

#[test]
fn test_private_attributes_not_reported() {
    let user = build_user(&json!({
        "userKey": "u",
        "user": { "email": "a@b.co", "name": "A B", "country": "NZ" },
        "custom": { "phone": "555", "plan": "pro" },
        "privateAttributes": ["email", "phone"]
    }));

    assert_eq!(unmasked_pii_attributes(&user, None), vec!["name".to_string()]);
}

#[test]
fn test_custom_patterns_applied_to_identity() {
    let user = build_user(&json!({
        "userKey": "u",
        "custom": { "loyaltyId": "L-1", "plan": "pro" }
    }));
    let config = PrivacyConfig::builder()
        .warn_on_unmasked_pii(true)
        .add_pii_pattern("loyalty")
        .build();

    assert!(unmasked_pii_attributes(&user, None).is_empty());
    assert_eq!(warn_if_unmasked_pii(&user, &config), vec!["loyaltyId".to_string()]);
}

#[test]
fn test_clean_identity_reports_nothing() {
    let user = build_user(&json!({
        "userKey": "u",
        "user": { "country": "NZ", "avatar": "https://example.com/a.png" },
        "custom": { "plan": "pro" }
    }));
    let config = PrivacyConfig::builder().warn_on_unmasked_pii(true).build();

    assert!(warn_if_unmasked_pii(&user, &config).is_empty());
}
