use flagbridge::{build_user, AttributeValue, BuiltInAttribute, UserBuilder, UserRequest};
use serde_json::json;

const USER_ID: &str = "testUserID";

fn builtin_payload() -> serde_json::Value {
    json!({
        "secondary": "testSecondaryKey",
        "avatar": "testAvatarUrl",
        "country": "Test County",
        "ip": "localhost",
        "email": "test@test.com",
        "name": "Test Full Name",
        "firstName": "Test First Name",
        "lastName": "Test Last Name"
    })
}

#[test]
fn test_user_attributes() {
    let expected = UserBuilder::new(USER_ID)
        .attribute(BuiltInAttribute::Secondary, "testSecondaryKey")
        .attribute(BuiltInAttribute::Avatar, "testAvatarUrl")
        .attribute(BuiltInAttribute::Country, "Test County")
        .attribute(BuiltInAttribute::Ip, "localhost")
        .attribute(BuiltInAttribute::Email, "test@test.com")
        .attribute(BuiltInAttribute::FirstName, "Test First Name")
        .attribute(BuiltInAttribute::LastName, "Test Last Name")
        .attribute(BuiltInAttribute::Name, "Test Full Name")
        .build();

    let actual = build_user(&json!({ "userKey": USER_ID, "user": builtin_payload() }));

    assert_eq!(actual, expected);
    assert!(actual.private_attribute_keys().is_empty());
}

#[test]
fn test_user_attributes_read_back() {
    let payload = builtin_payload();
    let user = build_user(&json!({ "userKey": USER_ID, "user": payload.clone() }));

    for attribute in BuiltInAttribute::ALL {
        assert_eq!(
            user.attribute(attribute),
            payload[attribute.as_str()].as_str(),
            "attribute {}",
            attribute
        );
        assert!(!user.is_private(attribute.as_str()));
    }
}

#[test]
fn test_private_user_attributes() {
    let expected = UserBuilder::new(USER_ID)
        .private_attribute(BuiltInAttribute::Secondary, "testSecondaryKey")
        .private_attribute(BuiltInAttribute::Avatar, "testAvatarUrl")
        .private_attribute(BuiltInAttribute::Country, "Test County")
        .private_attribute(BuiltInAttribute::Ip, "localhost")
        .private_attribute(BuiltInAttribute::Email, "test@test.com")
        .private_attribute(BuiltInAttribute::FirstName, "Test First Name")
        .private_attribute(BuiltInAttribute::LastName, "Test Last Name")
        .private_attribute(BuiltInAttribute::Name, "Test Full Name")
        .build();

    let names: Vec<&str> = BuiltInAttribute::ALL.iter().map(|a| a.as_str()).collect();
    let actual = build_user(&json!({
        "userKey": USER_ID,
        "user": builtin_payload(),
        "privateAttributes": names
    }));

    assert_eq!(actual, expected);
    for attribute in BuiltInAttribute::ALL {
        assert!(actual.is_private(attribute.as_str()));
    }
}

#[test]
fn test_some_private_user_attributes() {
    let user = build_user(&json!({
        "userKey": USER_ID,
        "user": { "email": "test@test.com", "country": "NZ" },
        "privateAttributes": ["email"]
    }));

    assert!(user.is_private("email"));
    assert!(!user.is_private("country"));
    assert_eq!(user.attribute(BuiltInAttribute::Email), Some("test@test.com"));
}

#[test]
fn test_custom_attributes() {
    let expected = UserBuilder::new(USER_ID)
        .custom("string", "string")
        .custom("integer", 10_i64)
        .custom("long", 10_000_000_000_i64)
        .custom("double", 2.5_f64)
        .custom("bool", true)
        .build();

    let actual = build_user(&json!({
        "userKey": USER_ID,
        "custom": {
            "string": "string",
            "integer": 10,
            "long": 10_000_000_000_i64,
            "double": 2.5,
            "bool": true
        }
    }));

    assert_eq!(actual, expected);
    assert_eq!(actual.custom("integer"), Some(&AttributeValue::Integer(10)));
    assert_eq!(actual.custom("double"), Some(&AttributeValue::Float(2.5)));
    assert_eq!(actual.custom("bool"), Some(&AttributeValue::Bool(true)));
    assert_eq!(actual.custom("string").and_then(AttributeValue::as_str), Some("string"));
}

#[test]
fn test_private_custom_attributes() {
    let expected = UserBuilder::new(USER_ID)
        .private_custom("string", "string")
        .private_custom("integer", 10_i64)
        .private_custom("double", 2.0_f64)
        .private_custom("bool", false)
        .build();

    let actual = build_user(&json!({
        "userKey": USER_ID,
        "custom": { "string": "string", "integer": 10, "double": 2.0, "bool": false },
        "privateAttributes": ["string", "integer", "double", "bool"]
    }));

    assert_eq!(actual, expected);
    for name in ["string", "integer", "double", "bool"] {
        assert!(actual.is_private(name));
    }
}

#[test]
fn test_unsupported_custom_types_dropped() {
    let user = build_user(&json!({
        "userKey": USER_ID,
        "custom": {
            "kept": "yes",
            "list": [1, 2, 3],
            "object": { "nested": true },
            "nothing": null
        },
        "privateAttributes": ["list"]
    }));

    assert_eq!(user.custom_attributes().len(), 1);
    assert!(user.custom("kept").is_some());
    assert!(user.custom("list").is_none());
    assert!(user.custom("object").is_none());
    assert!(user.custom("nothing").is_none());
    assert!(!user.private_attribute_keys().contains("list"));
}

#[test]
fn test_anonymous_users_get_distinct_keys() {
    let first = build_user(&json!({ "user": { "country": "NZ" } }));
    let second = build_user(&json!({ "user": { "country": "NZ" } }));

    assert!(first.is_anonymous());
    assert!(second.is_anonymous());
    assert_ne!(first.key(), second.key());
    assert_eq!(first.attribute(BuiltInAttribute::Country), Some("NZ"));
}

#[test]
fn test_create_user() {
    let expected = UserBuilder::new(USER_ID)
        .attribute(BuiltInAttribute::Email, "test@test.com")
        .private_custom("privateCustom", "customAttr")
        .build();

    let actual = build_user(&json!({
        "userKey": USER_ID,
        "user": { "email": "test@test.com" },
        "custom": { "privateCustom": "customAttr" },
        "privateAttributes": ["privateCustom"]
    }));

    assert_eq!(actual, expected);
    assert_eq!(actual.key(), USER_ID);
    assert!(!actual.is_anonymous());
    assert!(!actual.is_private("email"));
    assert!(actual.is_private("privateCustom"));
    assert_eq!(
        actual.custom("privateCustom"),
        Some(&AttributeValue::String("customAttr".to_string()))
    );
}

#[test]
fn test_build_is_idempotent_with_fixed_key() {
    let payload = json!({
        "userKey": USER_ID,
        "user": builtin_payload(),
        "custom": { "plan": "pro", "seats": 4 },
        "privateAttributes": ["email", "seats"]
    });

    assert_eq!(build_user(&payload), build_user(&payload));

    let request = UserRequest::from_arguments(&payload);
    assert_eq!(request.build(), request.build());
}

#[test]
fn test_wrong_typed_fields_degrade_to_absent() {
    let user = build_user(&json!({
        "userKey": USER_ID,
        "user": "not-an-object",
        "custom": ["not", "an", "object"],
        "privateAttributes": "email"
    }));

    assert_eq!(user.key(), USER_ID);
    assert!(BuiltInAttribute::ALL.iter().all(|a| user.attribute(*a).is_none()));
    assert!(user.custom_attributes().is_empty());
    assert!(user.private_attribute_keys().is_empty());
}

#[test]
fn test_redacted_view_hides_private_values() {
    let user = build_user(&json!({
        "userKey": USER_ID,
        "user": { "email": "test@test.com", "country": "NZ" },
        "custom": { "ssn": "000-00-0000", "plan": "pro" },
        "privateAttributes": ["email", "ssn"]
    }));

    let redacted = user.redacted();

    assert_eq!(redacted["key"], json!(USER_ID));
    assert_eq!(redacted["anonymous"], json!(false));
    assert_eq!(redacted["country"], json!("NZ"));
    assert!(redacted.get("email").is_none());
    assert_eq!(redacted["custom"], json!({ "plan": "pro" }));
    assert_eq!(redacted["privateAttrs"], json!(["email", "ssn"]));
    assert!(!redacted.to_string().contains("test@test.com"));
    assert!(!redacted.to_string().contains("000-00-0000"));
}

// =============================================================================
// Built-in and custom names that collide
// =============================================================================

#[test]
fn test_plain_custom_keeps_builtin_private() {
    let user = UserBuilder::new(USER_ID)
        .private_attribute(BuiltInAttribute::Email, "a@b.com")
        .custom("email", "other")
        .build();

    assert!(user.is_attribute_private(BuiltInAttribute::Email));
    assert!(!user.is_custom_private("email"));
    assert!(user.is_private("email"));

    let redacted = user.redacted();
    assert!(redacted.get("email").is_none());
    assert_eq!(redacted["custom"], json!({ "email": "other" }));
    assert!(!redacted.to_string().contains("a@b.com"));
}

#[test]
fn test_aliased_builtin_private_beside_custom_of_same_name() {
    let user = build_user(&json!({
        "userKey": USER_ID,
        "user": { "secondaryKey": "s-secret" },
        "custom": { "secondary": 1 },
        "privateAttributes": ["secondaryKey"]
    }));

    assert_eq!(user.attribute(BuiltInAttribute::Secondary), Some("s-secret"));
    assert!(user.is_attribute_private(BuiltInAttribute::Secondary));
    assert!(!user.is_custom_private("secondary"));
    assert!(user.is_private("secondary"));

    let redacted = user.redacted();
    assert!(redacted.get("secondary").is_none());
    assert_eq!(redacted["custom"], json!({ "secondary": 1 }));
    assert_eq!(redacted["privateAttrs"], json!(["secondary"]));
    assert!(!redacted.to_string().contains("s-secret"));
}

#[test]
fn test_private_custom_named_like_builtin_alias() {
    let user = build_user(&json!({
        "userKey": USER_ID,
        "custom": { "secondaryKey": "c-secret" },
        "privateAttributes": ["secondaryKey"]
    }));

    assert!(user.is_custom_private("secondaryKey"));
    assert!(user.is_private("secondaryKey"));
    assert!(!user.is_attribute_private(BuiltInAttribute::Secondary));
    assert!(!user.redacted().to_string().contains("c-secret"));
}
