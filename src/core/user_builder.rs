//! Building user identities from request payloads.
//!
//! A payload is a flat JSON object with four optional fields:
//!
//! - `userKey`: string. Absent or empty means an anonymous user with a
//!   generated key.
//! - `user`: object of built-in attribute name to string.
//! - `custom`: object of custom attribute name to string, number, or bool.
//! - `privateAttributes`: array of attribute names to mark private.
//!
//! Fields of the wrong type are treated as absent. Building never fails.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::types::{AttributeValue, BuiltInAttribute, UserIdentity};

/// Typed builder for [`UserIdentity`].
///
/// # Example
///
/// ```rust
/// use flagbridge::core::UserBuilder;
/// use flagbridge::types::BuiltInAttribute;
///
/// let user = UserBuilder::new("user-123")
///     .attribute(BuiltInAttribute::Country, "NZ")
///     .private_attribute(BuiltInAttribute::Email, "test@test.com")
///     .custom("plan", "pro")
///     .build();
///
/// assert_eq!(user.key(), "user-123");
/// assert!(user.is_private("email"));
/// assert!(!user.is_private("country"));
/// ```
#[derive(Debug, Clone)]
pub struct UserBuilder {
    identity: UserIdentity,
}

impl UserBuilder {
    /// Start a non-anonymous identity with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            identity: UserIdentity {
                key: key.into(),
                anonymous: false,
                secondary: None,
                ip: None,
                country: None,
                avatar: None,
                name: None,
                email: None,
                first_name: None,
                last_name: None,
                custom: HashMap::new(),
                private_attributes: BTreeSet::new(),
                private_custom: BTreeSet::new(),
            },
        }
    }

    /// Start an anonymous identity with a freshly generated key.
    pub fn anonymous() -> Self {
        let mut builder = Self::new(uuid::Uuid::new_v4().to_string());
        builder.identity.anonymous = true;
        builder
    }

    pub fn attribute(self, attribute: BuiltInAttribute, value: impl Into<String>) -> Self {
        self.set_attribute(attribute, value, false)
    }

    pub fn private_attribute(self, attribute: BuiltInAttribute, value: impl Into<String>) -> Self {
        self.set_attribute(attribute, value, true)
    }

    pub fn custom(self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set_custom(name, value, false)
    }

    pub fn private_custom(self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set_custom(name, value, true)
    }

    pub fn set_attribute(
        mut self,
        attribute: BuiltInAttribute,
        value: impl Into<String>,
        private: bool,
    ) -> Self {
        *self.identity.slot_mut(attribute) = Some(value.into());
        if private {
            self.identity.private_attributes.insert(attribute);
        } else {
            self.identity.private_attributes.remove(&attribute);
        }
        self
    }

    pub fn set_custom(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
        private: bool,
    ) -> Self {
        let name = name.into();
        if private {
            self.identity.private_custom.insert(name.clone());
        } else {
            self.identity.private_custom.remove(&name);
        }
        self.identity.custom.insert(name, value.into());
        self
    }

    pub fn build(self) -> UserIdentity {
        self.identity
    }
}

/// The user-related fields of a request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRequest {
    pub user_key: Option<String>,
    pub user: HashMap<String, String>,
    pub custom: HashMap<String, Value>,
    pub private_attributes: Vec<String>,
}

impl UserRequest {
    /// Parse the user fields out of call arguments, leniently.
    pub fn from_arguments(arguments: &Value) -> Self {
        let user_key = arguments
            .get("userKey")
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let user: HashMap<String, String> = arguments
            .get("user")
            .and_then(Value::as_object)
            .map(|object| {
                object
                    .iter()
                    .filter_map(|(name, value)| match value.as_str() {
                        Some(s) => Some((name.clone(), s.to_string())),
                        None => {
                            tracing::debug!("Ignoring non-string user attribute: {}", name);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let custom: HashMap<String, Value> = arguments
            .get("custom")
            .and_then(Value::as_object)
            .map(|object| {
                object
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let private_attributes: Vec<String> = arguments
            .get("privateAttributes")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            user_key,
            user,
            custom,
            private_attributes,
        }
    }

    fn is_listed_private(&self, names: &[&str]) -> bool {
        self.private_attributes
            .iter()
            .any(|listed| names.iter().any(|name| listed.as_str() == *name))
    }

    /// Build the identity this request describes.
    pub fn build(&self) -> UserIdentity {
        let mut builder = match self.user_key {
            Some(ref key) => UserBuilder::new(key.clone()),
            None => UserBuilder::anonymous(),
        };

        for attribute in BuiltInAttribute::ALL {
            let names = attribute.payload_names();
            let value = names.iter().find_map(|name| self.user.get(*name));
            if let Some(value) = value {
                let private = self.is_listed_private(names);
                builder = builder.set_attribute(attribute, value.clone(), private);
            }
        }

        for (name, raw) in &self.custom {
            match AttributeValue::from_json(raw) {
                Some(value) => {
                    let private = self.is_listed_private(&[name.as_str()]);
                    builder = builder.set_custom(name.clone(), value, private);
                }
                None => {
                    tracing::debug!("Dropping custom attribute with unsupported type: {}", name);
                }
            }
        }

        builder.build()
    }
}

/// Build a [`UserIdentity`] straight from call arguments.
pub fn build_user(arguments: &Value) -> UserIdentity {
    UserRequest::from_arguments(arguments).build()
}
