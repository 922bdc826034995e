use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A custom attribute value.
///
/// Only the four primitive kinds are representable; anything else in a
/// request payload is dropped while building the identity.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Convert a JSON value, returning `None` for unsupported kinds.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(AttributeValue::String(s.clone())),
            serde_json::Value::Bool(b) => Some(AttributeValue::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(AttributeValue::Integer(i)),
                None => n.as_f64().map(AttributeValue::Float),
            },
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeValue::Bool(b) => serde_json::Value::from(*b),
            AttributeValue::Integer(i) => serde_json::Value::from(*i),
            AttributeValue::Float(f) => serde_json::Value::from(*f),
            AttributeValue::String(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(value as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

/// The built-in user attributes understood by the evaluation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltInAttribute {
    Secondary,
    Ip,
    Country,
    Avatar,
    Name,
    Email,
    FirstName,
    LastName,
}

impl BuiltInAttribute {
    pub const ALL: [BuiltInAttribute; 8] = [
        BuiltInAttribute::Secondary,
        BuiltInAttribute::Ip,
        BuiltInAttribute::Country,
        BuiltInAttribute::Avatar,
        BuiltInAttribute::Name,
        BuiltInAttribute::Email,
        BuiltInAttribute::FirstName,
        BuiltInAttribute::LastName,
    ];

    /// Canonical attribute name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltInAttribute::Secondary => "secondary",
            BuiltInAttribute::Ip => "ip",
            BuiltInAttribute::Country => "country",
            BuiltInAttribute::Avatar => "avatar",
            BuiltInAttribute::Name => "name",
            BuiltInAttribute::Email => "email",
            BuiltInAttribute::FirstName => "firstName",
            BuiltInAttribute::LastName => "lastName",
        }
    }

    /// Names a request payload may use for this attribute.
    pub fn payload_names(&self) -> &'static [&'static str] {
        match self {
            BuiltInAttribute::Secondary => &["secondary", "secondaryKey"],
            BuiltInAttribute::Ip => &["ip"],
            BuiltInAttribute::Country => &["country"],
            BuiltInAttribute::Avatar => &["avatar"],
            BuiltInAttribute::Name => &["name"],
            BuiltInAttribute::Email => &["email"],
            BuiltInAttribute::FirstName => &["firstName"],
            BuiltInAttribute::LastName => &["lastName"],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.payload_names().iter().any(|candidate| *candidate == name))
    }

    /// Attributes that identify a person directly.
    pub fn is_personal(&self) -> bool {
        matches!(
            self,
            BuiltInAttribute::Ip
                | BuiltInAttribute::Name
                | BuiltInAttribute::Email
                | BuiltInAttribute::FirstName
                | BuiltInAttribute::LastName
        )
    }
}

impl fmt::Display for BuiltInAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subject flags are evaluated against.
///
/// Built by [`crate::core::UserBuilder`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    pub(crate) key: String,
    pub(crate) anonymous: bool,
    pub(crate) secondary: Option<String>,
    pub(crate) ip: Option<String>,
    pub(crate) country: Option<String>,
    pub(crate) avatar: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) custom: HashMap<String, AttributeValue>,
    // Built-in and custom names can collide, so each namespace keeps its own marks.
    pub(crate) private_attributes: BTreeSet<BuiltInAttribute>,
    pub(crate) private_custom: BTreeSet<String>,
}

impl UserIdentity {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn attribute(&self, attribute: BuiltInAttribute) -> Option<&str> {
        self.slot(attribute).as_deref()
    }

    pub fn custom(&self, name: &str) -> Option<&AttributeValue> {
        self.custom.get(name)
    }

    pub fn custom_attributes(&self) -> &HashMap<String, AttributeValue> {
        &self.custom
    }

    /// Names of every private attribute, built-in names in canonical form.
    pub fn private_attribute_keys(&self) -> BTreeSet<String> {
        self.private_attributes
            .iter()
            .map(|attr| attr.as_str().to_string())
            .chain(self.private_custom.iter().cloned())
            .collect()
    }

    pub fn is_attribute_private(&self, attribute: BuiltInAttribute) -> bool {
        self.private_attributes.contains(&attribute)
    }

    pub fn is_custom_private(&self, name: &str) -> bool {
        self.private_custom.contains(name)
    }

    /// Whether any attribute carrying this name is marked private.
    ///
    /// Checks the custom attribute with exactly this name and the built-in
    /// the name resolves to, so a collision never hides a private value.
    pub fn is_private(&self, name: &str) -> bool {
        self.is_custom_private(name)
            || BuiltInAttribute::from_name(name).is_some_and(|attr| self.is_attribute_private(attr))
    }

    pub(crate) fn slot(&self, attribute: BuiltInAttribute) -> &Option<String> {
        match attribute {
            BuiltInAttribute::Secondary => &self.secondary,
            BuiltInAttribute::Ip => &self.ip,
            BuiltInAttribute::Country => &self.country,
            BuiltInAttribute::Avatar => &self.avatar,
            BuiltInAttribute::Name => &self.name,
            BuiltInAttribute::Email => &self.email,
            BuiltInAttribute::FirstName => &self.first_name,
            BuiltInAttribute::LastName => &self.last_name,
        }
    }

    pub(crate) fn slot_mut(&mut self, attribute: BuiltInAttribute) -> &mut Option<String> {
        match attribute {
            BuiltInAttribute::Secondary => &mut self.secondary,
            BuiltInAttribute::Ip => &mut self.ip,
            BuiltInAttribute::Country => &mut self.country,
            BuiltInAttribute::Avatar => &mut self.avatar,
            BuiltInAttribute::Name => &mut self.name,
            BuiltInAttribute::Email => &mut self.email,
            BuiltInAttribute::FirstName => &mut self.first_name,
            BuiltInAttribute::LastName => &mut self.last_name,
        }
    }

    /// The identity as an evaluation backend receives it.
    ///
    /// Private attribute values are left out and their names listed under
    /// `privateAttrs`. Safe to log.
    pub fn redacted(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("key".to_string(), serde_json::Value::from(self.key.as_str()));
        object.insert("anonymous".to_string(), serde_json::Value::from(self.anonymous));

        for attribute in BuiltInAttribute::ALL {
            if let Some(value) = self.attribute(attribute) {
                if !self.is_attribute_private(attribute) {
                    object.insert(attribute.as_str().to_string(), serde_json::Value::from(value));
                }
            }
        }

        let custom: serde_json::Map<String, serde_json::Value> = self
            .custom
            .iter()
            .filter(|(name, _)| !self.is_custom_private(name))
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        if !custom.is_empty() {
            object.insert("custom".to_string(), serde_json::Value::Object(custom));
        }

        let private_names = self.private_attribute_keys();
        if !private_names.is_empty() {
            let names: Vec<serde_json::Value> = private_names
                .into_iter()
                .map(serde_json::Value::from)
                .collect();
            object.insert("privateAttrs".to_string(), serde_json::Value::Array(names));
        }

        serde_json::Value::Object(object)
    }
}
