use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single entry of the `/users` listing, kept exactly as the server sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(pub Value);

impl UserRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn id_no(&self) -> Option<&str> {
        self.str_field("id_no")
    }

    /// First and last name joined, falling back to a plain `name` field.
    pub fn display_name(&self) -> Option<String> {
        let first = self.str_field("first_name").unwrap_or_default().trim();
        let last = self.str_field("last_name").unwrap_or_default().trim();
        let joined = match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => String::new(),
        };
        if !joined.is_empty() {
            return Some(joined);
        }

        self.str_field("name")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    /// Scalar field rendered as text; objects, arrays and nulls yield `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    pub fn profile(&self) -> Result<UserProfile, serde_json::Error> {
        UserProfile::deserialize(&self.0)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Value> for UserRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// The last applied `/users` payload, held exactly as decoded.
///
/// Starts out as an empty array. Whatever JSON value the server answered with
/// is kept as is; [`records`](Self::records) is the list view used for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserListState(Value);

impl UserListState {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn into_payload(self) -> Value {
        self.0
    }

    /// Array elements in order. `null` reads as no users; any other value has
    /// no list view.
    pub fn records(&self) -> Option<Vec<UserRecord>> {
        match &self.0 {
            Value::Array(items) => Some(items.iter().cloned().map(UserRecord::new).collect()),
            Value::Null => Some(Vec::new()),
            _ => None,
        }
    }

    pub fn record_count(&self) -> Option<usize> {
        match &self.0 {
            Value::Array(items) => Some(items.len()),
            Value::Null => Some(0),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == Some(0)
    }
}

impl Default for UserListState {
    fn default() -> Self {
        Self(Value::Array(Vec::new()))
    }
}

impl From<Vec<UserRecord>> for UserListState {
    fn from(records: Vec<UserRecord>) -> Self {
        Self(Value::Array(
            records.into_iter().map(UserRecord::into_value).collect(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id_no: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_status: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ticket_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        [
            self.first_name.trim(),
            self.last_name.trim(),
            self.suffix.trim(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// Accept whatever JSON value the server sends.
    #[default]
    Opaque,
    /// Every element must decode as a [`UserProfile`].
    Strict,
}

impl std::str::FromStr for DecodeMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "opaque" => Ok(Self::Opaque),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown decode mode '{other}' (expected opaque|strict)")),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
