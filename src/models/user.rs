use serde::{Deserialize, Deserializer};
use std::fmt;

/// Primary key of a row in `users`. Kept opaque since the column may be a uuid
/// or an integer depending on the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(UserId(s)),
            serde_json::Value::Number(n) => Ok(UserId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "unsupported user id: {}",
                other
            ))),
        }
    }
}

/// Row shape returned by an id-only select.
#[derive(Debug, Deserialize)]
pub struct UserRow {
    pub id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailMatch {
    Exact,
    CaseInsensitive,
}

/// How a handler finds the recipient's row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Email { address: String, matching: EmailMatch },
    Phone(String),
}

impl UserLookup {
    pub fn email(address: impl Into<String>, matching: EmailMatch) -> Self {
        UserLookup::Email {
            address: address.into(),
            matching,
        }
    }

    pub fn phone(number: impl Into<String>) -> Self {
        UserLookup::Phone(number.into())
    }

    /// Where the code gets delivered.
    pub fn destination(&self) -> &str {
        match self {
            UserLookup::Email { address, .. } => address,
            UserLookup::Phone(number) => number,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            UserLookup::Email { .. } => "email",
            UserLookup::Phone(_) => "phone_number",
        }
    }
}
