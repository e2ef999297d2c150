use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Identity of the signed-in user. A [`Profile`] always carries the id of the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The editable part of a [`Profile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub position: String,
    pub address: String,
    /// Reference to the avatar image, either a storage URI or an inline data URI.
    pub avatar_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

impl Profile {
    pub fn new(id: UserId, fields: ProfileFields) -> Self {
        Self { id, fields }
    }

    /// Initials shown in place of a missing avatar, e.g. `JD` for `John Doe`.
    pub fn initials(&self) -> String {
        initials(&self.fields.name)
    }

    /// Header greeting for the signed-in user. Falls back to the email when no name is set.
    pub fn greeting(&self) -> String {
        let who = if self.fields.name.trim().is_empty() {
            &self.fields.email
        } else {
            &self.fields.name
        };
        format!("Welcome, {who}")
    }
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile::new(
            UserId::from("user-1"),
            ProfileFields {
                name: name.into(),
                email: "jane@example.com".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_initials() {
        assert_eq!(profile("john doe").initials(), "JD");
        assert_eq!(profile("  Ada   Lovelace King ").initials(), "ALK");
        assert_eq!(profile("").initials(), "");
    }

    #[test]
    fn test_greeting() {
        assert_eq!(profile("Jane").greeting(), "Welcome, Jane");
        assert_eq!(profile(" ").greeting(), "Welcome, jane@example.com");
    }
}
