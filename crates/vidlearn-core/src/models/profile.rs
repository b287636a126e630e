use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder shown when a profile field is empty
const MISSING_FIELD: &str = "N/A";

/// The signed-in user's profile as returned by the backend.
///
/// Only `name` and `email` are interpreted. Anything else the backend sends is
/// kept in `extra` so the cached copy round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            extra: Map::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        non_empty_or_missing(&self.name)
    }

    pub fn display_email(&self) -> &str {
        non_empty_or_missing(&self.email)
    }
}

fn non_empty_or_missing(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING_FIELD
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_keeps_unknown_fields() {
        let json = r#"{"name":"A","email":"a@b.com","id":7,"plan":"pro"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "A");
        assert_eq!(profile.extra.get("id"), Some(&Value::from(7)));

        let back: Value = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["plan"], "pro");
        assert_eq!(back["email"], "a@b.com");
    }

    #[test]
    fn test_profile_missing_fields_default() {
        let profile: Profile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.display_name(), "N/A");
        assert_eq!(profile.display_email(), "N/A");
    }
}
