//! Roommate-seeking user document model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Gender of a user. The filter endpoint passes raw values through without
/// touching this enum; only create/update bodies are validated against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "non-binary")]
    NonBinary,
    Other,
}

/// A roommate-seeking user. `userId` is an externally supplied key with a
/// unique sparse index; `username` is unique and substring-searchable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier assigned by the store on insert
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[schema(example = "665c1f2e8b3e4a0012345678")]
    pub id: Option<String>,
    /// Externally supplied identifier, unique across users
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "London")]
    pub location: Option<String>,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 650.0)]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Partial update payload for a user. Only fields present in the body are
/// replaced; everything else keeps its prior value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;
    use serde_json::json;

    #[test]
    fn test_gender_wire_values() {
        assert_eq!(
            serde_json::to_value(Gender::NonBinary).unwrap(),
            json!("non-binary")
        );
        assert_eq!(serde_json::to_value(Gender::Male).unwrap(), json!("male"));

        let parsed: Gender = serde_json::from_value(json!("other")).unwrap();
        assert_eq!(parsed, Gender::Other);
        assert!(serde_json::from_value::<Gender>(json!("unknown")).is_err());
    }

    #[test]
    fn test_user_wire_format_is_camel_case() {
        let user: User = serde_json::from_value(json!({
            "userId": "ext-42",
            "username": "maxine",
            "name": "Maxine",
            "budget": 650,
            "lifestyle": ["vegan"],
            "gender": "female"
        }))
        .unwrap();

        assert_eq!(user.user_id, Some("ext-42".to_string()));
        assert_eq!(user.gender, Some(Gender::Female));
        assert!(user.preferences.is_empty());

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["userId"], "ext-42");
        assert_eq!(value["gender"], "female");
        assert!(value.get("email").is_none());
    }

    #[test]
    fn test_update_user_serializes_only_present_fields() {
        let update = UpdateUser {
            budget: Some(700.0),
            lifestyle: Some(vec!["night-owl".to_string()]),
            ..Default::default()
        };

        let set = bson::to_document(&update).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains_key("budget"));
        assert!(set.contains_key("lifestyle"));
        assert!(!set.contains_key("userId"));
    }
}
