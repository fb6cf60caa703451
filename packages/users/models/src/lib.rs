#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! User profile documents as stored under `users/` in the document store.
//!
//! The store is schemaless and populated by several clients, so decoding is
//! deliberately forgiving: a field with the wrong type is treated as absent
//! and never causes the whole record to be rejected. Only entries that are
//! not JSON objects at all are skipped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Self-reported gender used to segment demographic tallies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Gender {
    /// "Man"
    Man,
    /// "Woman"
    Woman,
}

/// The `livesIn` block of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LivesIn {
    /// Latitude, if recorded and numeric.
    pub latitude: Option<f64>,
    /// Longitude, if recorded and numeric.
    pub longitude: Option<f64>,
}

impl LivesIn {
    /// Returns `(latitude, longitude)` when both are present.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// A user profile reduced to the attributes the dashboard aggregates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserRecord {
    /// Document key under `users/`.
    pub id: String,
    /// Raw account creation timestamp.
    pub created_at: Option<String>,
    /// Home location; `None` when absent or an empty object.
    pub lives_in: Option<LivesIn>,
    /// Gender, if one of the recognized values.
    pub gender: Option<Gender>,
    /// Height category.
    pub height: Option<String>,
    /// Skin color category.
    pub skin_color: Option<String>,
    /// Job prominence category.
    pub job_prominence: Option<String>,
    /// Yearly income bracket.
    pub yearly_income: Option<String>,
    /// Hobbies, in profile order.
    pub hobbies: Vec<String>,
    /// College or school name.
    pub college_or_school: Option<String>,
    /// Raw timestamps of every like this user received.
    pub likes_received: Vec<String>,
}

impl UserRecord {
    /// Decodes a profile from its JSON fields.
    #[must_use]
    pub fn from_fields(id: impl Into<String>, fields: &Map<String, Value>) -> Self {
        let gender = fields
            .get("gender")
            .and_then(Value::as_str)
            .and_then(|s| s.trim().parse().ok());

        let lives_in = fields
            .get("livesIn")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
            .map(|m| LivesIn {
                latitude: m.get("latitude").and_then(coordinate),
                longitude: m.get("longitude").and_then(coordinate),
            });

        Self {
            id: id.into(),
            created_at: fields
                .get("created_at")
                .or_else(|| fields.get("createdAt"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            lives_in,
            gender,
            height: fields.get("height").and_then(category_key),
            skin_color: fields.get("skinColor").and_then(category_key),
            job_prominence: fields.get("jobProminence").and_then(category_key),
            yearly_income: fields.get("yearlyIncome").and_then(category_key),
            hobbies: fields
                .get("hobbies")
                .map(|v| list_values(v).filter_map(category_key).collect())
                .unwrap_or_default(),
            college_or_school: fields.get("collegeOrSchool").and_then(category_key),
            likes_received: fields
                .get("likesReceived")
                .map(|v| {
                    list_values(v)
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Coordinates of `livesIn` when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lives_in.as_ref().and_then(LivesIn::coordinates)
    }
}

/// A raw profile document with its key.
#[derive(Debug, Clone)]
pub struct UserDocument<'a> {
    /// Document key under `users/`.
    pub id: String,
    /// The profile's fields.
    pub fields: &'a Map<String, Value>,
}

impl UserDocument<'_> {
    /// Decodes the aggregate-relevant attributes.
    #[must_use]
    pub fn record(&self) -> UserRecord {
        UserRecord::from_fields(self.id.clone(), self.fields)
    }

    /// The document as a JSON object with its key merged in as `id`.
    #[must_use]
    pub fn with_id(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert("id".to_string(), Value::String(self.id.clone()));
        for (key, value) in self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }

    /// Case-insensitive substring match against the searchable profile
    /// fields (name, email, age, attractiveness, gender).
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        ["name", "email", "gender"]
            .iter()
            .any(|f| searchable_text(self.fields.get(*f)).to_lowercase().contains(&query))
            || ["age", "attractiveness"]
                .iter()
                .any(|f| searchable_text(self.fields.get(*f)).contains(&query))
    }
}

/// Iterates the profile documents of a `users` collection snapshot.
///
/// The store returns an object keyed by user ID, or an array when every key
/// is a small integer. `null` array holes are skipped silently; any other
/// non-object entry is skipped with a warning.
#[must_use]
pub fn documents(collection: &Value) -> Vec<UserDocument<'_>> {
    let entries: Box<dyn Iterator<Item = (String, &Value)> + '_> = match collection {
        Value::Object(map) => Box::new(map.iter().map(|(k, v)| (k.clone(), v))),
        Value::Array(items) => Box::new(
            items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v)),
        ),
        Value::Null => return Vec::new(),
        _ => {
            log::warn!("Users collection is neither an object nor an array");
            return Vec::new();
        }
    };

    let mut docs = Vec::new();
    for (id, value) in entries {
        let Some(fields) = value.as_object() else {
            log::warn!("Skipping invalid user data for user ID: {id}");
            continue;
        };
        docs.push(UserDocument { id, fields });
    }
    docs
}

/// Decodes every profile in a `users` collection snapshot.
#[must_use]
pub fn decode_users(collection: &Value) -> Vec<UserRecord> {
    documents(collection)
        .iter()
        .map(UserDocument::record)
        .collect()
}

/// Turns a categorical attribute into a tally key.
///
/// Empty strings, zero, `false` and non-scalar values count as absent.
fn category_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Values of a list that may be stored as an array or as pushed children.
fn list_values(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter()),
        Value::Object(map) => Box::new(map.values()),
        _ => Box::new(std::iter::empty()),
    }
}

fn searchable_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: &Value) -> UserRecord {
        UserRecord::from_fields("u1", value.as_object().unwrap())
    }

    #[test]
    fn decodes_full_profile() {
        let user = record(&json!({
            "created_at": "2024-03-01 10:00:00",
            "livesIn": { "latitude": 6.5, "longitude": 3.4 },
            "gender": "Woman",
            "height": 170,
            "skinColor": "Brown",
            "jobProminence": "High",
            "yearlyIncome": "$50k-$100k",
            "hobbies": ["Reading", "Hiking"],
            "collegeOrSchool": "UNILAG",
            "likesReceived": ["2024-03-02 09:00:00", "2024-03-03 09:00:00"]
        }));

        assert_eq!(user.id, "u1");
        assert_eq!(user.created_at.as_deref(), Some("2024-03-01 10:00:00"));
        assert_eq!(user.coordinates(), Some((6.5, 3.4)));
        assert_eq!(user.gender, Some(Gender::Woman));
        assert_eq!(user.height.as_deref(), Some("170"));
        assert_eq!(user.skin_color.as_deref(), Some("Brown"));
        assert_eq!(user.job_prominence.as_deref(), Some("High"));
        assert_eq!(user.yearly_income.as_deref(), Some("$50k-$100k"));
        assert_eq!(user.hobbies, vec!["Reading", "Hiking"]);
        assert_eq!(user.college_or_school.as_deref(), Some("UNILAG"));
        assert_eq!(user.likes_received.len(), 2);
    }

    #[test]
    fn wrong_types_are_absent() {
        let user = record(&json!({
            "created_at": 12345,
            "livesIn": "Lagos",
            "gender": "Other",
            "height": "",
            "skinColor": 0,
            "hobbies": "Reading",
            "collegeOrSchool": { "name": "UNILAG" },
            "likesReceived": [1, 2, "2024-01-01 00:00:00"]
        }));

        assert_eq!(user.created_at, None);
        assert_eq!(user.lives_in, None);
        assert_eq!(user.gender, None);
        assert_eq!(user.height, None);
        assert_eq!(user.skin_color, None);
        assert!(user.hobbies.is_empty());
        assert_eq!(user.college_or_school, None);
        assert_eq!(user.likes_received, vec!["2024-01-01 00:00:00"]);
    }

    #[test]
    fn falls_back_to_camel_case_created_at() {
        let user = record(&json!({ "createdAt": "2024-05-01T12:00:00+00:00" }));
        assert_eq!(user.created_at.as_deref(), Some("2024-05-01T12:00:00+00:00"));
    }

    #[test]
    fn partial_lives_in_has_no_coordinates() {
        let user = record(&json!({ "livesIn": { "latitude": "6.5" } }));
        assert!(user.lives_in.is_some());
        assert_eq!(user.coordinates(), None);

        let empty = record(&json!({ "livesIn": {} }));
        assert_eq!(empty.lives_in, None);
    }

    #[test]
    fn null_coordinates_are_absent() {
        let user = record(&json!({ "livesIn": { "latitude": null, "longitude": null } }));
        assert_eq!(
            user.lives_in,
            Some(LivesIn {
                latitude: None,
                longitude: None
            })
        );
        assert_eq!(user.coordinates(), None);
    }

    #[test]
    fn pushed_children_lists_are_read() {
        let user = record(&json!({
            "likesReceived": { "-Na1": "2024-01-01 00:00:00", "-Na2": "2024-01-02 00:00:00" },
            "hobbies": { "0": "Chess" }
        }));
        assert_eq!(user.likes_received.len(), 2);
        assert_eq!(user.hobbies, vec!["Chess"]);
    }

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("man".parse::<Gender>().unwrap(), Gender::Man);
        assert_eq!("WOMAN".parse::<Gender>().unwrap(), Gender::Woman);
        assert!("nonbinary".parse::<Gender>().is_err());
        assert_eq!(Gender::Man.to_string(), "Man");
    }

    #[test]
    fn object_collection_skips_non_objects() {
        let collection = json!({
            "a": { "name": "Ada" },
            "b": "garbage",
            "c": { "name": "Chidi" }
        });
        let docs = documents(&collection);
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn array_collection_uses_indices_and_skips_holes() {
        let collection = json!([null, { "name": "Ada" }, null, { "name": "Bola" }]);
        let users = decode_users(&collection);
        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn null_collection_is_empty() {
        assert!(documents(&Value::Null).is_empty());
    }

    #[test]
    fn with_id_merges_key() {
        let collection = json!({ "abc": { "name": "Ada" } });
        let docs = documents(&collection);
        assert_eq!(docs[0].with_id(), json!({ "id": "abc", "name": "Ada" }));
    }

    #[test]
    fn search_matches_text_and_numbers() {
        let collection = json!({
            "a": { "name": "Ada Obi", "email": "ada@example.com", "age": 27, "gender": "Woman" },
            "b": { "name": "Bola", "attractiveness": 7.5, "gender": "Man" }
        });
        let docs = documents(&collection);

        assert!(docs[0].matches_search("ADA"));
        assert!(docs[0].matches_search("example"));
        assert!(docs[0].matches_search("27"));
        assert!(!docs[0].matches_search("bola"));
        assert!(docs[1].matches_search("7.5"));
        assert!(docs[1].matches_search("man"));
        assert!(docs[0].matches_search("  "));
    }
}
