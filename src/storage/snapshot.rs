//! JSON snapshot codec.
//!
//! The file is one JSON object mapping `Class.id` to the object's full
//! attribute map:
//!
//! ```json
//! {
//!   "User.4c1d...": {
//!     "id": "4c1d...",
//!     "created_at": "2024-03-01T10:00:00.000001",
//!     "updated_at": "2024-03-01T10:05:12.480113",
//!     "email": "a@b.com",
//!     "__class__": "User"
//!   }
//! }
//! ```

use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::models::*;

/// Why a single snapshot entry could not be rebuilt.
#[derive(Debug, Error, PartialEq)]
pub enum EntryError {
    #[error("entry is not a JSON object")]
    NotAnObject,

    #[error("missing `{0}`")]
    MissingField(&'static str),

    #[error("unknown class `{0}`")]
    UnknownClass(String),
}

pub fn encode_object(obj: &StoredObject) -> Json {
    let mut entry = Map::new();
    entry.insert("id".into(), Json::String(obj.id().to_string()));
    entry.insert(
        "created_at".into(),
        Json::String(format_timestamp(&obj.created_at())),
    );
    entry.insert(
        "updated_at".into(),
        Json::String(format_timestamp(&obj.updated_at())),
    );
    for (key, value) in obj.attributes().iter() {
        // Value serializes to a plain scalar and cannot fail
        let json = serde_json::to_value(value).unwrap_or(Json::Null);
        entry.insert(key.to_string(), json);
    }
    entry.insert(CLASS_KEY.into(), Json::String(obj.class_name().to_string()));
    Json::Object(entry)
}

pub fn encode<'a>(objects: impl IntoIterator<Item = &'a StoredObject>) -> Json {
    let snapshot: Map<String, Json> = objects
        .into_iter()
        .map(|obj| (obj.key(), encode_object(obj)))
        .collect();
    Json::Object(snapshot)
}

/// Rebuild one entry through the registry.
///
/// A missing or unparseable `updated_at` falls back to the load instant, a
/// missing `created_at` to `updated_at`. Attributes that are not primitive
/// scalars are dropped with a warning.
pub fn decode_entry(
    key: &str,
    entry: &Json,
    registry: &Registry,
) -> Result<StoredObject, EntryError> {
    let fields = entry.as_object().ok_or(EntryError::NotAnObject)?;

    let class_name = fields
        .get(CLASS_KEY)
        .and_then(Json::as_str)
        .ok_or(EntryError::MissingField(CLASS_KEY))?;
    let class = registry
        .resolve(class_name)
        .ok_or_else(|| EntryError::UnknownClass(class_name.to_string()))?;

    let id = match fields.get("id") {
        Some(Json::String(s)) => s.clone(),
        Some(Json::Number(n)) => n.to_string(),
        _ => return Err(EntryError::MissingField("id")),
    };

    let updated_at = timestamp_field(fields, "updated_at").unwrap_or_else(now);
    let created_at = timestamp_field(fields, "created_at").unwrap_or(updated_at);

    let mut attributes = Attributes::new();
    for (name, raw) in fields {
        if is_reserved(name) {
            continue;
        }
        match serde_json::from_value::<Value>(raw.clone()) {
            Ok(value) => {
                attributes.insert(name.clone(), value);
            }
            Err(_) => {
                tracing::warn!(key, attribute = %name, "Dropping non-primitive attribute");
            }
        }
    }

    Ok(class.rehydrate(id, created_at, updated_at, attributes))
}

fn timestamp_field(
    fields: &Map<String, Json>,
    name: &str,
) -> Option<chrono::DateTime<chrono::Utc>> {
    fields.get(name).and_then(Json::as_str).and_then(parse_timestamp)
}
