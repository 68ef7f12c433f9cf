use std::fmt;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use uuid::Uuid;

use super::value::{write_quoted, Value};

/// Snapshot timestamp layout, microsecond precision, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Attribute name carrying the class discriminator in the snapshot.
pub const CLASS_KEY: &str = "__class__";

/// Attribute names owned by the object itself. They never live in the
/// attribute bag and cannot be set through it.
pub const RESERVED_ATTRIBUTES: &[&str] = &["id", "created_at", "updated_at", CLASS_KEY];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

/// Current instant, truncated to what the snapshot can represent.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a snapshot timestamp. Accepts the native layout with or without
/// fractional seconds, and RFC 3339 with an offset.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)))
        .ok()
        .map(|ts| ts.trunc_subsecs(6))
}

/// Open attribute bag. Keeps insertion order; overwriting a key keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, Value)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or overwrite, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One model instance held by the object store.
///
/// Identity (`id`, `class_name`) is fixed at construction. `updated_at`
/// moves forward on every attribute change.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    id: String,
    class_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    attributes: Attributes,
}

impl StoredObject {
    /// A fresh instance with a new identity; both timestamps are now.
    pub fn new(class_name: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: Uuid::new_v4().to_string(),
            class_name: class_name.into(),
            created_at: ts,
            updated_at: ts,
            attributes: Attributes::new(),
        }
    }

    /// Rebuild an instance from persisted state, verbatim.
    pub fn restore(
        id: impl Into<String>,
        class_name: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: id.into(),
            class_name: class_name.into(),
            created_at,
            updated_at,
            attributes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The composite key: `class_name.id`.
    pub fn key(&self) -> String {
        composite_key(&self.class_name, &self.id)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Set a user attribute and refresh `updated_at`. Callers must reject
    /// reserved names first; see [`is_reserved`].
    pub(crate) fn set(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key, value);
        self.updated_at = now();
    }
}

pub fn composite_key(class_name: &str, id: &str) -> String {
    format!("{}.{}", class_name, id)
}

/// `[User] (<id>) {'id': '<id>', 'created_at': '...', 'updated_at': '...', ...}`
impl fmt::Display for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ({}) {{'id': ", self.class_name, self.id)?;
        write_quoted(f, &self.id)?;
        write!(
            f,
            ", 'created_at': '{}', 'updated_at': '{}'",
            format_timestamp(&self.created_at),
            format_timestamp(&self.updated_at)
        )?;
        for (key, value) in self.attributes.iter() {
            f.write_str(", ")?;
            write_quoted(f, key)?;
            write!(f, ": {}", value)?;
        }
        f.write_str("}")
    }
}
