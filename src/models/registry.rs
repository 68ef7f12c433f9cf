use chrono::{DateTime, Utc};

use super::object::{Attributes, StoredObject};

/// Model classes known to a stock console.
pub const BUILTIN_CLASSES: &[&str] = &[
    "BaseModel",
    "User",
    "State",
    "City",
    "Amenity",
    "Place",
    "Review",
];

/// A registered model class: the factory for its instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelClass {
    name: &'static str,
}

impl ModelClass {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build a brand-new instance of this class.
    pub fn instantiate(&self) -> StoredObject {
        StoredObject::new(self.name)
    }

    /// Rebuild a persisted instance of this class.
    pub fn rehydrate(
        &self,
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        attributes: Attributes,
    ) -> StoredObject {
        StoredObject::restore(id, self.name, created_at, updated_at, attributes)
    }
}

/// Closed mapping from class name to [`ModelClass`].
///
/// Fixed when the store is opened; there is no runtime registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    classes: Vec<ModelClass>,
}

impl Registry {
    pub fn new(classes: impl IntoIterator<Item = ModelClass>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_CLASSES.iter().copied().map(ModelClass::new))
    }

    /// Look up a class by exact (case-sensitive) name.
    pub fn resolve(&self, name: &str) -> Option<&ModelClass> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.iter().map(|class| class.name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_resolves_every_model() {
        let registry = Registry::builtin();
        for name in BUILTIN_CLASSES {
            let class = registry.resolve(name).expect("builtin class");
            assert_eq!(class.name(), *name);
        }
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let registry = Registry::builtin();
        assert!(registry.resolve("user").is_none());
        assert!(registry.resolve("xyz").is_none());
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_instantiate_tags_class() {
        let registry = Registry::builtin();
        let obj = registry.resolve("City").expect("City").instantiate();
        assert_eq!(obj.class_name(), "City");
        assert!(obj.attributes().is_empty());
    }

    #[test]
    fn test_custom_registry() {
        let registry = Registry::new([ModelClass::new("User")]);
        assert!(registry.contains("User"));
        assert!(!registry.contains("Review"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["User"]);
    }
}
