//! Attribute map attached to element nodes
//!
//! Reading a missing key is an error, not an empty default. An attribute
//! written as `<input disabled>` is present with the value `""`, which is
//! different from not being present at all.

use crate::error::{DomError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Ordered `name -> value` map. Keys are case-sensitive.
///
/// Serializes as a plain JSON object. Insertion order is kept so rendering
/// is stable and matches source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    entries: IndexMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-fail accessor
    pub fn get(&self, name: &str) -> Result<&str> {
        self.entries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| DomError::AttributeNotFound(name.to_string()))
    }

    /// Lenient accessor for traversal code that treats "missing" as "no match"
    pub fn get_opt(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Set (or overwrite) an attribute, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), value.into())
    }

    /// Delete an attribute. Deleting a missing attribute is an error.
    pub fn remove(&mut self, name: &str) -> Result<String> {
        self.entries
            .shift_remove(name)
            .ok_or_else(|| DomError::AttributeNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tokens of the space-separated `class` attribute
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.get_opt("class")
            .unwrap_or("")
            .split(' ')
            .filter(|class| !class.is_empty())
    }
}

/// Bulk indexed access. Panics on a missing key, like `HashMap`.
impl Index<&str> for Attributes {
    type Output = str;

    fn index(&self, name: &str) -> &str {
        &self.entries[name]
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let mut attrs = Attributes::new();
        assert!(matches!(
            attrs.get("foo"),
            Err(DomError::AttributeNotFound(name)) if name == "foo"
        ));

        attrs.set("foo", "bar");
        assert_eq!(attrs.get("foo").unwrap(), "bar");
        assert_eq!(&attrs["foo"], "bar");

        assert_eq!(attrs.remove("foo").unwrap(), "bar");
        assert!(attrs.remove("foo").is_err());
    }

    #[test]
    fn test_empty_value_is_not_missing() {
        let attrs: Attributes = [("custom-attribute", "")].into_iter().collect();
        assert_eq!(attrs.get("custom-attribute").unwrap(), "");
        assert!(attrs.get("other").is_err());
    }

    #[test]
    fn test_json_object_keeps_order() {
        let attrs: Attributes = [("type", "text"), ("name", "q"), ("value", "test")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"type":"text","name":"q","value":"test"}"#);

        let back: Attributes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attrs);
        let names: Vec<_> = back.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["type", "name", "value"]);
    }

    #[test]
    fn test_class_list() {
        let attrs: Attributes = [("class", " a  b c ")].into_iter().collect();
        assert_eq!(attrs.class_list().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(Attributes::new().class_list().count(), 0);
    }
}
