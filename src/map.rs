//! Ordered map type for TOML tables.
//!
//! This module provides [`Table`], a wrapper around [`IndexMap`] used for the
//! document root and every nested table.
//!
//! ## Why IndexMap?
//!
//! - **Deterministic output**: the encoder writes keys in insertion order
//!   unless sorting is requested
//! - **Order-free equality**: two tables with the same entries compare equal
//!   whatever order they were inserted in
//!
//! ## Examples
//!
//! ```rust
//! use tidy_toml::{Table, Value};
//!
//! let mut table = Table::new();
//! table.insert("name".to_string(), Value::from("Alice"));
//! table.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::Value;
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// An ordered map of string keys to TOML values.
///
/// # Examples
///
/// ```rust
/// use tidy_toml::{Table, Value};
///
/// let mut table = Table::new();
/// table.insert("first".to_string(), Value::from(1));
/// table.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = table.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table(IndexMap<String, Value>);

/// A decoded TOML document is its root table.
pub type Document = Table;

impl Table {
    /// Creates an empty `Table`.
    #[must_use]
    pub fn new() -> Self {
        Table(IndexMap::new())
    }

    /// Creates an empty `Table` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Table(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for `key`.
    ///
    /// A replaced key keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tidy_toml::{Table, Value};
    ///
    /// let mut table = Table::new();
    /// assert!(table.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(table.insert("key".to_string(), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Follows a path of keys through nested tables.
    ///
    /// ```rust
    /// let doc = tidy_toml::decode("[server.tls]\nport = 443").unwrap();
    /// let port = doc.get_path(&["server", "tls", "port"]).and_then(|v| v.as_i64());
    /// assert_eq!(port, Some(443));
    /// ```
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut table = self;
        for key in parents {
            table = table.get(key)?.as_table()?;
        }
        table.get(last)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the table, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the table, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.0.iter_mut()
    }

    /// Sorts the entries of this table by key. Nested tables are untouched.
    pub fn sort_keys(&mut self) {
        self.0.sort_keys();
    }
}

impl From<HashMap<String, Value>> for Table {
    fn from(map: HashMap<String, Value>) -> Self {
        Table(map.into_iter().collect())
    }
}

impl From<Table> for HashMap<String, Value> {
    fn from(table: Table) -> Self {
        table.0.into_iter().collect()
    }
}

impl IntoIterator for Table {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Table {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Table(IndexMap::from_iter(iter))
    }
}

impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = Table;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a TOML table")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Table, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table = Table::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry()? {
                    table.insert(key, value);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_order() {
        let a: Table = vec![
            ("x".to_string(), Value::from(1)),
            ("y".to_string(), Value::from(2)),
        ]
        .into_iter()
        .collect();
        let b: Table = vec![
            ("y".to_string(), Value::from(2)),
            ("x".to_string(), Value::from(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut table: Table = ["a", "b", "c"]
            .iter()
            .map(|k| (k.to_string(), Value::from(true)))
            .collect();
        table.remove("b");
        let keys: Vec<_> = table.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_get_path() {
        let mut inner = Table::new();
        inner.insert("leaf".to_string(), Value::from("x"));
        let mut root = Table::new();
        root.insert("inner".to_string(), Value::Table(inner));

        assert_eq!(
            root.get_path(&["inner", "leaf"]).and_then(Value::as_str),
            Some("x")
        );
        assert!(root.get_path(&["inner", "leaf", "deeper"]).is_none());
        assert!(root.get_path(&[]).is_none());
    }
}
