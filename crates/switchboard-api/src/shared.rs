//! Shared wire primitives.

use core::fmt;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string-to-string map that keeps its entries in insertion order.
///
/// Route documents carry header rewrite tables as JSON objects, and the
/// editing surface treats the object's entry order as the display
/// order. A plain `HashMap` or `BTreeMap` would lose that, so this is a
/// small list-backed map with the exact update semantics the editor
/// relies on:
///
/// * [insert](OrderedMap::insert) on an existing key updates the value
///   in place and keeps the entry's position.
/// * [rename](OrderedMap::rename) is remove-then-insert, so a renamed
///   entry moves to the end of the map.
///
/// The rename behavior is inherited from the editing surface (the old
/// key is deleted and the new one appended) and is arguably a UX bug,
/// but downstream consumers see it on the wire today, so it stays.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedMap {
    entries: Vec<(String, String)>,
}

impl OrderedMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`. An existing entry is updated in place; a
    /// new entry is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Rename `old` to `new`, keeping its value.
    ///
    /// Defined as remove-then-insert: the renamed entry moves to the
    /// end of the map. Renaming onto an existing key overwrites it. A
    /// no-op if `old` is absent.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) {
        if let Some(value) = self.remove(old) {
            self.insert(new, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<const N: usize> From<[(&str, &str); N]> for OrderedMap {
    fn from(entries: [(&str, &str); N]) -> Self {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl Serialize for OrderedMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

struct OrderedMapVisitor;

impl<'de> Visitor<'de> for OrderedMapVisitor {
    type Value = OrderedMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of strings to strings")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut map = OrderedMap::new();
        // a duplicate key keeps its first position, matching JSON
        // object parsing where the last value wins
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for OrderedMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor)
    }
}
