//! Multi-valued RPC metadata

use std::collections::hash_map::{self, HashMap};

/// Out-of-band key/value side-channel carried alongside an RPC payload.
///
/// Keys are ASCII case-insensitive and stored lowercase, as gRPC metadata
/// keys are. Each key holds its values in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBundle {
    entries: HashMap<String, Vec<String>>,
}

impl MetadataBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all values of `key` with a single value
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(normalize(key.as_ref()), vec![value.into()]);
    }

    /// Add a value to `key`, keeping any existing ones
    pub fn append(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .entry(normalize(key.as_ref()))
            .or_default()
            .push(value.into());
    }

    /// First value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// All values of `key`, empty if absent
    pub fn get_all(&self, key: &str) -> &[String] {
        self.lookup(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Remove `key` and return its values
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.remove(&normalize(key))
    }

    /// Check whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no keys are present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys and their value sequences, in no particular order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    fn lookup(&self, key: &str) -> Option<&Vec<String>> {
        if key.bytes().any(|b| b.is_ascii_uppercase()) {
            self.entries.get(&normalize(key))
        } else {
            self.entries.get(key)
        }
    }
}

fn normalize(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// Iterator over the entries of a [`MetadataBundle`]
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, Vec<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [String]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a MetadataBundle {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for MetadataBundle {
    /// Repeated keys accumulate values, like a list of header lines.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bundle = Self::new();
        bundle.extend(iter);
        bundle
    }
}

impl<K: AsRef<str>, V: Into<String>> Extend<(K, V)> for MetadataBundle {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.append(key, value);
        }
    }
}
