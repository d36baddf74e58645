//! Ordered header fields with case-insensitive lookup.
//!
//! Unlike [`http::HeaderMap`], [`HeaderFields`] keeps every name exactly as it
//! was received or supplied, and keeps the original order. This matters for
//! pass-through and for the writer, which emits headers in insertion order.

use std::fmt;
use std::slice::Iter;

/// An ordered list of `name: value` pairs.
///
/// Lookups through [`HeaderFields::get`] match names ASCII case-insensitively
/// and return the first matching value, so a duplicated header keeps the value
/// that arrived first.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    entries: Vec<(String, String)>,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Appends a field, keeping any earlier field with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns the first value whose name matches `name`, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    /// Returns every value whose name matches `name`, in received order.
    pub fn get_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.entries.iter().filter(move |(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Debug for HeaderFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect() }
    }
}

impl<'a> IntoIterator for &'a HeaderFields {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<Iter<'a, (String, String)>, fn(&'a (String, String)) -> (&'a str, &'a str)>;

    fn into_iter(self) -> Self::IntoIter {
        fn as_pair(entry: &(String, String)) -> (&str, &str) {
            (entry.0.as_str(), entry.1.as_str())
        }
        self.entries.iter().map(as_pair)
    }
}
