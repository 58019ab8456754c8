//! Case-insensitive header map shared by requests and responses.
//!
//! HTTP header names compare equal regardless of ASCII case, but the casing a
//! peer sent is worth keeping for display and debugging. This map compares
//! keys case-insensitively while storing the original spelling of the first
//! insertion.

/// An insertion-ordered map of HTTP header name/value pairs.
///
/// Keys are unique under ASCII-case-insensitive comparison. Inserting a name
/// that is already present (in any casing) overwrites the stored value and
/// keeps the stored name's spelling, so the map size does not change.
///
/// Header counts are small in practice, so lookups scan the backing vector
/// instead of hashing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Default::default()
    }

    /// Inserts a header, overwriting the value of an existing entry whose
    /// name matches case-insensitively. The first-seen name casing is kept.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(stored, _)| stored.eq_ignore_ascii_case(&name)) {
            Some((_, stored_value)) => *stored_value = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Looks up a header value by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(stored, _)| stored.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    /// Returns true if a header with this name is present, in any casing.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
