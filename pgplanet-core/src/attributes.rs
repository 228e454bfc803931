//! Per-record scratch storage for captured attributes.
//!
//! An [`AttributeList`] is an ordered multimap of `(name, value)` string
//! pairs. The parse state machine owns three of them (record keys, tags and
//! child references) and clears each one between records instead of freeing
//! entries one by one.

/// Outcome of [`AttributeList::push_unique`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The pair was appended.
    Added,
    /// An identical pair was already present; nothing changed.
    Duplicate,
}

/// Ordered `(name, value)` pairs scoped to a single record.
///
/// Lookups scan linearly and return the first match in insertion order. The
/// lists stay small (a handful of tags or child references per record), so a
/// scan beats hashing.
///
/// # Examples
/// ```
/// use pgplanet_core::AttributeList;
///
/// let mut tags = AttributeList::default();
/// tags.push("name", "Foo");
/// tags.push("name", "Bar");
///
/// assert_eq!(tags.get("name"), Some("Foo"));
/// assert_eq!(tags.len(), 2);
/// tags.clear();
/// assert!(tags.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    entries: Vec<(String, String)>,
}

impl AttributeList {
    /// Append a pair without checking for duplicates.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Append a pair unless an identical `(name, value)` pair already exists.
    ///
    /// # Examples
    /// ```
    /// use pgplanet_core::{AttributeList, attributes::Insertion};
    ///
    /// let mut refs = AttributeList::default();
    /// assert_eq!(refs.push_unique("id", "7"), Insertion::Added);
    /// assert_eq!(refs.push_unique("id", "7"), Insertion::Duplicate);
    /// assert_eq!(refs.len(), 1);
    /// ```
    pub fn push_unique(&mut self, name: &str, value: &str) -> Insertion {
        let exists = self
            .entries
            .iter()
            .any(|(existing_name, existing_value)| existing_name == name && existing_value == value);
        if exists {
            return Insertion::Duplicate;
        }
        self.push(name, value);
        Insertion::Added
    }

    /// Return the value of the first pair named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Iterate over the values of every pair named `name`.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard every pair, keeping the allocation for the next record.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
