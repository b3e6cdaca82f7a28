//! Property store: an ordered multimap of attributed property values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute set of a single property value, always kept sorted by key.
pub type Attributes = BTreeMap<String, String>;

/// Errors raised by property store operations that address a missing entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The property name has no entries.
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// The entry index is past the end of the property's value list.
    #[error("Invalid index {index} for property {name} with {len} value(s)")]
    InvalidIndex {
        name: String,
        index: usize,
        len: usize,
    },
}

/// One occurrence of a property: a raw value plus its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyValue {
    pub value: String,
    pub attributes: Attributes,
}

impl PropertyValue {
    /// Creates a value without attributes.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            attributes: Attributes::new(),
        }
    }

    /// Creates a value with attributes.
    #[must_use]
    pub fn with_attributes(value: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            value: value.into(),
            attributes,
        }
    }
}

/// Values of a property collapsed by count.
///
/// Serializes as a bare string for a single value and as an array otherwise,
/// which is the shape used by the structured event representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompactValue {
    Single(String),
    Multiple(Vec<String>),
}

impl CompactValue {
    /// Returns the first value.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(values) => values.first().map(String::as_str),
        }
    }

    /// Returns every value in order.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(value) => vec![value],
            Self::Multiple(values) => values,
        }
    }

    /// Collapses a list: empty gives `None`, one value gives `Single`.
    #[must_use]
    pub fn from_vec(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(Self::Single),
            _ => Some(Self::Multiple(values)),
        }
    }
}

impl From<&str> for CompactValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

/// Per-component mapping from property name to its ordered values.
///
/// Names iterate in first-insertion order, which is also the serialization
/// order. Equality ignores name order but respects value order within a name.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    entries: Vec<(String, Vec<PropertyValue>)>,
}

impl PropertyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    /// Appends a value to `name`, creating the property if needed.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>, attributes: Attributes) {
        let name = name.into();
        let entry = PropertyValue::with_attributes(value, attributes);
        match self.position(&name) {
            Some(pos) => self.entries[pos].1.push(entry),
            None => self.entries.push((name, vec![entry])),
        }
    }

    /// Updates the value and/or attributes of entry `index` of `name`.
    ///
    /// An absent property is created through [`PropertyStore::add`]; `None`
    /// arguments leave the corresponding field untouched.
    ///
    /// ## Errors
    /// Returns `InvalidIndex` if the property exists but has no entry at `index`.
    pub fn update(
        &mut self,
        name: &str,
        value: Option<String>,
        attributes: Option<Attributes>,
        index: usize,
    ) -> Result<(), PropertyError> {
        let Some(pos) = self.position(name) else {
            self.add(
                name,
                value.unwrap_or_default(),
                attributes.unwrap_or_default(),
            );
            return Ok(());
        };

        let values = &mut self.entries[pos].1;
        let len = values.len();
        let entry = values.get_mut(index).ok_or(PropertyError::InvalidIndex {
            name: name.to_string(),
            index,
            len,
        })?;

        if let Some(value) = value {
            entry.value = value;
        }
        if let Some(attributes) = attributes {
            entry.attributes = attributes;
        }

        Ok(())
    }

    /// Removes entry `index` of `name`, dropping the name once it is empty.
    ///
    /// ## Errors
    /// Returns `UnknownProperty` for an absent name and `InvalidIndex` for an
    /// out-of-range index.
    pub fn remove(&mut self, name: &str, index: usize) -> Result<PropertyValue, PropertyError> {
        let pos = self
            .position(name)
            .ok_or_else(|| PropertyError::UnknownProperty(name.to_string()))?;

        let values = &mut self.entries[pos].1;
        if index >= values.len() {
            return Err(PropertyError::InvalidIndex {
                name: name.to_string(),
                index,
                len: values.len(),
            });
        }

        let removed = values.remove(index);
        if values.is_empty() {
            self.entries.remove(pos);
        }

        Ok(removed)
    }

    /// Removes every entry of `name`, returning them. Absent names yield nothing.
    pub fn remove_all(&mut self, name: &str) -> Vec<PropertyValue> {
        match self.position(name) {
            Some(pos) => self.entries.remove(pos).1,
            None => Vec::new(),
        }
    }

    /// Returns the entries of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[PropertyValue]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Returns entry `index` of `name` mutably.
    #[must_use]
    pub fn get_mut(&mut self, name: &str, index: usize) -> Option<&mut PropertyValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .and_then(|(_, values)| values.get_mut(index))
    }

    /// Returns entry `index` of `name`.
    ///
    /// ## Errors
    /// Returns `UnknownProperty` or `InvalidIndex` when the entry does not exist.
    pub fn entry(&self, name: &str, index: usize) -> Result<&PropertyValue, PropertyError> {
        let values = self
            .get(name)
            .ok_or_else(|| PropertyError::UnknownProperty(name.to_string()))?;
        values.get(index).ok_or(PropertyError::InvalidIndex {
            name: name.to_string(),
            index,
            len: values.len(),
        })
    }

    /// Returns the raw values of `name` in order; empty when absent.
    #[must_use]
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|values| values.iter().map(|v| v.value.as_str()).collect())
            .unwrap_or_default()
    }

    /// Returns `None`, the single value, or every value of `name`.
    #[must_use]
    pub fn values_compact(&self, name: &str) -> Option<CompactValue> {
        CompactValue::from_vec(self.values(name).into_iter().map(String::from).collect())
    }

    /// Returns the first value of `name`.
    #[must_use]
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.get(name)?.first().map(|v| v.value.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Iterates property names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PropertyValue])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Iterates `(name, values)` pairs mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<PropertyValue>)> {
        self.entries
            .iter_mut()
            .map(|(name, values)| (name.as_str(), values))
    }

    /// Number of distinct property names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sorted(&self) -> BTreeMap<&str, &[PropertyValue]> {
        self.iter().collect()
    }
}

impl PartialEq for PropertyStore {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.sorted() == other.sorted()
    }
}

impl Eq for PropertyStore {}

/// Property and attribute names with special handling.
pub mod names {
    pub const UID: &str = "UID";
    pub const DTSTART: &str = "DTSTART";
    pub const DTEND: &str = "DTEND";
    pub const SUMMARY: &str = "SUMMARY";
    pub const LOCATION: &str = "LOCATION";
    pub const ATTENDEE: &str = "ATTENDEE";
    pub const VERSION: &str = "VERSION";
    pub const PRODID: &str = "PRODID";

    /// Calendar-level default timezone declared by common producers.
    pub const X_WR_TIMEZONE: &str = "X-WR-TIMEZONE";

    /// Attribute naming the timezone of a date value.
    pub const TZID: &str = "TZID";

    /// Attribute naming the value type (`DATE`, `DATE-TIME`, ...).
    pub const VALUE: &str = "VALUE";
}
