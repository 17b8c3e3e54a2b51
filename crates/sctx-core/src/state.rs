//! Immutable state snapshots.
//!
//! # Invariants
//!
//! 1. A `State` is never mutated after construction. [`State::with`] and
//!    [`State::merged`] return new snapshots and leave the receiver intact.
//! 2. Cloning is O(1): clones share one map behind an `Rc`.
//! 3. Equality is structural; [`State::ptr_eq`] is the identity check.

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::error::StoreError;

/// An immutable mapping from string keys to arbitrary JSON values.
///
/// No schema is enforced. Producers and consumers agree on the shape out
/// of band.
#[derive(Clone, Default, PartialEq)]
pub struct State {
    entries: Rc<Map<String, Value>>,
}

impl State {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object map.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            entries: Rc::new(map),
        }
    }

    /// Build a snapshot from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(StoreError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }

    /// Look up a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a nested value with a JSON pointer such as `/counter/value`.
    ///
    /// The empty pointer has no meaning for a map-of-values and returns
    /// `None`.
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        let rest = path.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let head = head.replace("~1", "/").replace("~0", "~");
        self.entries.get(head.as_str())?.pointer(tail)
    }

    /// Whether a top-level key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate top-level keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Iterate top-level entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Return a new snapshot with `key` set to `value`.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: Value) -> Self {
        let mut map = (*self.entries).clone();
        map.insert(key.into(), value);
        Self::from_map(map)
    }

    /// Return a new snapshot with `other`'s keys layered over `self`'s.
    #[must_use]
    pub fn merged(&self, other: &State) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut map = (*self.entries).clone();
        for (key, value) in other.iter() {
            map.insert(key.clone(), value.clone());
        }
        Self::from_map(map)
    }

    /// Borrow the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Copy the snapshot into a JSON object value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object((*self.entries).clone())
    }

    /// Whether both handles share the same underlying map.
    #[must_use]
    pub fn ptr_eq(a: &State, b: &State) -> bool {
        Rc::ptr_eq(&a.entries, &b.entries)
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl From<Map<String, Value>> for State {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl TryFrom<Value> for State {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for State {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
