//! Actions and the dispatch entry point.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque tagged value understood by the store's dispatch function.
///
/// Serializes as `{"type": .., "payload": ..}`; the payload is omitted
/// when null. The connector layer never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    payload: Value,
}

impl Action {
    /// Create an action with the given type tag and no payload.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Value::Null,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// The type tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The payload (`Value::Null` when absent).
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// The store's single mutation entry point.
///
/// Cloning shares the same function. Dispatch is re-entrancy safe from the
/// caller's point of view: it may be invoked from inside a listener.
#[derive(Clone)]
pub struct Dispatch {
    f: Rc<dyn Fn(Action)>,
}

impl Dispatch {
    /// Wrap a dispatch function.
    pub fn new(f: impl Fn(Action) + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    /// A dispatch that drops every action.
    ///
    /// Used for explicitly constructed default contexts that have no store.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Hand an action to the store.
    pub fn call(&self, action: Action) {
        (self.f)(action);
    }

    /// Whether both handles wrap the same function.
    #[must_use]
    pub fn ptr_eq(a: &Dispatch, b: &Dispatch) -> bool {
        Rc::ptr_eq(&a.f, &b.f)
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}
