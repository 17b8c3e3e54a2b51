//! The merged render payload.
//!
//! # Merge order
//!
//! Entries are layered like an object spread, later layers winning on key
//! collisions:
//!
//! 1. pass-through props
//! 2. bound actions
//! 3. projected state
//! 4. `dispatch`, always present under [`DISPATCH_KEY`]
//!
//! So bound actions and projected state may shadow props, and nothing
//! shadows `dispatch`.

use std::collections::BTreeMap;

use sctx_core::{Dispatch, State};
use serde_json::Value;

use crate::binder::{BoundAction, BoundActions};
use crate::projector::Props;

/// Key under which the dispatch function is always available.
pub const DISPATCH_KEY: &str = "dispatch";

/// A resolved payload entry, tagged with the layer it came from.
#[derive(Debug, Clone)]
pub enum PayloadEntry {
    /// A pass-through prop.
    Prop(Value),
    /// A bound action.
    Action(BoundAction),
    /// A key of the projected state.
    State(Value),
    /// The store's dispatch function.
    Dispatch(Dispatch),
}

impl PayloadEntry {
    /// The JSON value, for prop and state entries.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Prop(value) | Self::State(value) => Some(value),
            Self::Action(_) | Self::Dispatch(_) => None,
        }
    }
}

/// What a render function receives.
#[derive(Debug, Clone)]
pub struct Payload {
    entries: BTreeMap<String, PayloadEntry>,
    props: Props,
    actions: BoundActions,
    state: State,
    dispatch: Dispatch,
}

impl Payload {
    /// Merge the four layers into one payload.
    #[must_use]
    pub fn merge(props: &Props, actions: &BoundActions, state: &State, dispatch: &Dispatch) -> Self {
        let mut entries = BTreeMap::new();
        for (key, value) in props.iter() {
            entries.insert(key.clone(), PayloadEntry::Prop(value.clone()));
        }
        for (key, action) in actions.iter() {
            entries.insert(key.clone(), PayloadEntry::Action(action.clone()));
        }
        for (key, value) in state.iter() {
            entries.insert(key.clone(), PayloadEntry::State(value.clone()));
        }
        entries.insert(DISPATCH_KEY.to_owned(), PayloadEntry::Dispatch(dispatch.clone()));

        Self {
            entries,
            props: props.clone(),
            actions: actions.clone(),
            state: state.clone(),
            dispatch: dispatch.clone(),
        }
    }

    /// Resolve a key through the merge order.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PayloadEntry> {
        self.entries.get(key)
    }

    /// Resolve a key to a JSON value (a prop or a state key).
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(PayloadEntry::as_value)
    }

    /// Resolve a JSON pointer such as `/counter/value` against the merged
    /// values.
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        let rest = path.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let head = head.replace("~1", "/").replace("~0", "~");
        self.value(&head)?.pointer(tail)
    }

    /// Resolve a key to a bound action, if that key is not shadowed by
    /// projected state.
    #[must_use]
    pub fn action(&self, key: &str) -> Option<&BoundAction> {
        match self.get(key)? {
            PayloadEntry::Action(action) => Some(action),
            _ => None,
        }
    }

    /// The dispatch function.
    #[must_use]
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// The projected state layer on its own.
    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The pass-through props layer on its own.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The bound actions layer on its own.
    #[must_use]
    pub fn actions(&self) -> &BoundActions {
        &self.actions
    }

    /// All resolved keys, in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Number of resolved keys (always at least one: `dispatch`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: `dispatch` is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
