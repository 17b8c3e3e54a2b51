//! Reducer-backed fixture store for tests and demos.
//!
//! This is a fixture, not a state engine: each named slice owns a reducer
//! that returns `Some(new_slice)` for actions it handles and `None`
//! otherwise. A dispatch that no slice handles emits nothing.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value, json};

use crate::action::{Action, Dispatch};
use crate::state::State;
use crate::store::{StateStream, Store};

/// Type tag of the counter fixture's increment action.
pub const INCREMENT: &str = "increment";
/// Type tag of the counter fixture's decrement action.
pub const DECREMENT: &str = "decrement";

type SliceReducer = Box<dyn Fn(&Value, &Action) -> Option<Value>>;

struct Slice {
    name: String,
    reducer: SliceReducer,
}

struct Core {
    state: State,
    slices: Vec<Slice>,
    log: Vec<Action>,
}

/// Builder for [`ReducerStore`].
#[derive(Default)]
pub struct ReducerStoreBuilder {
    initial: Map<String, Value>,
    slices: Vec<Slice>,
}

impl ReducerStoreBuilder {
    /// Add a named slice with its initial value and reducer.
    #[must_use]
    pub fn slice(
        mut self,
        name: impl Into<String>,
        initial: Value,
        reducer: impl Fn(&Value, &Action) -> Option<Value> + 'static,
    ) -> Self {
        let name = name.into();
        self.initial.insert(name.clone(), initial);
        self.slices.push(Slice {
            name,
            reducer: Box::new(reducer),
        });
        self
    }

    /// Finish the store.
    #[must_use]
    pub fn build(self) -> ReducerStore {
        let initial_state = State::from_map(self.initial);
        let updates = StateStream::new();
        let core = Rc::new(RefCell::new(Core {
            state: initial_state.clone(),
            slices: self.slices,
            log: Vec::new(),
        }));

        let dispatch_core = Rc::clone(&core);
        let emitter = updates.clone();
        let dispatch = Dispatch::new(move |action: Action| {
            let next = {
                let mut core = dispatch_core.borrow_mut();
                core.log.push(action.clone());
                let mut map = core.state.as_map().clone();
                let mut changed = false;
                for slice in &core.slices {
                    let current = map.get(&slice.name).cloned().unwrap_or(Value::Null);
                    if let Some(value) = (slice.reducer)(&current, &action) {
                        map.insert(slice.name.clone(), value);
                        changed = true;
                    }
                }
                if !changed {
                    return;
                }
                let next = State::from_map(map);
                core.state = next.clone();
                next
            };
            emitter.next(next);
        });

        ReducerStore {
            store: Store::new(updates, dispatch, initial_state),
            core,
        }
    }
}

/// A [`Store`] driven by per-slice reducers, with a log of dispatched actions.
#[derive(Clone)]
pub struct ReducerStore {
    store: Store,
    core: Rc<RefCell<Core>>,
}

impl ReducerStore {
    /// Start building a store.
    #[must_use]
    pub fn builder() -> ReducerStoreBuilder {
        ReducerStoreBuilder::default()
    }

    /// The store bundle.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Every action dispatched so far, in order.
    #[must_use]
    pub fn dispatched(&self) -> Vec<Action> {
        self.core.borrow().log.clone()
    }

    /// Number of actions dispatched so far.
    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        self.core.borrow().log.len()
    }
}

/// The counter fixture's increment action.
#[must_use]
pub fn increment() -> Action {
    Action::new(INCREMENT)
}

/// A store with one `counter` slice, `{"value": 0}`, that handles
/// [`INCREMENT`] and [`DECREMENT`].
#[must_use]
pub fn counter_store() -> ReducerStore {
    ReducerStore::builder()
        .slice("counter", json!({ "value": 0 }), |slice, action| {
            let value = slice.get("value").and_then(Value::as_i64).unwrap_or(0);
            match action.kind() {
                INCREMENT => Some(json!({ "value": value + 1 })),
                DECREMENT => Some(json!({ "value": value - 1 })),
                _ => None,
            }
        })
        .build()
}
