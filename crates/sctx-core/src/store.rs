//! The store capability bundle.

use crate::action::Dispatch;
use crate::state::State;
use crate::stream::Stream;

/// The store's push sequence of state snapshots.
pub type StateStream = Stream<State>;

/// What an external store hands to the connector layer.
///
/// The bundle is never mutated here; it is a set of capabilities:
/// a sequence of snapshots, a dispatch function, and the state that holds
/// before the first snapshot arrives.
#[derive(Clone, Debug)]
pub struct Store {
    state_updates: StateStream,
    dispatch: Dispatch,
    initial_state: State,
}

impl Store {
    /// Bundle the three store capabilities.
    #[must_use]
    pub fn new(state_updates: StateStream, dispatch: Dispatch, initial_state: State) -> Self {
        Self {
            state_updates,
            dispatch,
            initial_state,
        }
    }

    /// The sequence of state snapshots.
    #[must_use]
    pub fn state_updates(&self) -> &StateStream {
        &self.state_updates
    }

    /// The dispatch entry point.
    #[must_use]
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// State declared before any update.
    #[must_use]
    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// Latest delivered snapshot, or the initial state if none yet.
    #[must_use]
    pub fn current_state(&self) -> State {
        self.state_updates
            .last()
            .unwrap_or_else(|| self.initial_state.clone())
    }
}
