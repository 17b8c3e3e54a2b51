//! Where a connector reads state from.

use sctx_core::{Dispatch, Event, State, Store, Subscription};

/// A readable, subscribable state source with a dispatch entry point.
///
/// Implemented by [`Store`] (direct connection) and by
/// [`Context`](crate::Context) (connection through a provider).
pub trait StateSource {
    /// The currently known state, readable without waiting for an update.
    fn current_state(&self) -> State;

    /// The dispatch entry point to bind actions against.
    fn dispatch(&self) -> Dispatch;

    /// Register for subsequent state events.
    fn subscribe(&self, listener: Box<dyn Fn(&Event<State>)>) -> Subscription;
}

impl StateSource for Store {
    fn current_state(&self) -> State {
        Store::current_state(self)
    }

    fn dispatch(&self) -> Dispatch {
        Store::dispatch(self).clone()
    }

    fn subscribe(&self, listener: Box<dyn Fn(&Event<State>)>) -> Subscription {
        self.state_updates().subscribe(listener)
    }
}
