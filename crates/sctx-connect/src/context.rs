//! Explicitly passed context handles.
//!
//! There is no ambient or global context. A [`Context`] is either handed
//! out by a [`Provider`](crate::Provider) or built from an explicit
//! [`ContextValue`] at the composition root, and is passed down by value.

use std::rc::Rc;

use sctx_core::{Dispatch, Event, State, Store, Subscription};

use crate::error::ConnectError;
use crate::provider::ProviderShared;
use crate::source::StateSource;

/// The state and dispatch pair visible to consumers.
#[derive(Debug, Clone)]
pub struct ContextValue {
    /// Current state snapshot.
    pub state: State,
    /// Store dispatch.
    pub dispatch: Dispatch,
}

impl ContextValue {
    /// A value with the given state and a dispatch that drops every action.
    #[must_use]
    pub fn detached(state: State) -> Self {
        Self {
            state,
            dispatch: Dispatch::noop(),
        }
    }
}

#[derive(Clone)]
enum ContextKind {
    Fixed(ContextValue),
    Provided(Rc<ProviderShared>),
}

/// A handle through which consumers read state and subscribe to updates.
#[derive(Clone)]
pub struct Context {
    kind: ContextKind,
}

impl Context {
    /// A context that always reports `value` and never updates.
    #[must_use]
    pub fn fixed(value: ContextValue) -> Self {
        Self {
            kind: ContextKind::Fixed(value),
        }
    }

    pub(crate) fn provided(shared: Rc<ProviderShared>) -> Self {
        Self {
            kind: ContextKind::Provided(shared),
        }
    }

    /// Snapshot of the current state and dispatch.
    #[must_use]
    pub fn value(&self) -> ContextValue {
        ContextValue {
            state: self.current_state(),
            dispatch: self.dispatch(),
        }
    }

    /// The fault of the providing store, if its sequence failed.
    #[must_use]
    pub fn fault(&self) -> Option<ConnectError> {
        match &self.kind {
            ContextKind::Fixed(_) => None,
            ContextKind::Provided(shared) => shared.fault(),
        }
    }

    /// Whether subscribing can still yield updates.
    #[must_use]
    pub fn is_live(&self) -> bool {
        match &self.kind {
            ContextKind::Fixed(_) => false,
            ContextKind::Provided(shared) => shared.is_live(),
        }
    }

    /// The providing store, if any.
    #[must_use]
    pub fn store(&self) -> Option<&Store> {
        match &self.kind {
            ContextKind::Fixed(_) => None,
            ContextKind::Provided(shared) => Some(shared.store()),
        }
    }
}

impl StateSource for Context {
    fn current_state(&self) -> State {
        match &self.kind {
            ContextKind::Fixed(value) => value.state.clone(),
            ContextKind::Provided(shared) => shared.current_state(),
        }
    }

    fn dispatch(&self) -> Dispatch {
        match &self.kind {
            ContextKind::Fixed(value) => value.dispatch.clone(),
            ContextKind::Provided(shared) => shared.store().dispatch().clone(),
        }
    }

    fn subscribe(&self, listener: Box<dyn Fn(&Event<State>)>) -> Subscription {
        match &self.kind {
            ContextKind::Fixed(_) => Subscription::inert(),
            ContextKind::Provided(shared) => shared.subscribe(listener),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            ContextKind::Fixed(_) => "fixed",
            ContextKind::Provided(_) => "provided",
        };
        f.debug_struct("Context")
            .field("kind", &kind)
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixed_context_reports_its_value() {
        let state = State::from_value(json!({ "theme": "dark" })).unwrap();
        let context = Context::fixed(ContextValue::detached(state.clone()));

        assert_eq!(context.current_state(), state);
        assert_eq!(context.value().state, state);
        assert!(context.fault().is_none());
        assert!(context.store().is_none());
        assert!(!context.is_live());
    }

    #[test]
    fn fixed_context_never_delivers() {
        let context = Context::fixed(ContextValue::detached(State::new()));
        let sub = context.subscribe(Box::new(|_| panic!("fixed context delivered")));
        assert!(sub.is_disposed());
    }
}
