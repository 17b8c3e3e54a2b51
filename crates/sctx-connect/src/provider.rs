//! Store provider: one subscription for a whole subtree.
//!
//! A [`Provider`] subscribes once to its store and republishes every
//! snapshot through the [`Context`] handles it gives out. Descendants never
//! see the store's sequence directly.
//!
//! # Invariants
//!
//! 1. At most one live subscription to the store, held only while mounted.
//! 2. Until the first update arrives, the context reports the store's
//!    currently known state: the last snapshot it emitted, or its declared
//!    initial state if it has emitted nothing.
//! 3. After unmount, context readers see the store's current public state
//!    and new subscribers get an inert subscription.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use sctx_core::{Event, State, Store, Stream, Subscription};
use tracing::{debug, error, trace};

use crate::config::ProviderConfig;
use crate::context::{Context, ContextValue};
use crate::error::ConnectError;

/// Lifecycle phase of a [`Provider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderPhase {
    /// Created, not yet subscribed to the store.
    Unmounted,
    /// Subscribed and republishing.
    Mounted,
    /// Torn down. Terminal.
    Disposed,
}

/// State shared between a provider and the contexts it hands out.
pub(crate) struct ProviderShared {
    store: Store,
    phase: Cell<ProviderPhase>,
    published: RefCell<Option<State>>,
    fault: RefCell<Option<ConnectError>>,
    republished: Stream<State>,
    display_name: Cow<'static, str>,
}

impl ProviderShared {
    pub(crate) fn current_state(&self) -> State {
        if self.phase.get() == ProviderPhase::Disposed {
            return self.store.current_state();
        }
        self.published
            .borrow()
            .clone()
            .unwrap_or_else(|| self.store.current_state())
    }

    pub(crate) fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn fault(&self) -> Option<ConnectError> {
        self.fault.borrow().clone()
    }

    pub(crate) fn is_live(&self) -> bool {
        self.phase.get() != ProviderPhase::Disposed
    }

    pub(crate) fn subscribe(&self, listener: Box<dyn Fn(&Event<State>)>) -> Subscription {
        if !self.is_live() {
            trace!(provider = %self.display_name, "provider torn down; subscription is inert");
            return Subscription::inert();
        }
        self.republished.subscribe(listener)
    }

    fn receive(&self, event: &Event<State>) {
        if self.phase.get() != ProviderPhase::Mounted {
            trace!(provider = %self.display_name, "late delivery ignored");
            return;
        }
        match event {
            Event::Next(state) => {
                *self.published.borrow_mut() = Some(state.clone());
                self.republished.next(state.clone());
            }
            Event::Error(err) => {
                error!(provider = %self.display_name, error = %err, "store state stream failed");
                *self.fault.borrow_mut() = Some(ConnectError::Stream(err.clone()));
                self.republished.error(err.clone());
            }
            Event::Complete => {
                debug!(provider = %self.display_name, "store state stream completed");
            }
        }
    }
}

/// Makes a store available to every consumer reading its [`Context`].
///
/// Dropping a provider unmounts it.
pub struct Provider {
    shared: Rc<ProviderShared>,
    subscription: Option<Subscription>,
}

impl Provider {
    /// Create an unmounted provider for `store`.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self::with_config(store, ProviderConfig::default())
    }

    /// Create an unmounted provider with explicit configuration.
    #[must_use]
    pub fn with_config(store: Store, config: ProviderConfig) -> Self {
        Self {
            shared: Rc::new(ProviderShared {
                store,
                phase: Cell::new(ProviderPhase::Unmounted),
                published: RefCell::new(None),
                fault: RefCell::new(None),
                republished: Stream::new(),
                display_name: config.display_name,
            }),
            subscription: None,
        }
    }

    /// A handle descendants use to read state and subscribe.
    ///
    /// Handles may be taken before mount; they start delivering once the
    /// provider is mounted.
    #[must_use]
    pub fn context(&self) -> Context {
        Context::provided(Rc::clone(&self.shared))
    }

    /// Subscribe to the store. Mounting twice is a no-op.
    pub fn mount(&mut self) -> Result<(), ConnectError> {
        match self.shared.phase.get() {
            ProviderPhase::Mounted => return Ok(()),
            ProviderPhase::Disposed => return Err(ConnectError::Disposed),
            ProviderPhase::Unmounted => {}
        }
        self.shared.phase.set(ProviderPhase::Mounted);
        *self.shared.published.borrow_mut() = Some(self.shared.store.current_state());
        debug!(provider = %self.shared.display_name, "provider mounted");

        let weak = Rc::downgrade(&self.shared);
        let subscription = self.shared.store.state_updates().subscribe(move |event| {
            if let Some(shared) = weak.upgrade() {
                shared.receive(event);
            }
        });
        self.subscription = Some(subscription);

        match self.shared.fault() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Dispose the store subscription. Idempotent.
    pub fn unmount(&mut self) {
        let previous = self.shared.phase.replace(ProviderPhase::Disposed);
        if let Some(mut subscription) = self.subscription.take() {
            subscription.dispose();
        }
        if previous != ProviderPhase::Disposed {
            self.shared.republished.complete();
            debug!(provider = %self.shared.display_name, "provider unmounted");
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ProviderPhase {
        self.shared.phase.get()
    }

    /// The value currently published to descendants.
    pub fn value(&self) -> Result<ContextValue, ConnectError> {
        if let Some(fault) = self.shared.fault() {
            return Err(fault);
        }
        Ok(ContextValue {
            state: self.shared.current_state(),
            dispatch: self.shared.store.dispatch().clone(),
        })
    }

    /// Render `children` against this provider's context.
    pub fn render<R>(&self, children: impl FnOnce(&Context) -> R) -> Result<R, ConnectError> {
        if let Some(fault) = self.shared.fault() {
            return Err(fault);
        }
        Ok(children(&self.context()))
    }

    /// The store this provider publishes.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }
}

impl Drop for Provider {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.shared.display_name)
            .field("phase", &self.shared.phase.get())
            .field("fault", &self.shared.fault())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StateSource;
    use sctx_core::testing::{counter_store, increment};
    use sctx_core::{Dispatch, StateStream, StreamError};
    use serde_json::Value;

    fn counter(state: &State) -> Option<i64> {
        state.pointer("/counter/value").and_then(Value::as_i64)
    }

    #[test]
    fn context_reports_initial_state_before_updates() {
        let fixture = counter_store();
        let mut provider = Provider::new(fixture.store().clone());
        provider.mount().unwrap();

        let value = provider.value().unwrap();
        assert_eq!(counter(&value.state), Some(0));
        assert_eq!(counter(&provider.context().current_state()), Some(0));
    }

    #[test]
    fn republishes_updates() {
        let fixture = counter_store();
        let mut provider = Provider::new(fixture.store().clone());
        provider.mount().unwrap();
        let context = provider.context();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = context.subscribe(Box::new(move |event| {
            if let Event::Next(state) = event {
                sink.borrow_mut().push(counter(state));
            }
        }));

        fixture.store().dispatch().call(increment());
        fixture.store().dispatch().call(increment());

        assert_eq!(*seen.borrow(), vec![Some(1), Some(2)]);
        assert_eq!(counter(&context.current_state()), Some(2));
    }

    #[test]
    fn holds_one_store_subscription() {
        let fixture = counter_store();
        let mut provider = Provider::new(fixture.store().clone());
        provider.mount().unwrap();
        provider.mount().unwrap();
        assert_eq!(fixture.store().state_updates().subscriber_count(), 1);
    }

    #[test]
    fn unmount_stops_republishing() {
        let fixture = counter_store();
        let mut provider = Provider::new(fixture.store().clone());
        provider.mount().unwrap();
        let context = provider.context();

        let calls = Rc::new(Cell::new(0u32));
        let counter_calls = Rc::clone(&calls);
        let _sub = context.subscribe(Box::new(move |event| {
            if matches!(event, Event::Next(_)) {
                counter_calls.set(counter_calls.get() + 1);
            }
        }));

        fixture.store().dispatch().call(increment());
        provider.unmount();
        provider.unmount();
        fixture.store().dispatch().call(increment());

        assert_eq!(calls.get(), 1);
        assert_eq!(provider.phase(), ProviderPhase::Disposed);
        assert_eq!(fixture.store().state_updates().subscriber_count(), 0);
    }

    #[test]
    fn torn_down_context_reads_store_state_without_live_link() {
        let fixture = counter_store();
        let mut provider = Provider::new(fixture.store().clone());
        provider.mount().unwrap();
        let context = provider.context();
        provider.unmount();

        fixture.store().dispatch().call(increment());
        assert_eq!(counter(&context.current_state()), Some(1));

        let sub = context.subscribe(Box::new(|_| {}));
        assert!(sub.is_disposed());
        assert!(!context.is_live());
    }

    #[test]
    fn stream_error_is_fatal() {
        let updates = StateStream::new();
        let store = Store::new(updates.clone(), Dispatch::noop(), State::new());
        let mut provider = Provider::new(store);
        provider.mount().unwrap();

        updates.error(StreamError::new("lost"));

        let expected = ConnectError::Stream(StreamError::new("lost"));
        assert_eq!(provider.value().unwrap_err(), expected);
        assert_eq!(provider.render(|_| ()).unwrap_err(), expected);
    }

    #[test]
    fn mounted_after_emission_reports_latest_state() {
        let fixture = counter_store();
        fixture.store().dispatch().call(increment());

        let mut provider = Provider::new(fixture.store().clone());
        assert_eq!(counter(&provider.context().current_state()), Some(1));
        provider.mount().unwrap();

        assert_eq!(counter(&provider.value().unwrap().state), Some(1));
        assert_eq!(counter(&provider.context().current_state()), Some(1));

        fixture.store().dispatch().call(increment());
        assert_eq!(counter(&provider.context().current_state()), Some(2));
    }

    #[test]
    fn mount_after_unmount_is_rejected() {
        let fixture = counter_store();
        let mut provider = Provider::new(fixture.store().clone());
        provider.unmount();
        assert_eq!(provider.mount().unwrap_err(), ConnectError::Disposed);
    }
}
