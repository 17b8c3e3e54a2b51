#![forbid(unsafe_code)]

//! Lifecycle-bound connection between a state source and a render function.
//!
//! # Design
//!
//! A [`Connector`] owns at most one [`Subscription`] on its
//! [`StateSource`]. Its shared interior (`Rc<RefCell<..>>`) holds the
//! options, the latest payload, and the lifecycle phase; the subscription
//! callback only keeps a `Weak` to it, so dropping the connector is enough
//! to detach.
//!
//! ```text
//! Unmounted ──mount()──→ Mounted ──unmount()──→ Disposed
//! ```
//!
//! # Invariants
//!
//! 1. `mount()` computes the first payload synchronously from the source's
//!    current state before subscribing; the first render never waits.
//! 2. Every delivered state produces exactly one recompute and one change
//!    notification, in delivery order.
//! 3. After `unmount()` no change notification is emitted, even for an
//!    update already in flight.
//! 4. `unmount()` is idempotent; `Disposed` is terminal.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Stream error | Store sequence fails | Connector faults; change stream errors |
//! | Selector error on mount | Bad selector | `mount()` returns the error |
//! | Selector error on update | Bad selector | Connector faults; change stream errors |
//! | Use after unmount | Caller bug | `ConnectError::Disposed` |

use std::cell::RefCell;
use std::rc::Rc;

use sctx_core::{Dispatch, Event, State, Stream, StreamError, Subscription};
use tracing::{debug, debug_span, error, trace};

use crate::binder::{ActionMap, BoundActions, bind_actions};
use crate::config::ConnectConfig;
use crate::error::ConnectError;
use crate::payload::Payload;
use crate::projector::{Props, Selector, project};
use crate::source::StateSource;

/// Lifecycle phase of a [`Connector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorPhase {
    /// Created, not yet subscribed.
    Unmounted,
    /// Subscribed and delivering.
    Mounted,
    /// Torn down. Terminal.
    Disposed,
}

/// Everything a connector needs besides its source.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    /// Projection applied to every snapshot; identity when `None`.
    pub selector: Option<Selector>,
    /// Actions bound against the source's dispatch.
    pub actions: ActionMap,
    /// Pass-through props; `None` when the caller supplies none.
    pub props: Option<Props>,
    /// Naming and memoization.
    pub config: ConnectConfig,
}

impl ConnectOptions {
    /// Options with no selector, actions, or props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector.
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Set the action map.
    #[must_use]
    pub fn with_actions(mut self, actions: ActionMap) -> Self {
        self.actions = actions;
        self
    }

    /// Set the pass-through props.
    #[must_use]
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = Some(props);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ConnectConfig) -> Self {
        self.config = config;
        self
    }
}

struct ConnectorCore {
    phase: ConnectorPhase,
    options: ConnectOptions,
    dispatch: Dispatch,
    payload: Option<Rc<Payload>>,
    fault: Option<ConnectError>,
    /// Last binding, keyed by action-map and dispatch identity.
    memo: Option<(ActionMap, Dispatch, BoundActions)>,
    updates: u64,
}

impl ConnectorCore {
    fn bound_actions(&mut self) -> BoundActions {
        if !self.options.config.memoize_actions {
            return bind_actions(&self.options.actions, &self.dispatch);
        }
        if let Some((actions, dispatch, bound)) = &self.memo {
            if ActionMap::ptr_eq(actions, &self.options.actions)
                && Dispatch::ptr_eq(dispatch, &self.dispatch)
            {
                return bound.clone();
            }
        }
        let bound = bind_actions(&self.options.actions, &self.dispatch);
        self.memo = Some((
            self.options.actions.clone(),
            self.dispatch.clone(),
            bound.clone(),
        ));
        bound
    }

    fn recompute(&mut self, state: &State) -> Result<Rc<Payload>, ConnectError> {
        let _span = debug_span!(
            "connector.recompute",
            name = %self.options.config.display_name,
            update = self.updates
        )
        .entered();
        let actions = self.bound_actions();
        let projected = project(
            self.options.selector.as_ref(),
            state,
            self.options.props.as_ref(),
        )?;
        let empty = Props::new();
        let props = self.options.props.as_ref().unwrap_or(&empty);
        let payload = Rc::new(Payload::merge(props, &actions, &projected, &self.dispatch));
        self.payload = Some(Rc::clone(&payload));
        Ok(payload)
    }
}

/// A live connection from a [`StateSource`] to change listeners.
///
/// Dropping a connector unmounts it.
pub struct Connector<S: StateSource> {
    source: S,
    core: Rc<RefCell<ConnectorCore>>,
    changes: Stream<Rc<Payload>>,
    subscription: Option<Subscription>,
}

impl<S: StateSource> Connector<S> {
    /// Create an unmounted connector.
    pub fn new(source: S, options: ConnectOptions) -> Self {
        let dispatch = source.dispatch();
        Self {
            source,
            core: Rc::new(RefCell::new(ConnectorCore {
                phase: ConnectorPhase::Unmounted,
                options,
                dispatch,
                payload: None,
                fault: None,
                memo: None,
                updates: 0,
            })),
            changes: Stream::new(),
            subscription: None,
        }
    }

    /// Compute the first payload from the source's current state, then
    /// subscribe. Mounting an already mounted connector is a no-op.
    pub fn mount(&mut self) -> Result<(), ConnectError> {
        {
            let mut core = self.core.borrow_mut();
            match core.phase {
                ConnectorPhase::Mounted => return Ok(()),
                ConnectorPhase::Disposed => return Err(ConnectError::Disposed),
                ConnectorPhase::Unmounted => {}
            }
            let state = self.source.current_state();
            core.recompute(&state)?;
            core.phase = ConnectorPhase::Mounted;
            debug!(name = %core.options.config.display_name, "connector mounted");
        }

        let weak = Rc::downgrade(&self.core);
        let changes = self.changes.clone();
        let subscription = self.source.subscribe(Box::new(move |event| {
            if let Some(core) = weak.upgrade() {
                deliver(&core, &changes, event);
            }
        }));
        self.subscription = Some(subscription);

        match self.core.borrow().fault.clone() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Dispose the subscription and drop the payload. Idempotent.
    pub fn unmount(&mut self) {
        let previous = {
            let mut core = self.core.borrow_mut();
            let previous = core.phase;
            core.phase = ConnectorPhase::Disposed;
            core.payload = None;
            previous
        };
        if let Some(mut subscription) = self.subscription.take() {
            subscription.dispose();
        }
        if previous == ConnectorPhase::Mounted {
            debug!(
                name = %self.core.borrow().options.config.display_name,
                "connector unmounted"
            );
        }
    }

    /// Replace the pass-through props and, when mounted, re-project from
    /// the source's current state and notify listeners.
    ///
    /// If the selector rejects the new props, the previous props and
    /// payload stay in place and the error is returned.
    pub fn set_props(&mut self, props: Props) -> Result<(), ConnectError> {
        let payload = {
            let mut core = self.core.borrow_mut();
            if let Some(fault) = &core.fault {
                return Err(fault.clone());
            }
            match core.phase {
                ConnectorPhase::Disposed => return Err(ConnectError::Disposed),
                ConnectorPhase::Unmounted => {
                    core.options.props = Some(props);
                    return Ok(());
                }
                ConnectorPhase::Mounted => {}
            }
            let previous = core.options.props.replace(props);
            let state = self.source.current_state();
            match core.recompute(&state) {
                Ok(payload) => payload,
                Err(err) => {
                    core.options.props = previous;
                    return Err(err);
                }
            }
        };
        self.changes.next(payload);
        Ok(())
    }

    /// The most recently computed payload.
    pub fn current_payload(&self) -> Result<Rc<Payload>, ConnectError> {
        let core = self.core.borrow();
        if let Some(fault) = &core.fault {
            return Err(fault.clone());
        }
        match core.phase {
            ConnectorPhase::Unmounted => Err(ConnectError::NotMounted),
            ConnectorPhase::Disposed => Err(ConnectError::Disposed),
            ConnectorPhase::Mounted => core.payload.clone().ok_or(ConnectError::NotMounted),
        }
    }

    /// Call `f` with the current payload.
    pub fn render<R>(&self, f: impl FnOnce(&Payload) -> R) -> Result<R, ConnectError> {
        let payload = self.current_payload()?;
        Ok(f(&payload))
    }

    /// Call `f` with every new payload until the returned subscription is
    /// disposed or the connector unmounts.
    pub fn on_change(&self, f: impl Fn(&Payload) + 'static) -> Subscription {
        self.changes.subscribe(move |event| {
            if let Event::Next(payload) = event {
                f(payload);
            }
        })
    }

    /// The stream of recomputed payloads, including the terminal error if
    /// the connector faults.
    #[must_use]
    pub fn changes(&self) -> &Stream<Rc<Payload>> {
        &self.changes
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ConnectorPhase {
        self.core.borrow().phase
    }

    /// Whether the connector is mounted and not faulted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        let core = self.core.borrow();
        core.phase == ConnectorPhase::Mounted && core.fault.is_none()
    }

    /// Number of state updates applied since mount.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.core.borrow().updates
    }

    /// The source this connector reads from.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: StateSource> Drop for Connector<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<S: StateSource> std::fmt::Debug for Connector<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Connector")
            .field("name", &core.options.config.display_name)
            .field("phase", &core.phase)
            .field("updates", &core.updates)
            .field("fault", &core.fault)
            .finish_non_exhaustive()
    }
}

fn deliver(core: &RefCell<ConnectorCore>, changes: &Stream<Rc<Payload>>, event: &Event<State>) {
    let outcome = {
        let mut core = core.borrow_mut();
        if core.phase != ConnectorPhase::Mounted || core.fault.is_some() {
            trace!("late delivery ignored");
            return;
        }
        match event {
            Event::Next(state) => {
                core.updates += 1;
                core.recompute(state)
            }
            Event::Error(err) => Err(ConnectError::Stream(err.clone())),
            Event::Complete => {
                debug!(name = %core.options.config.display_name, "state stream completed");
                return;
            }
        }
    };

    match outcome {
        Ok(payload) => changes.next(payload),
        Err(fault) => {
            let stream_error = match &fault {
                ConnectError::Stream(err) => err.clone(),
                other => StreamError::new(other.to_string()),
            };
            {
                let mut core = core.borrow_mut();
                error!(
                    name = %core.options.config.display_name,
                    error = %fault,
                    "connector faulted"
                );
                core.fault = Some(fault);
                core.payload = None;
            }
            changes.error(stream_error);
        }
    }
}

/// Create and mount a connector on `source`.
pub fn connect<S: StateSource>(
    source: S,
    selector: Option<Selector>,
    actions: Option<ActionMap>,
) -> Result<Connector<S>, ConnectError> {
    let options = ConnectOptions {
        selector,
        actions: actions.unwrap_or_default(),
        ..ConnectOptions::default()
    };
    connect_with(source, options)
}

/// Create and mount a connector with full options.
pub fn connect_with<S: StateSource>(
    source: S,
    options: ConnectOptions,
) -> Result<Connector<S>, ConnectError> {
    let mut connector = Connector::new(source, options);
    connector.mount()?;
    Ok(connector)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
