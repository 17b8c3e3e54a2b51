#![forbid(unsafe_code)]

//! Push-based, multi-subscriber event stream with RAII subscriptions.
//!
//! # Design
//!
//! [`Stream<T>`] keeps its listeners in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). Listeners are held as `Weak` callbacks; the strong
//! side lives in the [`Subscription`] handed back to the subscriber, so
//! dropping or disposing the handle is enough to detach.
//!
//! # Invariants
//!
//! 1. Listeners are notified in registration order.
//! 2. Events are delivered in emission order. An event pushed from inside a
//!    listener is queued and delivered once the current event has reached
//!    every listener.
//! 3. After `error` or `complete` is emitted, further events are dropped.
//! 4. A disposed subscription never sees another event, including one that
//!    was already being delivered when it was disposed.
//! 5. `Subscription::dispose` is idempotent.
//!
//! # Failure Modes
//!
//! - **Late subscriber**: subscribing to a terminated stream replays the
//!   terminal event once and returns an already-disposed subscription.
//! - **Subscriber leak**: handles kept forever keep their callbacks alive.
//!   Dead weak references are pruned lazily on delivery.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::error::StreamError;

/// A single notification on a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    /// A new value.
    Next(T),
    /// The stream failed; no further events follow.
    Error(StreamError),
    /// The stream finished normally; no further events follow.
    Complete,
}

impl<T> Event<T> {
    /// Whether this event ends the stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Next(_))
    }
}

/// Lifecycle status of a stream, as observed by its listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    /// Still delivering values.
    Open,
    /// `complete` has been delivered.
    Completed,
    /// `error` has been delivered.
    Errored(StreamError),
}

impl StreamStatus {
    /// Whether the stream has delivered its terminal event.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

type CallbackRc<T> = Rc<dyn Fn(&Event<T>)>;
type CallbackWeak<T> = Weak<dyn Fn(&Event<T>)>;

struct Listener<T> {
    callback: CallbackWeak<T>,
    active: Rc<Cell<bool>>,
}

struct StreamInner<T> {
    listeners: Vec<Listener<T>>,
    last: Option<T>,
    status: StreamStatus,
    /// False once a terminal event has been queued.
    accepting: bool,
    delivering: bool,
    pending: VecDeque<Event<T>>,
    delivered: u64,
}

/// An ordered, multi-subscriber push sequence.
///
/// Cloning a `Stream` creates a new handle to the **same** sequence; any
/// handle can emit and any handle can subscribe.
pub struct Stream<T> {
    inner: Rc<RefCell<StreamInner<T>>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Stream")
            .field("last", &inner.last)
            .field("status", &inner.status)
            .field("delivered", &inner.delivered)
            .field("subscriber_count", &inner.listeners.len())
            .finish()
    }
}

impl<T: Clone + 'static> Default for Stream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Create an open stream with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StreamInner {
                listeners: Vec::new(),
                last: None,
                status: StreamStatus::Open,
                accepting: true,
                delivering: false,
                pending: VecDeque::new(),
                delivered: 0,
            })),
        }
    }

    /// Register a listener. The callback sees every event emitted after this
    /// call until the returned [`Subscription`] is disposed or dropped.
    pub fn subscribe(&self, callback: impl Fn(&Event<T>) + 'static) -> Subscription {
        let terminal = {
            let inner = self.inner.borrow();
            match &inner.status {
                StreamStatus::Open => None,
                StreamStatus::Completed => Some(Event::Complete),
                StreamStatus::Errored(err) => Some(Event::Error(err.clone())),
            }
        };
        if let Some(event) = terminal {
            trace!("subscribe on terminated stream; replaying terminal event");
            callback(&event);
            return Subscription::inert();
        }

        let strong: CallbackRc<T> = Rc::new(callback);
        let active = Rc::new(Cell::new(true));
        self.inner.borrow_mut().listeners.push(Listener {
            callback: Rc::downgrade(&strong),
            active: Rc::clone(&active),
        });
        Subscription {
            guard: Some(Box::new(strong)),
            active,
        }
    }

    /// Emit a value.
    pub fn next(&self, value: T) {
        self.push(Event::Next(value));
    }

    /// Terminate the stream with an error.
    pub fn error(&self, err: StreamError) {
        self.push(Event::Error(err));
    }

    /// Terminate the stream normally.
    pub fn complete(&self) {
        self.push(Event::Complete);
    }

    /// The most recently delivered value, if any.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.inner.borrow().last.clone()
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> StreamStatus {
        self.inner.borrow().status.clone()
    }

    /// Number of values delivered so far.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.inner.borrow().delivered
    }

    /// Number of registered listeners (including dead ones not yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn push(&self, event: Event<T>) {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.accepting {
                trace!("event dropped: stream already terminated");
                return;
            }
            if event.is_terminal() {
                inner.accepting = false;
            }
            inner.pending.push_back(event);
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }
        self.drain();
    }

    /// Deliver queued events one at a time, outside of any borrow.
    fn drain(&self) {
        loop {
            let (event, callbacks) = {
                let mut inner = self.inner.borrow_mut();
                let Some(event) = inner.pending.pop_front() else {
                    inner.delivering = false;
                    return;
                };
                match &event {
                    Event::Next(value) => {
                        inner.last = Some(value.clone());
                        inner.delivered += 1;
                    }
                    Event::Error(err) => inner.status = StreamStatus::Errored(err.clone()),
                    Event::Complete => inner.status = StreamStatus::Completed,
                }
                inner.listeners.retain(|l| l.callback.strong_count() > 0);
                let callbacks: Vec<(Rc<Cell<bool>>, CallbackRc<T>)> = inner
                    .listeners
                    .iter()
                    .filter_map(|l| l.callback.upgrade().map(|cb| (Rc::clone(&l.active), cb)))
                    .collect();
                if event.is_terminal() {
                    inner.listeners.clear();
                }
                (event, callbacks)
            };

            for (active, cb) in &callbacks {
                if active.get() {
                    cb(&event);
                }
            }
        }
    }
}

/// RAII handle owning exactly one listener registration.
///
/// Dropping the handle disposes it. Disposal clears the `active` flag
/// checked immediately before every delivery, so an event that is already
/// in flight is not delivered either.
pub struct Subscription {
    /// Type-erased strong reference keeping the callback `Rc` alive.
    guard: Option<Box<dyn std::any::Any>>,
    active: Rc<Cell<bool>>,
}

impl Subscription {
    /// A handle that owns no registration. Already disposed.
    #[must_use]
    pub fn inert() -> Self {
        Self {
            guard: None,
            active: Rc::new(Cell::new(false)),
        }
    }

    /// Release the registration. Calling this more than once is a no-op.
    pub fn dispose(&mut self) {
        if self.guard.take().is_some() {
            self.active.set(false);
            trace!("subscription disposed");
        }
    }

    /// Whether the registration has been released.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        !self.active.get()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
