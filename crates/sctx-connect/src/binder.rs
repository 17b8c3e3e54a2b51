//! Action binding.
//!
//! An [`ActionMap`] names the actions a consumer may trigger. Each entry is
//! either a literal [`Action`] or an [`ActionCreator`]. Binding against a
//! [`Dispatch`] produces [`BoundActions`]:
//!
//! - a creator becomes a [`BoundCreator`]: calling it builds the action from
//!   the given arguments and dispatches it, exactly once per call;
//! - a literal passes through untouched. The render function dispatches it
//!   explicitly with the payload's `dispatch`.
//!
//! Binding never dispatches anything by itself and has no side effects, so
//! it is safe to run on every projection cycle.

use std::collections::BTreeMap;
use std::rc::Rc;

use sctx_core::{Action, Dispatch};
use serde_json::Value;
use tracing::trace;

use crate::error::ConnectError;

type CreatorFn = dyn Fn(&[Value]) -> Result<Action, String>;

/// A function from positional arguments to an [`Action`].
#[derive(Clone)]
pub struct ActionCreator {
    f: Rc<CreatorFn>,
}

impl ActionCreator {
    /// Wrap an infallible creator.
    pub fn new(f: impl Fn(&[Value]) -> Action + 'static) -> Self {
        Self {
            f: Rc::new(move |args: &[Value]| Ok(f(args))),
        }
    }

    /// Wrap a creator that can reject its arguments.
    pub fn try_new<E: std::fmt::Display>(
        f: impl Fn(&[Value]) -> Result<Action, E> + 'static,
    ) -> Self {
        Self {
            f: Rc::new(move |args: &[Value]| f(args).map_err(|e| e.to_string())),
        }
    }

    /// Build an action from `args`.
    pub fn create(&self, args: &[Value]) -> Result<Action, String> {
        (self.f)(args)
    }
}

impl std::fmt::Debug for ActionCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionCreator").finish_non_exhaustive()
    }
}

/// One named entry of an [`ActionMap`].
#[derive(Debug, Clone)]
pub enum ActionDescriptor {
    /// A ready-made action, passed through unbound.
    Literal(Action),
    /// A creator, bound to dispatch.
    Creator(ActionCreator),
}

/// Named action descriptors supplied by a consumer.
///
/// Clones share storage, so [`ActionMap::ptr_eq`] identifies "the same map"
/// across render cycles.
#[derive(Debug, Clone, Default)]
pub struct ActionMap {
    entries: Rc<BTreeMap<String, ActionDescriptor>>,
}

impl ActionMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal action.
    #[must_use]
    pub fn literal(self, name: impl Into<String>, action: Action) -> Self {
        self.insert(name, ActionDescriptor::Literal(action))
    }

    /// Add an action creator.
    #[must_use]
    pub fn creator(
        self,
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> Action + 'static,
    ) -> Self {
        self.insert(name, ActionDescriptor::Creator(ActionCreator::new(f)))
    }

    /// Add any descriptor, replacing an existing entry with the same name.
    #[must_use]
    pub fn insert(mut self, name: impl Into<String>, descriptor: ActionDescriptor) -> Self {
        Rc::make_mut(&mut self.entries).insert(name.into(), descriptor);
        self
    }

    /// Look up a descriptor.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionDescriptor> {
        self.entries.get(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ActionDescriptor)> {
        self.entries.iter()
    }

    /// Whether both handles share the same storage.
    #[must_use]
    pub fn ptr_eq(a: &ActionMap, b: &ActionMap) -> bool {
        Rc::ptr_eq(&a.entries, &b.entries)
    }
}

/// An action creator bound to a dispatch function.
#[derive(Clone)]
pub struct BoundCreator {
    name: String,
    creator: ActionCreator,
    dispatch: Dispatch,
}

impl BoundCreator {
    /// Build the action from `args` and dispatch it.
    ///
    /// The creator sees exactly `args`. If it fails nothing is dispatched.
    pub fn call(&self, args: &[Value]) -> Result<(), ConnectError> {
        let action = self
            .creator
            .create(args)
            .map_err(|message| ConnectError::ActionCreator {
                name: self.name.clone(),
                message,
            })?;
        trace!(action = %self.name, kind = action.kind(), "dispatching bound action");
        self.dispatch.call(action);
        Ok(())
    }

    /// Name of the entry this creator was bound from.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for BoundCreator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCreator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One entry of [`BoundActions`].
#[derive(Debug, Clone)]
pub enum BoundAction {
    /// A literal, passed through for the caller to dispatch.
    Literal(Action),
    /// A creator wired to dispatch.
    Creator(BoundCreator),
}

impl BoundAction {
    /// The literal action, if this entry is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Action> {
        match self {
            Self::Literal(action) => Some(action),
            Self::Creator(_) => None,
        }
    }

    /// The bound creator, if this entry is one.
    #[must_use]
    pub fn as_creator(&self) -> Option<&BoundCreator> {
        match self {
            Self::Creator(creator) => Some(creator),
            Self::Literal(_) => None,
        }
    }
}

/// Result of [`bind_actions`]: the same names, bound.
#[derive(Debug, Clone, Default)]
pub struct BoundActions {
    entries: BTreeMap<String, BoundAction>,
}

impl BoundActions {
    /// Look up a bound entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoundAction> {
        self.entries.get(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BoundAction)> {
        self.entries.iter()
    }
}

/// Bind every entry of `actions` against `dispatch`.
///
/// The result is fresh on every call; nothing is cached here.
#[must_use]
pub fn bind_actions(actions: &ActionMap, dispatch: &Dispatch) -> BoundActions {
    let entries = actions
        .iter()
        .map(|(name, descriptor)| {
            let bound = match descriptor {
                ActionDescriptor::Literal(action) => BoundAction::Literal(action.clone()),
                ActionDescriptor::Creator(creator) => BoundAction::Creator(BoundCreator {
                    name: name.clone(),
                    creator: creator.clone(),
                    dispatch: dispatch.clone(),
                }),
            };
            (name.clone(), bound)
        })
        .collect();
    BoundActions { entries }
}
