#![forbid(unsafe_code)]

//! Connector layer: binds a stream-backed store to render functions.
//!
//! # Pieces
//! - [`bind_actions`] turns an [`ActionMap`] into dispatch-bound callables.
//! - [`project`] applies a [`Selector`] (identity by default) to a snapshot.
//! - [`Connector`] owns one subscription and recomputes a [`Payload`] on
//!   every update.
//! - [`Provider`] subscribes once per store and republishes through a
//!   [`Context`]; [`Consumer`] connects through that context.
//! - [`with_stream`] wraps a [`Component`] so it renders through a consumer.
//!
//! # Payload merge order
//! Props, then bound actions, then projected state, then `dispatch`. Later
//! layers win on key collisions.
//!
//! # Lifecycle
//! Mounting computes the first payload from the source's current state
//! before any update arrives. Unmounting disposes the subscription; an
//! update already in flight is dropped. A failed state stream or a failing
//! selector faults the connector for good.

pub mod binder;
pub mod compose;
pub mod config;
pub mod connector;
pub mod consumer;
pub mod context;
pub mod error;
pub mod payload;
pub mod projector;
pub mod provider;
pub mod source;

pub use binder::{
    ActionCreator, ActionDescriptor, ActionMap, BoundAction, BoundActions, BoundCreator,
    bind_actions,
};
pub use compose::{Component, Connected, Named, WithStream, named, with_stream};
pub use config::{ConnectConfig, ProviderConfig};
pub use connector::{ConnectOptions, Connector, ConnectorPhase, connect, connect_with};
pub use consumer::Consumer;
pub use context::{Context, ContextValue};
pub use error::ConnectError;
pub use payload::{DISPATCH_KEY, Payload, PayloadEntry};
pub use projector::{Props, Selector, project};
pub use provider::{Provider, ProviderPhase};
pub use source::StateSource;
