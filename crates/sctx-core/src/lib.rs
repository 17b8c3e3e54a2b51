#![forbid(unsafe_code)]

//! Core: state snapshots, actions, push streams, and the store bundle.
//!
//! # Role in the workspace
//! `sctx-core` describes the store that the connector layer talks to. The
//! store itself (reducers, action routing) lives elsewhere; this crate only
//! fixes the shape of what it hands out:
//!
//! - **State**: immutable, cheaply clonable snapshot of string-keyed values.
//! - **Action / Dispatch**: the opaque value and the single mutation entry.
//! - **Stream / Subscription**: an ordered, multi-subscriber push sequence
//!   and the idempotent handle that owns one registration on it.
//! - **Store**: `{state_updates, dispatch, initial_state}`.
//!
//! # How it fits in the system
//! `sctx-connect` subscribes to a [`Store`]'s [`StateStream`], projects each
//! snapshot, and hands merged payloads to render functions. Nothing in this
//! crate knows about rendering.
//!
//! # Threading
//! Everything here is single-threaded (`Rc`-based). Delivery is cooperative:
//! the store pushes, listeners react, nothing blocks.

pub mod action;
pub mod error;
pub mod state;
pub mod store;
pub mod stream;

#[cfg(feature = "test-helpers")]
pub mod testing;

pub use action::{Action, Dispatch};
pub use error::{StoreError, StreamError};
pub use state::State;
pub use store::{StateStream, Store};
pub use stream::{Event, Stream, StreamStatus, Subscription};
