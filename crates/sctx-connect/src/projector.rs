//! State projection: selectors and the identity default.
//!
//! A selector maps a snapshot (and, optionally, the pass-through props of
//! the consuming render call) to the partial state merged into the render
//! payload. Selectors are pure and run synchronously on mount and on every
//! update.

use std::rc::Rc;

use sctx_core::State;

use crate::error::ConnectError;

/// Pass-through properties handed to a consumer by its parent.
///
/// Props share the snapshot representation: string keys to JSON values.
pub type Props = State;

type SelectorFn = dyn Fn(&State, Option<&Props>) -> Result<State, String>;

/// A pure projection from `(state, props)` to a partial state.
///
/// `props` is `None` when the connector was created without pass-through
/// props; a selector that reads props must tolerate that.
#[derive(Clone)]
pub struct Selector {
    f: Rc<SelectorFn>,
}

impl Selector {
    /// Wrap an infallible selector.
    pub fn new(f: impl Fn(&State, Option<&Props>) -> State + 'static) -> Self {
        Self {
            f: Rc::new(move |state: &State, props: Option<&Props>| Ok(f(state, props))),
        }
    }

    /// Wrap a selector that can fail. The error is reported as
    /// [`ConnectError::Selector`].
    pub fn try_new<E: std::fmt::Display>(
        f: impl Fn(&State, Option<&Props>) -> Result<State, E> + 'static,
    ) -> Self {
        Self {
            f: Rc::new(move |state: &State, props: Option<&Props>| {
                f(state, props).map_err(|e| e.to_string())
            }),
        }
    }

    /// The identity projection: returns the full snapshot unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(|state, _| state.clone())
    }

    /// Run the selector.
    pub fn select(&self, state: &State, props: Option<&Props>) -> Result<State, ConnectError> {
        (self.f)(state, props).map_err(|message| ConnectError::Selector { message })
    }

    /// Whether both handles wrap the same function.
    #[must_use]
    pub fn ptr_eq(a: &Selector, b: &Selector) -> bool {
        Rc::ptr_eq(&a.f, &b.f)
    }
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector").finish_non_exhaustive()
    }
}

/// Apply `selector` (or the identity projection when absent) to a snapshot.
pub fn project(
    selector: Option<&Selector>,
    state: &State,
    props: Option<&Props>,
) -> Result<State, ConnectError> {
    match selector {
        Some(selector) => selector.select(state, props),
        None => Ok(state.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn state() -> State {
        State::from_value(json!({ "counter": { "value": 4 }, "user": "ada" })).unwrap()
    }

    #[test]
    fn absent_selector_is_identity() {
        let s = state();
        let projected = project(None, &s, None).unwrap();
        assert!(State::ptr_eq(&s, &projected));
    }

    #[test]
    fn identity_selector_returns_full_state() {
        let s = state();
        assert_eq!(project(Some(&Selector::identity()), &s, None).unwrap(), s);
    }

    #[test]
    fn selector_reads_props() {
        let selector = Selector::new(|_, props| {
            let text = props
                .and_then(|p| p.get("foo"))
                .cloned()
                .unwrap_or(Value::Null);
            [("text", text)].into_iter().collect()
        });
        let props: Props = [("foo", json!("bar"))].into_iter().collect();

        let projected = project(Some(&selector), &state(), Some(&props)).unwrap();
        assert_eq!(projected.get("text"), Some(&json!("bar")));

        let without = project(Some(&selector), &state(), None).unwrap();
        assert_eq!(without.get("text"), Some(&Value::Null));
    }

    #[test]
    fn fallible_selector_reports_error() {
        let selector = Selector::try_new(|state: &State, _| {
            state
                .pointer("/missing")
                .map(|_| State::new())
                .ok_or("missing slice")
        });
        let err = project(Some(&selector), &state(), None).unwrap_err();
        assert_eq!(
            err,
            ConnectError::Selector {
                message: "missing slice".into()
            }
        );
    }

    #[test]
    fn projection_does_not_touch_input() {
        let s = state();
        let selector = Selector::new(|state, _| state.with("extra", json!(1)));
        let projected = project(Some(&selector), &s, None).unwrap();
        assert!(projected.contains_key("extra"));
        assert!(!s.contains_key("extra"));
    }
}
