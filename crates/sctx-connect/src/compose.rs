//! `with_stream`: wrap a component so it renders through a [`Consumer`].
//!
//! ```ignore
//! let counter = with_stream(Some(selector), Some(actions)).wrap(named("Counter", view));
//! let output = counter.render(&context, props)?;
//! ```

use crate::binder::ActionMap;
use crate::connector::Connector;
use crate::consumer::Consumer;
use crate::context::Context;
use crate::error::ConnectError;
use crate::payload::Payload;
use crate::projector::{Props, Selector};

/// Something that renders a [`Payload`].
pub trait Component {
    /// What rendering produces.
    type Output;

    /// Render from the merged payload.
    fn render(&self, payload: &Payload) -> Self::Output;

    /// Name used when deriving the wrapper's display name.
    fn display_name(&self) -> Option<&str> {
        None
    }
}

impl<F, R> Component for F
where
    F: Fn(&Payload) -> R,
{
    type Output = R;

    fn render(&self, payload: &Payload) -> R {
        self(payload)
    }
}

/// A component with an explicit display name.
#[derive(Debug, Clone)]
pub struct Named<C> {
    name: String,
    inner: C,
}

impl<C: Component> Component for Named<C> {
    type Output = C::Output;

    fn render(&self, payload: &Payload) -> Self::Output {
        self.inner.render(payload)
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Give `component` a display name.
pub fn named<C: Component>(name: impl Into<String>, component: C) -> Named<C> {
    Named {
        name: name.into(),
        inner: component,
    }
}

/// Partially applied `with_stream(selector, actions)`.
#[derive(Debug, Clone)]
pub struct WithStream {
    selector: Option<Selector>,
    actions: Option<ActionMap>,
}

/// Start wrapping a component with the given selector and actions.
#[must_use]
pub fn with_stream(selector: Option<Selector>, actions: Option<ActionMap>) -> WithStream {
    WithStream { selector, actions }
}

impl WithStream {
    /// Produce the connected component.
    pub fn wrap<C: Component>(&self, component: C) -> Connected<C> {
        let display_name = format!(
            "with_stream({})",
            component.display_name().unwrap_or("Unknown")
        );
        Connected {
            selector: self.selector.clone(),
            actions: self.actions.clone(),
            display_name,
            component,
        }
    }
}

/// A component pre-wired to a [`Consumer`].
///
/// Holds no runtime state of its own; every render builds a fresh
/// consumer with the caller's props passed through.
#[derive(Debug, Clone)]
pub struct Connected<C> {
    selector: Option<Selector>,
    actions: Option<ActionMap>,
    display_name: String,
    component: C,
}

impl<C: Component> Connected<C> {
    /// `with_stream(<component name>)`, or `with_stream(Unknown)`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The wrapped component.
    #[must_use]
    pub fn component(&self) -> &C {
        &self.component
    }

    /// The consumer this component renders, with `props` passed through.
    #[must_use]
    pub fn consumer(&self, props: Props) -> Consumer {
        let mut consumer = Consumer::new().with_props(props);
        if let Some(selector) = &self.selector {
            consumer = consumer.with_selector(selector.clone());
        }
        if let Some(actions) = &self.actions {
            consumer = consumer.with_actions(actions.clone());
        }
        consumer
    }

    /// Render once against `context`.
    pub fn render(&self, context: &Context, props: Props) -> Result<C::Output, ConnectError> {
        self.consumer(props)
            .render(context, |payload| self.component.render(payload))
    }

    /// Mount a live connector for this component.
    pub fn mount(&self, context: &Context, props: Props) -> Result<Connector<Context>, ConnectError> {
        self.consumer(props).mount(context)
    }

    /// Render the component from a mounted connector's current payload.
    pub fn view(&self, connector: &Connector<Context>) -> Result<C::Output, ConnectError> {
        connector.render(|payload| self.component.render(payload))
    }
}
