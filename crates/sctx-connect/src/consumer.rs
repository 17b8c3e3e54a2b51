//! Consumer: a connector that reads through a provider's [`Context`].

use crate::binder::ActionMap;
use crate::config::ConnectConfig;
use crate::connector::{ConnectOptions, Connector};
use crate::context::Context;
use crate::error::ConnectError;
use crate::payload::Payload;
use crate::projector::{Props, Selector};

/// Connection options waiting for a context.
///
/// [`Consumer::mount`] produces a live [`Connector`] over the context; the
/// provider's subscription is shared, the consumer never subscribes to the
/// store itself.
#[derive(Debug, Clone, Default)]
pub struct Consumer {
    options: ConnectOptions,
}

impl Consumer {
    /// A consumer with no selector, actions, or props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selector applied to every snapshot.
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.options = self.options.with_selector(selector);
        self
    }

    /// Set the actions bound against the context's dispatch.
    #[must_use]
    pub fn with_actions(mut self, actions: ActionMap) -> Self {
        self.options = self.options.with_actions(actions);
        self
    }

    /// Set the pass-through props.
    #[must_use]
    pub fn with_props(mut self, props: Props) -> Self {
        self.options = self.options.with_props(props);
        self
    }

    /// Set the connector configuration.
    #[must_use]
    pub fn with_config(mut self, config: ConnectConfig) -> Self {
        self.options = self.options.with_config(config);
        self
    }

    /// Connect to `context` and mount.
    ///
    /// Fails with the provider's fault if its store sequence already
    /// failed.
    pub fn mount(&self, context: &Context) -> Result<Connector<Context>, ConnectError> {
        if let Some(fault) = context.fault() {
            return Err(fault);
        }
        let mut connector = Connector::new(context.clone(), self.options.clone());
        connector.mount()?;
        Ok(connector)
    }

    /// Render once against the context's current value, without keeping a
    /// subscription.
    pub fn render<R>(
        &self,
        context: &Context,
        children: impl FnOnce(&Payload) -> R,
    ) -> Result<R, ConnectError> {
        let connector = self.mount(context)?;
        connector.render(children)
    }
}
