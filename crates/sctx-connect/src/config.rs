//! Configuration for connectors and providers.

use std::borrow::Cow;

/// Configuration for a [`Connector`](crate::Connector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectConfig {
    /// Name recorded on tracing spans and events.
    pub display_name: Cow<'static, str>,
    /// Reuse bound actions while the action map and dispatch are the same
    /// instances as last time. Off by default: every cycle binds afresh.
    pub memoize_actions: bool,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            display_name: Cow::Borrowed("Connector"),
            memoize_actions: false,
        }
    }
}

impl ConnectConfig {
    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Enable or disable memoization of bound actions.
    #[must_use]
    pub fn with_memoized_actions(mut self, enabled: bool) -> Self {
        self.memoize_actions = enabled;
        self
    }
}

/// Configuration for a [`Provider`](crate::Provider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Name recorded on tracing events.
    pub display_name: Cow<'static, str>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            display_name: Cow::Borrowed("Provider"),
        }
    }
}

impl ProviderConfig {
    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.display_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConnectConfig::default();
        assert_eq!(config.display_name, "Connector");
        assert!(!config.memoize_actions);
        assert_eq!(ProviderConfig::default().display_name, "Provider");
    }

    #[test]
    fn builder_sets_fields() {
        let config = ConnectConfig::default()
            .with_display_name(format!("with_stream({})", "Counter"))
            .with_memoized_actions(true);
        assert_eq!(config.display_name, "with_stream(Counter)");
        assert!(config.memoize_actions);
    }
}
