//! Errors surfaced by the connector layer.

use sctx_core::StreamError;

/// Errors from binding, projecting, or driving a connector.
///
/// None of these are retried. Stream and configuration errors indicate a
/// broken store contract or a programming error in the consuming code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The store's state-update sequence terminated with an error.
    Stream(StreamError),
    /// A selector failed while projecting state.
    Selector { message: String },
    /// An action creator failed while building an action.
    ActionCreator { name: String, message: String },
    /// The unit has been unmounted and cannot be used again.
    Disposed,
    /// The unit has not been mounted yet.
    NotMounted,
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(err) => write!(f, "state stream failed: {}", err.message()),
            Self::Selector { message } => write!(f, "selector failed: {message}"),
            Self::ActionCreator { name, message } => {
                write!(f, "action creator '{name}' failed: {message}")
            }
            Self::Disposed => write!(f, "connector already unmounted"),
            Self::NotMounted => write!(f, "connector not mounted"),
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Stream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StreamError> for ConnectError {
    fn from(err: StreamError) -> Self {
        Self::Stream(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_and_source() {
        let err = ConnectError::from(StreamError::new("closed"));
        assert_eq!(err.to_string(), "state stream failed: closed");
        assert!(err.source().is_some());

        let err = ConnectError::ActionCreator {
            name: "add".into(),
            message: "bad arity".into(),
        };
        assert_eq!(err.to_string(), "action creator 'add' failed: bad arity");
        assert!(err.source().is_none());
    }
}
